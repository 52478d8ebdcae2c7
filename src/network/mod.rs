//! # Network Module
//!
//! Interface throughput and, where the kernel reports it, WiFi link quality.
//! Rates are derived from successive cumulative counters by [`TrafficTracker`].
mod interface;
mod network_impl;
mod traffic;
mod types;

pub use interface::{InterfaceStats, InterfaceType, WifiLink};
pub use network_impl::SystemNetworkSource;
pub use traffic::{TrafficData, TrafficTracker};
pub use types::NetworkSnapshot;

/// Upper bound of the link quality scale in `/proc/net/wireless`
pub const WIRELESS_QUALITY_MAX: f64 = 70.0;

pub const PROC_NET_WIRELESS_PATH: &str = "/proc/net/wireless";

#[cfg(test)]
mod tests;
