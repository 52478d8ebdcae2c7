//! # Battery Module
//!
//! Charge level, charging state, health and temperature of the primary battery.
mod battery_impl;
mod constants;
mod types;

pub use battery_impl::SystemBatterySource;
pub use constants::*;
pub use types::*;

#[cfg(test)]
mod tests;
