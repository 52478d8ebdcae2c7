//! # Bluetooth Module
//!
//! Controller power state and connected peripherals with their battery levels.
//! A machine without a controller reports the widget as unavailable.
mod bluetooth_impl;
mod profiler;
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
mod sysfs;
mod types;

pub use bluetooth_impl::SystemBluetoothSource;
pub use profiler::parse_system_profiler;
pub use types::*;
