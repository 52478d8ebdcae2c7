//! # Sensors Module
//!
//! Every temperature sensor and fan the platform exposes.
mod constants;
mod sensors_impl;
mod types;

pub use constants::*;
pub use sensors_impl::{read_hwmon_fans, SystemSensorsSource};
pub use types::*;
