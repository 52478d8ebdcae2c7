//! # Disk Module
//!
//! Mounted volume capacity and aggregate read/write throughput.
mod constants;
mod disk_impl;
mod types;

pub use constants::*;
pub use disk_impl::SystemDiskSource;
pub use types::*;
