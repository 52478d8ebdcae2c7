//! # CPU Module
//!
//! CPU usage, per-core load, frequency, package temperature and load average.
//!
//! ```rust,no_run
//! use tonic_telemetry::cpu::SystemCpuSource;
//! use tonic_telemetry::traits::NativeSource;
//!
//! let mut source = SystemCpuSource::new()?;
//! let snapshot = source.sample()?;
//! println!("CPU: {:.1}%", snapshot.total_usage);
//! # Ok::<(), tonic_telemetry::error::ReadError>(())
//! ```
mod constants;
mod cpu_impl;
mod types;

pub use constants::*;
pub use cpu_impl::SystemCpuSource;
pub use types::*;
