//! # GPU Module
//!
//! GPU utilization, video memory and temperature. Linux drivers that expose
//! `gpu_busy_percent` are read through sysfs; NVIDIA cards are read through
//! `nvidia-smi`. Platforms with neither report the GPU as unavailable.
mod gpu_impl;
mod types;

pub use gpu_impl::SystemGpuSource;
pub use types::*;
