//! # Memory Module
//!
//! Physical memory and swap usage with a coarse pressure classification.
mod constants;
mod memory_impl;
mod types;

pub use constants::*;
pub use memory_impl::SystemMemorySource;
pub use types::*;
