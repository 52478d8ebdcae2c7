// Core modules
pub mod metrics;
pub mod types;
