// Traits module
//
// Seams between the scheduling core and the platform: where samples come
// from and what a domain snapshot must be able to report about itself.

pub mod hardware;

pub use hardware::{MetricSnapshot, NativeSource};

#[cfg(test)]
pub use hardware::MockNativeSource;
