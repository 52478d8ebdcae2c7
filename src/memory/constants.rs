/// Default warning threshold for memory pressure (percentage)
pub const DEFAULT_WARNING_THRESHOLD: f64 = 75.0;

/// Default critical threshold for memory pressure (percentage)
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 85.0;
