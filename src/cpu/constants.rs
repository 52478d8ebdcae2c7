/// Default CPU name when model info is unavailable
pub const DEFAULT_CPU_NAME: &str = "Unknown CPU";

/// Temperature threshold for critical state (in Celsius)
pub const CRITICAL_TEMPERATURE_CELSIUS: f64 = 95.0;

/// Component labels that identify the CPU package sensor, matched case-insensitively
pub const CPU_TEMPERATURE_LABELS: &[&str] = &["cpu", "package", "tctl", "tdie", "coretemp", "k10temp", "soc"];

/// Aggregate CPU line in `/proc/stat`
pub const PROC_STAT_PATH: &str = "/proc/stat";
