/// Health at or above this percentage is reported as good
pub const HEALTH_GOOD_THRESHOLD: f64 = 80.0;

/// Health below this percentage is reported as poor
pub const HEALTH_FAIR_THRESHOLD: f64 = 50.0;

/// Charge below this percentage counts as low
pub const LOW_CHARGE_THRESHOLD: f64 = 20.0;

/// Offset between Kelvin and Celsius
pub const KELVIN_OFFSET: f64 = 273.15;
