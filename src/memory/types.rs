use std::fmt;

use serde::Serialize;

use super::{DEFAULT_CRITICAL_THRESHOLD, DEFAULT_WARNING_THRESHOLD};
use crate::{
    core::types::{SeriesKey, WidgetType},
    traits::MetricSnapshot,
};

/// Memory pressure level indicator
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureLevel {
    /// Sufficient memory available
    Normal,
    /// Memory is becoming constrained
    Warning,
    /// The system is under severe memory constraints
    Critical,
}

impl PressureLevel {
    /// Classifies a used-memory percentage
    pub fn from_usage(percent: f64) -> Self {
        if percent >= DEFAULT_CRITICAL_THRESHOLD {
            PressureLevel::Critical
        } else if percent >= DEFAULT_WARNING_THRESHOLD {
            PressureLevel::Warning
        } else {
            PressureLevel::Normal
        }
    }
}

impl fmt::Display for PressureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Warning => write!(f, "Warning"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// Swap file usage in bytes
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize)]
pub struct SwapUsage {
    pub total: u64,
    pub used: u64,
}

impl SwapUsage {
    pub fn free(&self) -> u64 {
        self.total.saturating_sub(self.used)
    }

    /// Used swap as a percentage, `None` when there is no swap configured
    pub fn usage_percentage(&self) -> Option<f64> {
        (self.total > 0).then(|| self.used as f64 / self.total as f64 * 100.0)
    }
}

/// One memory sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorySnapshot {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub swap: SwapUsage,
    pub pressure: PressureLevel,
}

impl MemorySnapshot {
    /// Builds a snapshot and derives the pressure level from usage
    pub fn new(total: u64, used: u64, available: u64, swap: SwapUsage) -> Self {
        let used = used.min(total);
        let usage = if total > 0 { used as f64 / total as f64 * 100.0 } else { 0.0 };
        Self { total, used, available: available.min(total), swap, pressure: PressureLevel::from_usage(usage) }
    }

    pub fn usage_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.used as f64 / self.total as f64 * 100.0
    }
}

impl MetricSnapshot for MemorySnapshot {
    const WIDGET_TYPE: WidgetType = WidgetType::Memory;

    fn series(&self) -> Vec<(SeriesKey, f64)> {
        let mut series = vec![(SeriesKey::MemoryUsage, self.usage_percentage())];
        if let Some(swap) = self.swap.usage_percentage() {
            series.push((SeriesKey::MemorySwap, swap));
        }
        series
    }
}
