use std::time::Duration;

use serde::Serialize;

use crate::{
    core::types::{SeriesKey, WidgetType},
    traits::MetricSnapshot,
};

/// Load averages over 1, 5 and 15 minutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// One CPU sample.
///
/// `user_usage` and `system_usage` are only reported on platforms that expose
/// the split; `idle` is always `100 - total_usage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuSnapshot {
    pub model_name: String,
    pub total_usage: f64,
    pub user_usage: Option<f64>,
    pub system_usage: Option<f64>,
    pub idle: f64,
    pub per_core: Vec<f64>,
    pub physical_cores: Option<usize>,
    pub frequency_mhz: Option<f64>,
    pub temperature: Option<f64>,
    pub load_average: LoadAverage,
    pub uptime: Duration,
}

impl CpuSnapshot {
    pub fn logical_cores(&self) -> usize {
        self.per_core.len()
    }

    /// Whether the package temperature is at or above the critical threshold
    pub fn is_critical_temperature(&self) -> bool {
        self.temperature.is_some_and(|t| t >= super::CRITICAL_TEMPERATURE_CELSIUS)
    }
}

impl MetricSnapshot for CpuSnapshot {
    const WIDGET_TYPE: WidgetType = WidgetType::Cpu;

    fn series(&self) -> Vec<(SeriesKey, f64)> {
        let mut series = vec![(SeriesKey::CpuTotal, self.total_usage)];
        if let Some(user) = self.user_usage {
            series.push((SeriesKey::CpuUser, user));
        }
        if let Some(system) = self.system_usage {
            series.push((SeriesKey::CpuSystem, system));
        }
        if let Some(temperature) = self.temperature {
            series.push((SeriesKey::CpuTemperature, temperature));
        }
        series
    }
}

/// Cumulative jiffies from the aggregate `cpu` line of `/proc/stat`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Parses the first `cpu ` line of a `/proc/stat` dump
    pub fn parse(proc_stat: &str) -> Option<Self> {
        let line = proc_stat.lines().find(|line| line.starts_with("cpu "))?;
        let fields: Vec<u64> = line.split_whitespace().skip(1).map_while(|f| f.parse().ok()).collect();
        if fields.len() < 4 {
            return None;
        }
        let field = |i: usize| fields.get(i).copied().unwrap_or(0);
        Some(Self {
            user: field(0),
            nice: field(1),
            system: field(2),
            idle: field(3),
            iowait: field(4),
            irq: field(5),
            softirq: field(6),
            steal: field(7),
        })
    }

    fn total(&self) -> u64 {
        self.user + self.nice + self.system + self.idle + self.iowait + self.irq + self.softirq + self.steal
    }

    /// User and system percentages over the interval since `previous`.
    ///
    /// Returns `None` when no time elapsed or the counters went backwards.
    pub fn split_since(&self, previous: &CpuTimes) -> Option<(f64, f64)> {
        let elapsed = self.total().checked_sub(previous.total())?;
        if elapsed == 0 {
            return None;
        }
        let user = (self.user + self.nice).checked_sub(previous.user + previous.nice)?;
        let system = (self.system + self.irq + self.softirq).checked_sub(previous.system + previous.irq + previous.softirq)?;
        let elapsed = elapsed as f64;
        Some(((user as f64 / elapsed * 100.0).clamp(0.0, 100.0), (system as f64 / elapsed * 100.0).clamp(0.0, 100.0)))
    }
}
