use serde::Serialize;

use crate::{
    core::types::{SeriesKey, WidgetType},
    traits::MetricSnapshot,
};

/// GPU vendor, identified from the PCI vendor id or driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuVendor {
    Amd,
    Intel,
    Nvidia,
    Apple,
    Unknown,
}

impl GpuVendor {
    /// Maps a PCI vendor id such as `0x1002`
    pub fn from_pci_id(id: &str) -> Self {
        match id.trim().trim_start_matches("0x").to_lowercase().as_str() {
            "1002" => GpuVendor::Amd,
            "8086" => GpuVendor::Intel,
            "10de" => GpuVendor::Nvidia,
            "106b" => GpuVendor::Apple,
            _ => GpuVendor::Unknown,
        }
    }

    pub fn is_integrated(&self) -> bool {
        matches!(self, GpuVendor::Intel | GpuVendor::Apple)
    }
}

/// Represents GPU memory information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GpuMemory {
    /// Total memory in bytes
    pub total: u64,
    /// Used memory in bytes
    pub used: u64,
}

impl GpuMemory {
    pub fn usage_percentage(&self) -> Option<f64> {
        (self.total > 0).then(|| self.used.min(self.total) as f64 / self.total as f64 * 100.0)
    }
}

/// One GPU device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpuDevice {
    pub name: String,
    pub vendor: GpuVendor,
    /// Utilization percentage (0-100)
    pub utilization: f64,
    pub memory: Option<GpuMemory>,
    /// Temperature in Celsius
    pub temperature: Option<f64>,
}

/// One sample across all GPUs the platform exposes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpuSnapshot {
    pub devices: Vec<GpuDevice>,
}

impl GpuSnapshot {
    /// The first discrete GPU, or the first device when all are integrated
    pub fn primary(&self) -> Option<&GpuDevice> {
        self.devices.iter().find(|d| !d.vendor.is_integrated()).or_else(|| self.devices.first())
    }
}

impl MetricSnapshot for GpuSnapshot {
    const WIDGET_TYPE: WidgetType = WidgetType::Gpu;

    fn series(&self) -> Vec<(SeriesKey, f64)> {
        let Some(primary) = self.primary() else {
            return Vec::new();
        };
        let mut series = vec![(SeriesKey::GpuUtilization, primary.utilization)];
        if let Some(memory) = primary.memory.and_then(|m| m.usage_percentage()) {
            series.push((SeriesKey::GpuMemory, memory));
        }
        if let Some(temperature) = primary.temperature {
            series.push((SeriesKey::GpuTemperature, temperature));
        }
        series
    }

    fn is_present(&self) -> bool {
        !self.devices.is_empty()
    }
}

/// Parses `nvidia-smi --query-gpu=name,utilization.gpu,memory.used,memory.total,temperature.gpu
/// --format=csv,noheader,nounits` output. Memory is reported in MiB.
pub fn parse_nvidia_smi(output: &str) -> Vec<GpuDevice> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            let &[name, utilization, used, total, temperature] = parts.as_slice() else {
                return None;
            };
            let mib = |value: &str| value.parse::<u64>().ok().map(|v| v * 1024 * 1024);
            let memory = mib(used).zip(mib(total)).map(|(used, total)| GpuMemory { total, used });
            Some(GpuDevice {
                name: name.to_string(),
                vendor: GpuVendor::Nvidia,
                utilization: utilization.parse::<f64>().ok()?.clamp(0.0, 100.0),
                memory,
                temperature: temperature.parse().ok(),
            })
        })
        .collect()
}
