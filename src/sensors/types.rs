use serde::Serialize;

use super::{
    AMBIENT_CRITICAL_TEMPERATURE, BATTERY_CRITICAL_TEMPERATURE, CPU_CRITICAL_TEMPERATURE, GPU_CRITICAL_TEMPERATURE,
    SSD_CRITICAL_TEMPERATURE,
};
use crate::{
    core::types::{SeriesKey, WidgetType},
    traits::MetricSnapshot,
};

/// Represents the location of a temperature sensor in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorLocation {
    Cpu,
    Gpu,
    Memory,
    Storage,
    Battery,
    Ambient,
    Other,
}

impl SensorLocation {
    /// Guesses the location from a driver or component label
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|needle| label.contains(needle));

        if has(&["cpu", "package", "core", "tctl", "tdie", "k10temp", "coretemp", "soc"]) {
            SensorLocation::Cpu
        } else if has(&["gpu", "amdgpu", "nouveau", "radeon", "edge", "junction"]) {
            SensorLocation::Gpu
        } else if has(&["nvme", "ssd", "drive", "sata", "composite"]) {
            SensorLocation::Storage
        } else if has(&["dimm", "memory", "ram"]) {
            SensorLocation::Memory
        } else if has(&["battery", "bat"]) {
            SensorLocation::Battery
        } else if has(&["ambient", "acpitz", "pch", "chassis", "system"]) {
            SensorLocation::Ambient
        } else {
            SensorLocation::Other
        }
    }

    /// Fallback critical temperature when the sensor reports none
    pub fn default_critical(&self) -> Option<f64> {
        match self {
            SensorLocation::Cpu => Some(CPU_CRITICAL_TEMPERATURE),
            SensorLocation::Gpu => Some(GPU_CRITICAL_TEMPERATURE),
            SensorLocation::Storage => Some(SSD_CRITICAL_TEMPERATURE),
            SensorLocation::Battery => Some(BATTERY_CRITICAL_TEMPERATURE),
            SensorLocation::Ambient => Some(AMBIENT_CRITICAL_TEMPERATURE),
            SensorLocation::Memory | SensorLocation::Other => None,
        }
    }
}

/// One temperature sensor reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub label: String,
    pub location: SensorLocation,
    /// Temperature in Celsius
    pub celsius: f64,
    pub critical: Option<f64>,
}

impl TemperatureReading {
    pub fn new(label: impl Into<String>, celsius: f64, critical: Option<f64>) -> Self {
        let label = label.into();
        let location = SensorLocation::from_label(&label);
        Self { critical: critical.or_else(|| location.default_critical()), label, location, celsius }
    }

    pub fn is_critical(&self) -> bool {
        self.critical.is_some_and(|critical| self.celsius >= critical)
    }
}

/// Fan information including speed and, where reported, its range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fan {
    /// Fan identifier (e.g., "CPU Fan", "System Fan")
    pub name: String,
    /// Current fan speed in RPM
    pub speed_rpm: u32,
    pub min_speed: Option<u32>,
    pub max_speed: Option<u32>,
}

impl Fan {
    /// Speed within the reported range as a percentage
    pub fn percentage(&self) -> Option<f64> {
        let max = self.max_speed?;
        let min = self.min_speed.unwrap_or(0);
        if max <= min {
            return None;
        }
        let span = f64::from(max - min);
        Some((f64::from(self.speed_rpm.saturating_sub(min)) / span * 100.0).clamp(0.0, 100.0))
    }
}

/// One sample of every temperature sensor and fan the platform exposes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorsSnapshot {
    pub temperatures: Vec<TemperatureReading>,
    pub fans: Vec<Fan>,
}

impl SensorsSnapshot {
    pub fn hottest(&self) -> Option<&TemperatureReading> {
        self.temperatures.iter().max_by(|a, b| a.celsius.total_cmp(&b.celsius))
    }

    pub fn fastest_fan(&self) -> Option<&Fan> {
        self.fans.iter().max_by_key(|fan| fan.speed_rpm)
    }

    pub fn at(&self, location: SensorLocation) -> impl Iterator<Item = &TemperatureReading> + '_ {
        self.temperatures.iter().filter(move |reading| reading.location == location)
    }

    pub fn any_critical(&self) -> bool {
        self.temperatures.iter().any(TemperatureReading::is_critical)
    }
}

impl MetricSnapshot for SensorsSnapshot {
    const WIDGET_TYPE: WidgetType = WidgetType::Sensors;

    fn series(&self) -> Vec<(SeriesKey, f64)> {
        let mut series = Vec::with_capacity(2);
        if let Some(hottest) = self.hottest() {
            series.push((SeriesKey::SensorsHottest, hottest.celsius));
        }
        if let Some(fan) = self.fastest_fan() {
            series.push((SeriesKey::SensorsFan, f64::from(fan.speed_rpm)));
        }
        series
    }

    fn is_present(&self) -> bool {
        !self.temperatures.is_empty() || !self.fans.is_empty()
    }
}
