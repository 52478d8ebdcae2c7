//! # Core Types Module
//!
//! Identifiers shared by every layer of the crate.
//!
//! * `WidgetType` - One hardware domain, which is also one configurable widget
//! * `SeriesKey` - One numeric time series extracted from a domain snapshot
//!
//! ## Example
//!
//! ```rust
//! use tonic_telemetry::core::types::{SeriesKey, WidgetType};
//!
//! let key = SeriesKey::parse("cpu.total").unwrap();
//! assert_eq!(key.widget_type(), WidgetType::Cpu);
//! ```

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A hardware domain with its own reader, history and widget configuration.
///
/// Serialized with the lowercase names used in persisted configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Cpu,
    Memory,
    Disk,
    Network,
    Gpu,
    Battery,
    Sensors,
    Bluetooth,
}

impl WidgetType {
    /// Every widget type in default display order
    pub const ALL: [WidgetType; 8] = [
        WidgetType::Cpu,
        WidgetType::Memory,
        WidgetType::Disk,
        WidgetType::Network,
        WidgetType::Gpu,
        WidgetType::Battery,
        WidgetType::Sensors,
        WidgetType::Bluetooth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Cpu => "cpu",
            WidgetType::Memory => "memory",
            WidgetType::Disk => "disk",
            WidgetType::Network => "network",
            WidgetType::Gpu => "gpu",
            WidgetType::Battery => "battery",
            WidgetType::Sensors => "sensors",
            WidgetType::Bluetooth => "bluetooth",
        }
    }

    /// How often the reader for this domain wants to be polled.
    ///
    /// Fast-moving counters refresh every couple of seconds, slow physical
    /// quantities (charge level, paired devices) far less often.
    pub fn preferred_interval(&self) -> Duration {
        match self {
            WidgetType::Cpu | WidgetType::Memory | WidgetType::Network | WidgetType::Gpu => Duration::from_secs(2),
            WidgetType::Disk | WidgetType::Sensors => Duration::from_secs(5),
            WidgetType::Battery | WidgetType::Bluetooth => Duration::from_secs(30),
        }
    }

    /// How long a native sample stays valid before the reader hits hardware again
    pub fn default_cache_ttl(&self) -> Duration {
        match self {
            WidgetType::Cpu | WidgetType::Memory | WidgetType::Network | WidgetType::Gpu => Duration::from_secs(1),
            WidgetType::Disk | WidgetType::Sensors => Duration::from_secs(4),
            WidgetType::Battery | WidgetType::Bluetooth => Duration::from_secs(30),
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        WidgetType::ALL
            .into_iter()
            .find(|widget_type| widget_type.as_str() == s)
            .ok_or_else(|| Error::invalid_data(format!("unknown widget type: {s}")))
    }
}

/// Identifies one numeric series recorded into history and usable as a
/// notification threshold key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesKey {
    CpuTotal,
    CpuUser,
    CpuSystem,
    CpuTemperature,
    MemoryUsage,
    MemorySwap,
    DiskUsage,
    DiskRead,
    DiskWrite,
    NetworkDownload,
    NetworkUpload,
    NetworkSignal,
    GpuUtilization,
    GpuMemory,
    GpuTemperature,
    BatteryCharge,
    BatteryTemperature,
    SensorsHottest,
    SensorsFan,
    BluetoothConnected,
    BluetoothLowestBattery,
}

impl SeriesKey {
    pub const ALL: [SeriesKey; 21] = [
        SeriesKey::CpuTotal,
        SeriesKey::CpuUser,
        SeriesKey::CpuSystem,
        SeriesKey::CpuTemperature,
        SeriesKey::MemoryUsage,
        SeriesKey::MemorySwap,
        SeriesKey::DiskUsage,
        SeriesKey::DiskRead,
        SeriesKey::DiskWrite,
        SeriesKey::NetworkDownload,
        SeriesKey::NetworkUpload,
        SeriesKey::NetworkSignal,
        SeriesKey::GpuUtilization,
        SeriesKey::GpuMemory,
        SeriesKey::GpuTemperature,
        SeriesKey::BatteryCharge,
        SeriesKey::BatteryTemperature,
        SeriesKey::SensorsHottest,
        SeriesKey::SensorsFan,
        SeriesKey::BluetoothConnected,
        SeriesKey::BluetoothLowestBattery,
    ];

    /// The dotted key used in threshold configuration, e.g. `cpu.total`
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesKey::CpuTotal => "cpu.total",
            SeriesKey::CpuUser => "cpu.user",
            SeriesKey::CpuSystem => "cpu.system",
            SeriesKey::CpuTemperature => "cpu.temperature",
            SeriesKey::MemoryUsage => "memory.usage",
            SeriesKey::MemorySwap => "memory.swap",
            SeriesKey::DiskUsage => "disk.usage",
            SeriesKey::DiskRead => "disk.read",
            SeriesKey::DiskWrite => "disk.write",
            SeriesKey::NetworkDownload => "network.download",
            SeriesKey::NetworkUpload => "network.upload",
            SeriesKey::NetworkSignal => "network.signal",
            SeriesKey::GpuUtilization => "gpu.utilization",
            SeriesKey::GpuMemory => "gpu.memory",
            SeriesKey::GpuTemperature => "gpu.temperature",
            SeriesKey::BatteryCharge => "battery.charge",
            SeriesKey::BatteryTemperature => "battery.temperature",
            SeriesKey::SensorsHottest => "sensors.hottest",
            SeriesKey::SensorsFan => "sensors.fan",
            SeriesKey::BluetoothConnected => "bluetooth.connected",
            SeriesKey::BluetoothLowestBattery => "bluetooth.battery",
        }
    }

    pub fn parse(key: &str) -> Option<SeriesKey> {
        SeriesKey::ALL.into_iter().find(|series| series.as_str() == key)
    }

    /// The domain whose snapshots produce this series
    pub fn widget_type(&self) -> WidgetType {
        match self {
            SeriesKey::CpuTotal | SeriesKey::CpuUser | SeriesKey::CpuSystem | SeriesKey::CpuTemperature => {
                WidgetType::Cpu
            },
            SeriesKey::MemoryUsage | SeriesKey::MemorySwap => WidgetType::Memory,
            SeriesKey::DiskUsage | SeriesKey::DiskRead | SeriesKey::DiskWrite => WidgetType::Disk,
            SeriesKey::NetworkDownload | SeriesKey::NetworkUpload | SeriesKey::NetworkSignal => WidgetType::Network,
            SeriesKey::GpuUtilization | SeriesKey::GpuMemory | SeriesKey::GpuTemperature => WidgetType::Gpu,
            SeriesKey::BatteryCharge | SeriesKey::BatteryTemperature => WidgetType::Battery,
            SeriesKey::SensorsHottest | SeriesKey::SensorsFan => WidgetType::Sensors,
            SeriesKey::BluetoothConnected | SeriesKey::BluetoothLowestBattery => WidgetType::Bluetooth,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
