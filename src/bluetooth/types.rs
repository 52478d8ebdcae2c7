use serde::Serialize;

use crate::{
    core::types::{SeriesKey, WidgetType},
    traits::MetricSnapshot,
};

/// A local Bluetooth controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BluetoothAdapter {
    pub name: String,
    pub address: Option<String>,
    pub powered: bool,
}

/// A paired or connected peripheral
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BluetoothDevice {
    pub name: String,
    pub address: Option<String>,
    pub connected: bool,
    /// Lowest reported battery level (0-100) across the device's cells
    pub battery: Option<f64>,
    pub kind: Option<String>,
}

/// One Bluetooth sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BluetoothSnapshot {
    pub adapters: Vec<BluetoothAdapter>,
    pub devices: Vec<BluetoothDevice>,
}

impl BluetoothSnapshot {
    pub fn is_powered(&self) -> bool {
        self.adapters.iter().any(|adapter| adapter.powered)
    }

    pub fn connected(&self) -> impl Iterator<Item = &BluetoothDevice> + '_ {
        self.devices.iter().filter(|device| device.connected)
    }

    /// The connected device with the least battery left
    pub fn lowest_battery(&self) -> Option<&BluetoothDevice> {
        self.connected()
            .filter(|device| device.battery.is_some())
            .min_by(|a, b| a.battery.unwrap_or(f64::MAX).total_cmp(&b.battery.unwrap_or(f64::MAX)))
    }
}

impl MetricSnapshot for BluetoothSnapshot {
    const WIDGET_TYPE: WidgetType = WidgetType::Bluetooth;

    fn series(&self) -> Vec<(SeriesKey, f64)> {
        let mut series = vec![(SeriesKey::BluetoothConnected, self.connected().count() as f64)];
        if let Some(battery) = self.lowest_battery().and_then(|device| device.battery) {
            series.push((SeriesKey::BluetoothLowestBattery, battery));
        }
        series
    }

    fn is_present(&self) -> bool {
        !self.adapters.is_empty()
    }
}
