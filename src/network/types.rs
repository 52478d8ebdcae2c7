use serde::Serialize;

use super::{InterfaceStats, InterfaceType, WifiLink};
use crate::{
    core::types::{SeriesKey, WidgetType},
    traits::MetricSnapshot,
};

/// One network sample across all non-loopback interfaces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub interfaces: Vec<InterfaceStats>,
    pub download_bytes_per_sec: Option<f64>,
    pub upload_bytes_per_sec: Option<f64>,
    pub wifi: Option<WifiLink>,
}

impl NetworkSnapshot {
    /// Aggregates per-interface stats. Rates stay `None` until at least one
    /// interface has two data points.
    pub fn from_interfaces(interfaces: Vec<InterfaceStats>, wifi: Option<WifiLink>) -> Self {
        let sum = |rate: fn(&InterfaceStats) -> Option<f64>| {
            interfaces.iter().filter(|i| !i.is_loopback()).filter_map(rate).reduce(|a, b| a + b)
        };
        let download_bytes_per_sec = sum(|i| i.download_bytes_per_sec);
        let upload_bytes_per_sec = sum(|i| i.upload_bytes_per_sec);
        Self { interfaces, download_bytes_per_sec, upload_bytes_per_sec, wifi }
    }

    /// The physical interface that has moved the most traffic
    pub fn primary_interface(&self) -> Option<&InterfaceStats> {
        self.interfaces
            .iter()
            .filter(|i| matches!(i.interface_type, InterfaceType::Ethernet | InterfaceType::WiFi | InterfaceType::Other))
            .max_by_key(|i| i.total_bytes())
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceStats> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

impl MetricSnapshot for NetworkSnapshot {
    const WIDGET_TYPE: WidgetType = WidgetType::Network;

    fn series(&self) -> Vec<(SeriesKey, f64)> {
        let mut series = Vec::with_capacity(3);
        if let Some(download) = self.download_bytes_per_sec {
            series.push((SeriesKey::NetworkDownload, download));
        }
        if let Some(upload) = self.upload_bytes_per_sec {
            series.push((SeriesKey::NetworkUpload, upload));
        }
        if let Some(wifi) = &self.wifi {
            series.push((SeriesKey::NetworkSignal, wifi.link_quality));
        }
        series
    }
}
