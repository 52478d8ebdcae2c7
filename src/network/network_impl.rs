use std::collections::HashMap;

use sysinfo::Networks;
use tokio::time::Instant;

use super::{InterfaceStats, InterfaceType, NetworkSnapshot, TrafficData, TrafficTracker, WifiLink};
use crate::{error::ReadError, traits::NativeSource};

/// Network source backed by sysinfo interface counters
pub struct SystemNetworkSource {
    networks: Networks,
    trackers: HashMap<String, TrafficTracker>,
}

impl SystemNetworkSource {
    pub fn new() -> Result<Self, ReadError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ReadError::unavailable("network statistics are not supported on this platform"));
        }
        Ok(Self { networks: Networks::new_with_refreshed_list(), trackers: HashMap::new() })
    }
}

impl NativeSource<NetworkSnapshot> for SystemNetworkSource {
    fn sample(&mut self) -> Result<NetworkSnapshot, ReadError> {
        self.networks.refresh(true);
        let now = Instant::now();
        let wireless = read_wireless_links();

        let mut interfaces = Vec::new();
        for (name, data) in self.networks.iter() {
            let mut interface_type = InterfaceType::from_name(name);
            if interface_type == InterfaceType::Loopback {
                continue;
            }
            if wireless.iter().any(|link| &link.interface == name) {
                interface_type = InterfaceType::WiFi;
            }

            let point = TrafficData {
                timestamp: now,
                bytes_received: data.total_received(),
                bytes_sent: data.total_transmitted(),
                packets_received: data.total_packets_received(),
                packets_sent: data.total_packets_transmitted(),
                receive_errors: data.total_errors_on_received(),
                send_errors: data.total_errors_on_transmitted(),
            };
            let tracker = self
                .trackers
                .entry(name.clone())
                .and_modify(|tracker| tracker.update(point))
                .or_insert_with(|| TrafficTracker::new(point));

            let mac_address = Some(data.mac_address().to_string()).filter(|mac| mac != "00:00:00:00:00:00");
            interfaces.push(InterfaceStats {
                name: name.clone(),
                interface_type,
                mac_address,
                bytes_received: point.bytes_received,
                bytes_sent: point.bytes_sent,
                download_bytes_per_sec: tracker.download_speed(),
                upload_bytes_per_sec: tracker.upload_speed(),
                receive_error_rate: tracker.receive_error_rate(),
                send_error_rate: tracker.send_error_rate(),
            });
        }

        // Interfaces that disappeared should not keep stale baselines
        self.trackers.retain(|name, _| interfaces.iter().any(|i| &i.name == name));
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));

        let wifi = wireless.into_iter().max_by(|a, b| a.link_quality.total_cmp(&b.link_quality));
        Ok(NetworkSnapshot::from_interfaces(interfaces, wifi))
    }
}

#[cfg(target_os = "linux")]
fn read_wireless_links() -> Vec<WifiLink> {
    std::fs::read_to_string(super::PROC_NET_WIRELESS_PATH)
        .map(|text| WifiLink::parse_proc_net_wireless(&text))
        .unwrap_or_default()
}

#[cfg(not(target_os = "linux"))]
fn read_wireless_links() -> Vec<WifiLink> {
    Vec::new()
}
