use std::time::Duration;

use tokio::time::Instant;

use super::*;
use crate::{core::types::SeriesKey, traits::MetricSnapshot};

fn data(at: Instant, received: u64, sent: u64) -> TrafficData {
    TrafficData {
        timestamp: at,
        bytes_received: received,
        bytes_sent: sent,
        packets_received: 100,
        packets_sent: 50,
        receive_errors: 5,
        send_errors: 0,
    }
}

fn stats(name: &str, interface_type: InterfaceType, total: u64, download: Option<f64>) -> InterfaceStats {
    InterfaceStats {
        name: name.to_string(),
        interface_type,
        mac_address: None,
        bytes_received: total,
        bytes_sent: 0,
        download_bytes_per_sec: download,
        upload_bytes_per_sec: download.map(|d| d / 2.0),
        receive_error_rate: 0.0,
        send_error_rate: 0.0,
    }
}

#[test]
fn test_tracker_needs_two_points() {
    let start = Instant::now();
    let mut tracker = TrafficTracker::new(data(start, 1000, 500));
    assert!(tracker.download_speed().is_none());

    tracker.update(data(start + Duration::from_secs(2), 3000, 1500));
    assert_eq!(tracker.download_speed(), Some(1000.0));
    assert_eq!(tracker.upload_speed(), Some(500.0));
    assert_eq!(tracker.packet_receive_rate(), Some(0.0));
    assert_eq!(tracker.receive_error_rate(), 0.05);
    assert_eq!(tracker.current().bytes_received, 3000);
}

#[test]
fn test_tracker_counter_reset_reads_as_zero() {
    let start = Instant::now();
    let mut tracker = TrafficTracker::new(data(start, 5000, 5000));
    tracker.update(data(start + Duration::from_secs(1), 10, 10));
    assert_eq!(tracker.download_speed(), Some(0.0));
}

#[test]
fn test_interface_classification() {
    assert_eq!(InterfaceType::from_name("lo"), InterfaceType::Loopback);
    assert_eq!(InterfaceType::from_name("lo0"), InterfaceType::Loopback);
    assert_eq!(InterfaceType::from_name("wlp3s0"), InterfaceType::WiFi);
    assert_eq!(InterfaceType::from_name("eth0"), InterfaceType::Ethernet);
    assert_eq!(InterfaceType::from_name("en0"), InterfaceType::Ethernet);
    assert_eq!(InterfaceType::from_name("docker0"), InterfaceType::Virtual);
    assert_eq!(InterfaceType::from_name("ppp0"), InterfaceType::Other);
}

#[test]
fn test_parse_proc_net_wireless() {
    let text = "\
Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
 face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
 wlan0: 0000   35.  -55.  -256        0      0      0      0      0        0
";
    let links = WifiLink::parse_proc_net_wireless(text);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].interface, "wlan0");
    assert_eq!(links[0].link_quality, 50.0);
    assert_eq!(links[0].signal_dbm, Some(-55.0));
    assert_eq!(links[0].noise_dbm, None);
}

#[test]
fn test_parse_proc_net_wireless_without_links() {
    let header_only = "Inter-| sta-|   Quality\n face | tus | link level noise\n";
    assert!(WifiLink::parse_proc_net_wireless(header_only).is_empty());
}

#[test]
fn test_snapshot_aggregates_rates() {
    let snapshot = NetworkSnapshot::from_interfaces(
        vec![
            stats("eth0", InterfaceType::Ethernet, 10_000, Some(100.0)),
            stats("wlan0", InterfaceType::WiFi, 500, Some(50.0)),
            stats("docker0", InterfaceType::Virtual, 99_999, None),
        ],
        None,
    );

    assert_eq!(snapshot.download_bytes_per_sec, Some(150.0));
    assert_eq!(snapshot.upload_bytes_per_sec, Some(75.0));
    assert_eq!(snapshot.primary_interface().map(|i| i.name.as_str()), Some("eth0"));
    assert!(snapshot.interface("docker0").is_some());
}

#[test]
fn test_first_sample_reports_no_rates() {
    let snapshot =
        NetworkSnapshot::from_interfaces(vec![stats("eth0", InterfaceType::Ethernet, 10, None)], None);
    assert!(snapshot.download_bytes_per_sec.is_none());
    assert!(snapshot.series().is_empty());
}

#[test]
fn test_wifi_signal_series() {
    let wifi = WifiLink { interface: "wlan0".into(), link_quality: 80.0, signal_dbm: Some(-40.0), noise_dbm: None };
    let snapshot = NetworkSnapshot::from_interfaces(Vec::new(), Some(wifi));
    assert_eq!(snapshot.series(), vec![(SeriesKey::NetworkSignal, 80.0)]);
}
