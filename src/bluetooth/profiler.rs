//! Parsing of `system_profiler SPBluetoothDataType -json` output.
use serde_json::Value;

use super::{BluetoothAdapter, BluetoothDevice, BluetoothSnapshot};

const DATA_TYPE_KEY: &str = "SPBluetoothDataType";
const BATTERY_KEYS: &[&str] = &[
    "device_batteryLevelMain",
    "device_batteryLevel",
    "device_batteryLevelLeft",
    "device_batteryLevelRight",
    "device_batteryLevelCase",
];

fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// "80%" -> 80.0
fn percent(raw: &str) -> Option<f64> {
    raw.trim().trim_end_matches('%').trim().parse::<f64>().ok().map(|v| v.clamp(0.0, 100.0))
}

/// Devices are listed as an array of single-key objects `{ "<name>": { ...properties } }`
fn devices(section: Option<&Value>, connected: bool) -> Vec<BluetoothDevice> {
    let Some(entries) = section.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|entry| entry.iter())
        .map(|(name, properties)| BluetoothDevice {
            name: name.clone(),
            address: text(properties, "device_address"),
            connected,
            battery: BATTERY_KEYS
                .iter()
                .filter_map(|key| properties.get(*key).and_then(Value::as_str).and_then(percent))
                .reduce(f64::min),
            kind: text(properties, "device_minorType"),
        })
        .collect()
}

/// Builds a snapshot from profiler JSON. Unknown layouts yield an empty snapshot.
pub fn parse_system_profiler(json: &Value) -> BluetoothSnapshot {
    let mut snapshot = BluetoothSnapshot { adapters: Vec::new(), devices: Vec::new() };
    let Some(sections) = json.get(DATA_TYPE_KEY).and_then(Value::as_array) else {
        return snapshot;
    };

    for section in sections {
        if let Some(controller) = section.get("controller_properties") {
            let state = text(controller, "controller_state").unwrap_or_default();
            snapshot.adapters.push(BluetoothAdapter {
                name: text(controller, "controller_chipset").unwrap_or_else(|| "Bluetooth".to_string()),
                address: text(controller, "controller_address"),
                powered: state == "attrib_on",
            });
        }
        snapshot.devices.extend(devices(section.get("device_connected"), true));
        snapshot.devices.extend(devices(section.get("device_not_connected"), false));
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_connected_and_paired_devices() {
        let json = json!({
            "SPBluetoothDataType": [{
                "controller_properties": {
                    "controller_address": "AA:BB:CC:DD:EE:FF",
                    "controller_chipset": "BCM_4387",
                    "controller_state": "attrib_on"
                },
                "device_connected": [
                    { "AirPods Pro": {
                        "device_address": "11:22:33:44:55:66",
                        "device_batteryLevelLeft": "80%",
                        "device_batteryLevelRight": "64%",
                        "device_minorType": "Headphones"
                    } },
                    { "Magic Mouse": { "device_batteryLevelMain": "91 %" } }
                ],
                "device_not_connected": [
                    { "Old Keyboard": { "device_address": "77:88:99:AA:BB:CC" } }
                ]
            }]
        });

        let snapshot = parse_system_profiler(&json);
        assert_eq!(snapshot.adapters.len(), 1);
        assert!(snapshot.is_powered());
        assert_eq!(snapshot.adapters[0].name, "BCM_4387");

        assert_eq!(snapshot.devices.len(), 3);
        assert_eq!(snapshot.connected().count(), 2);
        let lowest = snapshot.lowest_battery().unwrap();
        assert_eq!(lowest.name, "AirPods Pro");
        assert_eq!(lowest.battery, Some(64.0));
        assert_eq!(lowest.kind.as_deref(), Some("Headphones"));
    }

    #[test]
    fn test_powered_off_controller() {
        let json = json!({
            "SPBluetoothDataType": [{ "controller_properties": { "controller_state": "attrib_off" } }]
        });
        let snapshot = parse_system_profiler(&json);
        assert_eq!(snapshot.adapters.len(), 1);
        assert!(!snapshot.is_powered());
    }

    #[test]
    fn test_unknown_layout_has_no_adapters() {
        let snapshot = parse_system_profiler(&json!({ "SPUSBDataType": [] }));
        assert!(snapshot.adapters.is_empty());
        assert!(snapshot.devices.is_empty());
    }
}
