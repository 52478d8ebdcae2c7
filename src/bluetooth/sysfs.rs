//! Linux Bluetooth state from `/sys/class/bluetooth` and `/sys/class/rfkill`.
use std::{fs, path::Path};

use super::{BluetoothAdapter, BluetoothDevice, BluetoothSnapshot};

pub const BLUETOOTH_CLASS_PATH: &str = "/sys/class/bluetooth";
pub const RFKILL_CLASS_PATH: &str = "/sys/class/rfkill";

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// Whether rfkill has the named controller unblocked. Controllers rfkill
/// doesn't know about count as powered.
fn rfkill_powered(rfkill_root: &Path, adapter: &str) -> bool {
    let Ok(entries) = fs::read_dir(rfkill_root) else {
        return true;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if read_trimmed(&path.join("type")).as_deref() != Some("bluetooth")
            || read_trimmed(&path.join("name")).as_deref() != Some(adapter)
        {
            continue;
        }
        let blocked = |attr: &str| read_trimmed(&path.join(attr)).is_some_and(|v| v != "0");
        return !blocked("soft") && !blocked("hard");
    }
    true
}

/// Controllers appear as `hciN`; active ACL links appear as `hciN:handle`.
pub fn read(bluetooth_root: &Path, rfkill_root: &Path) -> BluetoothSnapshot {
    let mut snapshot = BluetoothSnapshot { adapters: Vec::new(), devices: Vec::new() };
    let Ok(entries) = fs::read_dir(bluetooth_root) else {
        return snapshot;
    };

    let mut names: Vec<String> = entries.flatten().map(|e| e.file_name().to_string_lossy().to_string()).collect();
    names.sort();

    for name in names {
        match name.split_once(':') {
            None if name.starts_with("hci") => {
                let path = bluetooth_root.join(&name);
                snapshot.adapters.push(BluetoothAdapter {
                    address: read_trimmed(&path.join("address")),
                    powered: rfkill_powered(rfkill_root, &name),
                    name: name.clone(),
                });
            },
            Some((adapter, handle)) if adapter.starts_with("hci") => {
                snapshot.devices.push(BluetoothDevice {
                    name: format!("{adapter} link {handle}"),
                    address: None,
                    connected: true,
                    battery: None,
                    kind: None,
                });
            },
            _ => {},
        }
    }
    snapshot
}
