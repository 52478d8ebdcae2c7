use super::BluetoothSnapshot;
use crate::{error::ReadError, traits::NativeSource};

/// Bluetooth source: sysfs and rfkill on Linux, `system_profiler` on macOS
#[derive(Debug, Default)]
pub struct SystemBluetoothSource;

impl SystemBluetoothSource {
    pub fn new() -> Self {
        Self
    }
}

impl NativeSource<BluetoothSnapshot> for SystemBluetoothSource {
    fn sample(&mut self) -> Result<BluetoothSnapshot, ReadError> {
        platform::sample()
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use std::process::Command;

    use super::super::{parse_system_profiler, BluetoothSnapshot};
    use crate::error::ReadError;

    pub(super) fn sample() -> Result<BluetoothSnapshot, ReadError> {
        let output = Command::new("system_profiler")
            .args(["SPBluetoothDataType", "-json"])
            .output()
            .map_err(|e| ReadError::native(format!("system_profiler: {e}")))?;
        if !output.status.success() {
            return Err(ReadError::native(format!("system_profiler exited with {}", output.status)));
        }
        let json = serde_json::from_slice(&output.stdout)
            .map_err(|e| ReadError::native(format!("system_profiler output: {e}")))?;
        Ok(parse_system_profiler(&json))
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use std::path::Path;

    use super::super::{sysfs, BluetoothSnapshot};
    use crate::error::ReadError;

    pub(super) fn sample() -> Result<BluetoothSnapshot, ReadError> {
        Ok(sysfs::read(Path::new(sysfs::BLUETOOTH_CLASS_PATH), Path::new(sysfs::RFKILL_CLASS_PATH)))
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod platform {
    use super::super::BluetoothSnapshot;
    use crate::error::ReadError;

    pub(super) fn sample() -> Result<BluetoothSnapshot, ReadError> {
        Err(ReadError::unavailable("Bluetooth is not supported on this platform"))
    }
}
