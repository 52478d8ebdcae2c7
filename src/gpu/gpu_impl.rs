use std::process::Command;

use super::{parse_nvidia_smi, GpuDevice, GpuSnapshot};
use crate::{error::ReadError, traits::NativeSource};

const NVIDIA_SMI_QUERY: &str = "--query-gpu=name,utilization.gpu,memory.used,memory.total,temperature.gpu";

/// GPU source combining DRM sysfs counters with `nvidia-smi` when installed
#[derive(Debug, Default)]
pub struct SystemGpuSource {
    nvidia_smi_missing: bool,
}

impl SystemGpuSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn nvidia_devices(&mut self) -> Vec<GpuDevice> {
        if self.nvidia_smi_missing {
            return Vec::new();
        }
        match Command::new("nvidia-smi").args([NVIDIA_SMI_QUERY, "--format=csv,noheader,nounits"]).output() {
            Ok(output) if output.status.success() => parse_nvidia_smi(&String::from_utf8_lossy(&output.stdout)),
            Ok(_) => Vec::new(),
            Err(_) => {
                // Not installed; don't fork on every sample
                self.nvidia_smi_missing = true;
                Vec::new()
            },
        }
    }
}

impl NativeSource<GpuSnapshot> for SystemGpuSource {
    fn sample(&mut self) -> Result<GpuSnapshot, ReadError> {
        let mut devices = drm::devices();
        devices.extend(self.nvidia_devices());

        if devices.is_empty() {
            return Err(ReadError::unavailable("no GPU exposes utilization counters"));
        }
        Ok(GpuSnapshot { devices })
    }
}

#[cfg(target_os = "linux")]
mod drm {
    use std::{
        fs,
        path::{Path, PathBuf},
    };

    use super::super::{GpuDevice, GpuMemory, GpuVendor};

    const DRM_PATH: &str = "/sys/class/drm";

    fn read_trimmed(path: &Path) -> Option<String> {
        fs::read_to_string(path).ok().map(|s| s.trim().to_string())
    }

    fn read_u64(path: &Path) -> Option<u64> {
        read_trimmed(path)?.parse().ok()
    }

    fn is_card_dir(name: &str) -> bool {
        name.strip_prefix("card").is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
    }

    fn hwmon_temperature(device: &Path) -> Option<f64> {
        let entries = fs::read_dir(device.join("hwmon")).ok()?;
        entries
            .flatten()
            .find_map(|entry| read_u64(&entry.path().join("temp1_input")))
            .map(|millidegrees| millidegrees as f64 / 1000.0)
    }

    fn device(device: PathBuf) -> Option<GpuDevice> {
        // Only drivers exposing a busy counter give a meaningful utilization
        let utilization = read_u64(&device.join("gpu_busy_percent"))? as f64;
        let vendor = read_trimmed(&device.join("vendor")).map(|id| GpuVendor::from_pci_id(&id)).unwrap_or(GpuVendor::Unknown);
        let memory = read_u64(&device.join("mem_info_vram_total"))
            .zip(read_u64(&device.join("mem_info_vram_used")))
            .map(|(total, used)| GpuMemory { total, used });
        let name = read_trimmed(&device.join("product_name"))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("{vendor:?} GPU"));

        Some(GpuDevice {
            name,
            vendor,
            utilization: utilization.clamp(0.0, 100.0),
            memory,
            temperature: hwmon_temperature(&device),
        })
    }

    pub(super) fn devices() -> Vec<GpuDevice> {
        let Ok(entries) = fs::read_dir(DRM_PATH) else {
            return Vec::new();
        };
        let mut cards: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| is_card_dir(&entry.file_name().to_string_lossy()))
            .map(|entry| entry.path())
            .collect();
        cards.sort();
        cards.into_iter().filter_map(|card| device(card.join("device"))).collect()
    }

}

#[cfg(not(target_os = "linux"))]
mod drm {
    use super::super::GpuDevice;

    pub(super) fn devices() -> Vec<GpuDevice> {
        Vec::new()
    }
}
