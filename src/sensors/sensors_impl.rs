use std::{fs, path::Path};

use sysinfo::Components;

use super::{Fan, SensorsSnapshot, TemperatureReading};
use crate::{error::ReadError, traits::NativeSource};

/// Temperatures from sysinfo components, fans from hwmon where available
pub struct SystemSensorsSource {
    components: Components,
}

impl SystemSensorsSource {
    pub fn new() -> Result<Self, ReadError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ReadError::unavailable("sensors are not supported on this platform"));
        }
        Ok(Self { components: Components::new_with_refreshed_list() })
    }
}

impl NativeSource<SensorsSnapshot> for SystemSensorsSource {
    fn sample(&mut self) -> Result<SensorsSnapshot, ReadError> {
        self.components.refresh(true);

        let temperatures = self
            .components
            .iter()
            .filter_map(|component| {
                let celsius = f64::from(component.temperature()?);
                celsius.is_finite().then(|| {
                    TemperatureReading::new(component.label(), celsius, component.critical().map(f64::from))
                })
            })
            .collect();

        Ok(SensorsSnapshot { temperatures, fans: read_hwmon_fans(Path::new(super::HWMON_PATH)) })
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// Walks a hwmon class directory for `fanN_input` attributes.
///
/// Each chip directory may expose several fans with optional `fanN_label`,
/// `fanN_min` and `fanN_max` siblings. Missing directories yield no fans.
pub fn read_hwmon_fans(root: &Path) -> Vec<Fan> {
    let Ok(chips) = fs::read_dir(root) else {
        return Vec::new();
    };

    let mut chip_paths: Vec<_> = chips.flatten().map(|entry| entry.path()).collect();
    chip_paths.sort();

    let mut fans = Vec::new();
    for chip in chip_paths {
        let chip_name = read_trimmed(&chip.join("name")).unwrap_or_else(|| "hwmon".to_string());
        let Ok(entries) = fs::read_dir(&chip) else {
            continue;
        };

        let mut indices: Vec<u32> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                name.strip_prefix("fan")?.strip_suffix("_input")?.parse().ok()
            })
            .collect();
        indices.sort_unstable();

        for index in indices {
            let attr = |suffix: &str| read_trimmed(&chip.join(format!("fan{index}_{suffix}")));
            let Some(speed_rpm) = attr("input").and_then(|v| v.parse().ok()) else {
                continue;
            };
            fans.push(Fan {
                name: attr("label").unwrap_or_else(|| format!("{chip_name} fan {index}")),
                speed_rpm,
                min_speed: attr("min").and_then(|v| v.parse().ok()),
                max_speed: attr("max").and_then(|v| v.parse().ok()),
            });
        }
    }
    fans
}
