use std::time::Duration;

use sysinfo::{Components, CpuRefreshKind, RefreshKind, System};

use super::{CpuSnapshot, CpuTimes, LoadAverage, CPU_TEMPERATURE_LABELS, DEFAULT_CPU_NAME};
use crate::{error::ReadError, traits::NativeSource};

/// CPU source backed by sysinfo, with the user/system split read from
/// `/proc/stat` where it exists.
pub struct SystemCpuSource {
    system: System,
    components: Components,
    last_times: Option<CpuTimes>,
}

impl SystemCpuSource {
    pub fn new() -> Result<Self, ReadError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ReadError::unavailable("CPU statistics are not supported on this platform"));
        }

        let mut system = System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()));
        // First refresh only primes the usage counters
        system.refresh_cpu_all();

        Ok(Self { system, components: Components::new_with_refreshed_list(), last_times: read_cpu_times() })
    }

    fn package_temperature(&mut self) -> Option<f64> {
        self.components.refresh(true);
        self.components
            .iter()
            .filter(|component| {
                let label = component.label().to_lowercase();
                CPU_TEMPERATURE_LABELS.iter().any(|needle| label.contains(needle))
            })
            .filter_map(|component| component.temperature())
            .map(f64::from)
            .filter(|t| t.is_finite())
            .reduce(f64::max)
    }

    fn user_system_split(&mut self) -> Option<(f64, f64)> {
        let current = read_cpu_times()?;
        let split = self.last_times.and_then(|previous| current.split_since(&previous));
        self.last_times = Some(current);
        split
    }
}

impl NativeSource<CpuSnapshot> for SystemCpuSource {
    fn sample(&mut self) -> Result<CpuSnapshot, ReadError> {
        self.system.refresh_cpu_all();

        let cpus = self.system.cpus();
        if cpus.is_empty() {
            return Err(ReadError::native("no CPUs reported"));
        }

        let model_name = cpus
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| DEFAULT_CPU_NAME.to_string());
        let per_core: Vec<f64> = cpus.iter().map(|cpu| f64::from(cpu.cpu_usage()).clamp(0.0, 100.0)).collect();
        let frequencies: Vec<u64> = cpus.iter().map(|cpu| cpu.frequency()).filter(|mhz| *mhz > 0).collect();
        let frequency_mhz =
            (!frequencies.is_empty()).then(|| frequencies.iter().sum::<u64>() as f64 / frequencies.len() as f64);
        let total_usage = f64::from(self.system.global_cpu_usage()).clamp(0.0, 100.0);

        let load = System::load_average();
        let (user_usage, system_usage) = self.user_system_split().unzip();

        Ok(CpuSnapshot {
            model_name,
            total_usage,
            user_usage,
            system_usage,
            idle: 100.0 - total_usage,
            per_core,
            physical_cores: System::physical_core_count(),
            frequency_mhz,
            temperature: self.package_temperature(),
            load_average: LoadAverage { one: load.one, five: load.five, fifteen: load.fifteen },
            uptime: Duration::from_secs(System::uptime()),
        })
    }
}

#[cfg(target_os = "linux")]
fn read_cpu_times() -> Option<CpuTimes> {
    std::fs::read_to_string(super::PROC_STAT_PATH).ok().and_then(|text| CpuTimes::parse(&text))
}

#[cfg(not(target_os = "linux"))]
fn read_cpu_times() -> Option<CpuTimes> {
    None
}
