use sysinfo::{DiskKind, Disks};
use tokio::time::Instant;

use super::{DiskSnapshot, DiskType, IoCounters, IoRateTracker, Volume};
use crate::{error::ReadError, traits::NativeSource};

/// Disk source: volume capacity from sysinfo, throughput from kernel counters
pub struct SystemDiskSource {
    disks: Disks,
    io: IoRateTracker,
}

impl SystemDiskSource {
    pub fn new() -> Result<Self, ReadError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ReadError::unavailable("disk statistics are not supported on this platform"));
        }
        let mut source = Self { disks: Disks::new_with_refreshed_list(), io: IoRateTracker::default() };
        // Prime the throughput baseline
        if let Some(counters) = read_io_counters() {
            source.io.update(counters, Instant::now());
        }
        Ok(source)
    }
}

impl NativeSource<DiskSnapshot> for SystemDiskSource {
    fn sample(&mut self) -> Result<DiskSnapshot, ReadError> {
        self.disks.refresh(true);

        let volumes: Vec<Volume> = self
            .disks
            .iter()
            .filter(|disk| disk.total_space() > 0)
            .map(|disk| {
                let fs_type = disk.file_system().to_string_lossy().to_string();
                let kind = match disk.kind() {
                    DiskKind::SSD => DiskType::Ssd,
                    DiskKind::HDD => DiskType::Hdd,
                    _ => DiskType::Unknown,
                };
                Volume {
                    name: disk.name().to_string_lossy().to_string(),
                    mount_point: disk.mount_point().to_string_lossy().to_string(),
                    disk_type: DiskType::classify(kind, &fs_type, disk.is_removable()),
                    fs_type,
                    total: disk.total_space(),
                    available: disk.available_space(),
                }
            })
            .collect();

        let rates = read_io_counters().and_then(|counters| self.io.update(counters, Instant::now()));
        let (read_bytes_per_sec, write_bytes_per_sec) = rates.unzip();

        Ok(DiskSnapshot { volumes, read_bytes_per_sec, write_bytes_per_sec })
    }
}

#[cfg(target_os = "linux")]
fn read_io_counters() -> Option<IoCounters> {
    use std::path::Path;

    let text = std::fs::read_to_string(super::PROC_DISKSTATS_PATH).ok()?;
    IoCounters::parse_diskstats(&text, |name| {
        !super::IGNORED_BLOCK_DEVICES.iter().any(|prefix| name.starts_with(prefix))
            && Path::new(super::SYS_BLOCK_PATH).join(name).exists()
    })
}

#[cfg(not(target_os = "linux"))]
fn read_io_counters() -> Option<IoCounters> {
    None
}
