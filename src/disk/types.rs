use serde::Serialize;
use tokio::time::Instant;

use super::{NETWORK_FS_TYPES, RAM_FS_TYPES};
use crate::{
    core::types::{SeriesKey, WidgetType},
    traits::MetricSnapshot,
};

/// The type of disk storage device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskType {
    Hdd,
    Ssd,
    External,
    Network,
    Ram,
    #[default]
    Unknown,
}

impl DiskType {
    /// Refines a hardware kind with what the filesystem and mount say about the volume
    pub fn classify(kind: DiskType, fs_type: &str, is_removable: bool) -> DiskType {
        let fs_type = fs_type.to_lowercase();
        if NETWORK_FS_TYPES.contains(&fs_type.as_str()) {
            DiskType::Network
        } else if RAM_FS_TYPES.contains(&fs_type.as_str()) {
            DiskType::Ram
        } else if is_removable {
            DiskType::External
        } else {
            kind
        }
    }
}

/// One mounted volume
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Volume {
    pub name: String,
    pub mount_point: String,
    pub fs_type: String,
    pub total: u64,
    pub available: u64,
    pub disk_type: DiskType,
}

impl Volume {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.available)
    }

    pub fn usage_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.used() as f64 / self.total as f64 * 100.0
    }

    pub fn is_root(&self) -> bool {
        self.mount_point == "/"
    }
}

/// One disk sample: every mounted volume plus aggregate throughput.
///
/// Throughput is `None` on the first sample and on platforms without
/// per-device counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskSnapshot {
    pub volumes: Vec<Volume>,
    pub read_bytes_per_sec: Option<f64>,
    pub write_bytes_per_sec: Option<f64>,
}

impl DiskSnapshot {
    /// The boot volume, or the first local volume when `/` is not mounted
    pub fn primary(&self) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.is_root()).or_else(|| {
            self.volumes.iter().find(|v| !matches!(v.disk_type, DiskType::Network | DiskType::Ram | DiskType::External))
        })
    }

    pub fn volume(&self, mount_point: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.mount_point == mount_point)
    }
}

impl MetricSnapshot for DiskSnapshot {
    const WIDGET_TYPE: WidgetType = WidgetType::Disk;

    fn series(&self) -> Vec<(SeriesKey, f64)> {
        let mut series = Vec::with_capacity(3);
        if let Some(primary) = self.primary() {
            series.push((SeriesKey::DiskUsage, primary.usage_percentage()));
        }
        if let Some(read) = self.read_bytes_per_sec {
            series.push((SeriesKey::DiskRead, read));
        }
        if let Some(write) = self.write_bytes_per_sec {
            series.push((SeriesKey::DiskWrite, write));
        }
        series
    }

    fn is_present(&self) -> bool {
        !self.volumes.is_empty()
    }
}

/// Cumulative bytes read and written across physical block devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IoCounters {
    pub read_bytes: u64,
    pub written_bytes: u64,
}

impl IoCounters {
    /// Sums sector counters from a `/proc/diskstats` dump.
    ///
    /// `is_whole_disk` decides which device names count, so partitions are not
    /// counted twice.
    pub fn parse_diskstats(text: &str, is_whole_disk: impl Fn(&str) -> bool) -> Option<Self> {
        let mut counters = IoCounters::default();
        let mut seen = false;

        for line in text.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            // major minor name reads merged sectors_read ms writes merged sectors_written ...
            if fields.len() < 10 || !is_whole_disk(fields[2]) {
                continue;
            }
            let (Ok(read), Ok(written)) = (fields[5].parse::<u64>(), fields[9].parse::<u64>()) else {
                continue;
            };
            counters.read_bytes += read * super::SECTOR_SIZE;
            counters.written_bytes += written * super::SECTOR_SIZE;
            seen = true;
        }

        seen.then_some(counters)
    }
}

/// Turns successive cumulative counters into per-second rates
#[derive(Debug, Default)]
pub struct IoRateTracker {
    previous: Option<(IoCounters, Instant)>,
}

impl IoRateTracker {
    /// Records counters taken at `now`, returning `(read, write)` bytes per second
    pub fn update(&mut self, counters: IoCounters, now: Instant) -> Option<(f64, f64)> {
        let rates = self.previous.and_then(|(previous, at)| {
            let elapsed = now.checked_duration_since(at)?.as_secs_f64();
            if elapsed <= 0.0 {
                return None;
            }
            // Counter resets (device re-attached) read as zero throughput
            let read = counters.read_bytes.saturating_sub(previous.read_bytes) as f64 / elapsed;
            let write = counters.written_bytes.saturating_sub(previous.written_bytes) as f64 / elapsed;
            Some((read, write))
        });
        self.previous = Some((counters, now));
        rates
    }
}
