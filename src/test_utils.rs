//! Snapshot builders and readers shared by unit tests
use std::time::Duration;

use crate::{
    cpu::{CpuSnapshot, LoadAverage},
    error::ReadError,
    memory::{MemorySnapshot, SwapUsage},
    reader::{DomainReader, Fetched, MetricReader, ReaderDescriptor, Snapshot},
    traits::{MetricSnapshot, MockNativeSource},
};

pub const GIB: u64 = 1024 * 1024 * 1024;

pub fn cpu_snapshot(total_usage: f64) -> CpuSnapshot {
    CpuSnapshot {
        model_name: "Test CPU".to_string(),
        total_usage,
        user_usage: None,
        system_usage: None,
        idle: 100.0 - total_usage,
        per_core: vec![total_usage; 4],
        physical_cores: Some(4),
        frequency_mhz: None,
        temperature: None,
        load_average: LoadAverage::default(),
        uptime: Duration::from_secs(60),
    }
}

pub fn memory_snapshot(used_gib: u64) -> MemorySnapshot {
    MemorySnapshot::new(8 * GIB, used_gib * GIB, 8 * GIB - used_gib * GIB, SwapUsage::default())
}

pub fn fresh(snapshot: impl Into<Snapshot>) -> Fetched<Snapshot> {
    Fetched::Fresh { snapshot: snapshot.into(), captured_at: tokio::time::Instant::now() }
}

pub fn cached(snapshot: impl Into<Snapshot>) -> Fetched<Snapshot> {
    Fetched::Cached { snapshot: snapshot.into(), captured_at: tokio::time::Instant::now() }
}

/// Reader that returns `snapshot` after `delay`, with caching disabled
pub fn delayed_reader<S>(snapshot: S, delay: Duration) -> DomainReader<S>
where
    S: MetricSnapshot,
{
    let mut source = MockNativeSource::new();
    source.expect_sample().returning(move || {
        std::thread::sleep(delay);
        Ok(snapshot.clone())
    });
    let descriptor = ReaderDescriptor::for_widget(S::WIDGET_TYPE).with_cache_ttl(Duration::ZERO);
    DomainReader::new(descriptor, Box::new(source))
}

pub fn cpu_reader(total_usage: f64) -> MetricReader {
    MetricReader::Cpu(delayed_reader(cpu_snapshot(total_usage), Duration::ZERO))
}

pub fn failing_reader(error: ReadError) -> MetricReader {
    let mut source = MockNativeSource::<MemorySnapshot>::new();
    source.expect_sample().returning(move || Err(error.clone()));
    let descriptor = ReaderDescriptor::for_widget(MemorySnapshot::WIDGET_TYPE).with_cache_ttl(Duration::ZERO);
    MetricReader::Memory(DomainReader::new(descriptor, Box::new(source)))
}

pub fn memory_reader(used_gib: u64) -> MetricReader {
    MetricReader::Memory(delayed_reader(memory_snapshot(used_gib), Duration::ZERO))
}
