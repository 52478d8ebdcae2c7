//! # Metric Readers
//!
//! A reader owns one native source for one domain. `fetch()` answers from the
//! reader's cache while it is fresh, otherwise it runs the blocking native call
//! on the blocking pool raced against a timeout.
//!
//! Fetch futures own everything they touch (a handle to the source and the
//! cache), so the scheduler can abort them at any point without leaving the
//! reader in a half-updated state.
use std::{sync::Arc, time::Duration};

use futures::{future::BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::{
    battery::BatterySnapshot,
    bluetooth::BluetoothSnapshot,
    core::types::{SeriesKey, WidgetType},
    cpu::CpuSnapshot,
    disk::DiskSnapshot,
    error::ReadError,
    gpu::GpuSnapshot,
    memory::MemorySnapshot,
    network::NetworkSnapshot,
    resource::ReaderCache,
    sensors::SensorsSnapshot,
    traits::{MetricSnapshot, NativeSource},
};

mod factory;

pub use factory::{NativeReaderFactory, ReaderFactory};

#[cfg(test)]
pub use factory::MockReaderFactory;

/// Default upper bound for a single native call
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Static facts about a reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderDescriptor {
    pub widget_type: WidgetType,
    pub preferred_interval: Duration,
    pub cache_ttl: Duration,
    pub timeout: Duration,
}

impl ReaderDescriptor {
    /// Descriptor with the domain's default interval and TTL
    pub fn for_widget(widget_type: WidgetType) -> Self {
        Self {
            widget_type,
            preferred_interval: widget_type.preferred_interval(),
            cache_ttl: widget_type.default_cache_ttl(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Result of a successful fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<S> {
    /// A native call was made for this fetch
    Fresh { snapshot: S, captured_at: Instant },
    /// Served from the reader cache without touching hardware
    Cached { snapshot: S, captured_at: Instant },
}

impl<S> Fetched<S> {
    pub fn snapshot(&self) -> &S {
        match self {
            Fetched::Fresh { snapshot, .. } | Fetched::Cached { snapshot, .. } => snapshot,
        }
    }

    pub fn into_snapshot(self) -> S {
        match self {
            Fetched::Fresh { snapshot, .. } | Fetched::Cached { snapshot, .. } => snapshot,
        }
    }

    pub fn captured_at(&self) -> Instant {
        match self {
            Fetched::Fresh { captured_at, .. } | Fetched::Cached { captured_at, .. } => *captured_at,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Fetched::Fresh { .. })
    }

    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Fetched<T> {
        match self {
            Fetched::Fresh { snapshot, captured_at } => Fetched::Fresh { snapshot: f(snapshot), captured_at },
            Fetched::Cached { snapshot, captured_at } => Fetched::Cached { snapshot: f(snapshot), captured_at },
        }
    }
}

type SharedSource<S> = Arc<Mutex<Box<dyn NativeSource<S>>>>;

/// Reader for one domain, generic over its snapshot type
pub struct DomainReader<S: MetricSnapshot> {
    descriptor: ReaderDescriptor,
    source: SharedSource<S>,
    cache: ReaderCache<S>,
}

impl<S: MetricSnapshot> std::fmt::Debug for DomainReader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainReader").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}

impl<S: MetricSnapshot> DomainReader<S> {
    pub fn new(descriptor: ReaderDescriptor, source: Box<dyn NativeSource<S>>) -> Self {
        Self { cache: ReaderCache::new(descriptor.cache_ttl), descriptor, source: Arc::new(Mutex::new(source)) }
    }

    /// Reader with the domain defaults for interval, TTL and timeout
    pub fn with_defaults(source: impl NativeSource<S> + 'static) -> Self {
        Self::new(ReaderDescriptor::for_widget(S::WIDGET_TYPE), Box::new(source))
    }

    pub fn descriptor(&self) -> &ReaderDescriptor {
        &self.descriptor
    }

    /// When the last native sample was captured
    pub fn last_fetch(&self) -> Option<Instant> {
        self.cache.last_fetch()
    }

    /// The last native sample regardless of TTL
    pub fn cached_value(&self) -> Option<S> {
        self.cache.last_value()
    }

    /// Produces a snapshot, hitting hardware only when the cache has expired.
    ///
    /// A sample showing absent hardware is cached like any other but reported
    /// as [`ReadError::Unavailable`].
    pub fn fetch(&self) -> BoxFuture<'static, Result<Fetched<S>, ReadError>> {
        let cache = self.cache.clone();
        let source = Arc::clone(&self.source);
        let descriptor = self.descriptor;

        async move {
            let fetched = match cache.fresh() {
                Some((snapshot, captured_at)) => Fetched::Cached { snapshot, captured_at },
                None => {
                    let snapshot = sample_with_timeout(source, descriptor).await?;
                    let captured_at = cache.store(snapshot.clone());
                    Fetched::Fresh { snapshot, captured_at }
                },
            };

            if !fetched.snapshot().is_present() {
                return Err(ReadError::unavailable(format!("no {} hardware present", descriptor.widget_type)));
            }
            Ok(fetched)
        }
        .boxed()
    }
}

async fn sample_with_timeout<S: MetricSnapshot>(
    source: SharedSource<S>,
    descriptor: ReaderDescriptor,
) -> Result<S, ReadError> {
    let widget_type = descriptor.widget_type;
    let call = tokio::task::spawn_blocking(move || match source.try_lock() {
        Some(mut source) => source.sample(),
        // A timed-out call is still holding the source
        None => Err(ReadError::native(format!("{widget_type} native call still in progress"))),
    });

    match tokio::time::timeout(descriptor.timeout, call).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(ReadError::native(format!("{widget_type} native call panicked: {join_error}"))),
        Err(_) => {
            debug!(%widget_type, timeout = ?descriptor.timeout, "native call timed out");
            Err(ReadError::Timeout(descriptor.timeout))
        },
    }
}

/// Snapshot of any domain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Snapshot {
    Cpu(CpuSnapshot),
    Memory(MemorySnapshot),
    Disk(DiskSnapshot),
    Network(NetworkSnapshot),
    Gpu(GpuSnapshot),
    Battery(BatterySnapshot),
    Sensors(SensorsSnapshot),
    Bluetooth(BluetoothSnapshot),
}

impl Snapshot {
    pub fn widget_type(&self) -> WidgetType {
        match self {
            Snapshot::Cpu(_) => WidgetType::Cpu,
            Snapshot::Memory(_) => WidgetType::Memory,
            Snapshot::Disk(_) => WidgetType::Disk,
            Snapshot::Network(_) => WidgetType::Network,
            Snapshot::Gpu(_) => WidgetType::Gpu,
            Snapshot::Battery(_) => WidgetType::Battery,
            Snapshot::Sensors(_) => WidgetType::Sensors,
            Snapshot::Bluetooth(_) => WidgetType::Bluetooth,
        }
    }

    pub fn series(&self) -> Vec<(SeriesKey, f64)> {
        match self {
            Snapshot::Cpu(s) => s.series(),
            Snapshot::Memory(s) => s.series(),
            Snapshot::Disk(s) => s.series(),
            Snapshot::Network(s) => s.series(),
            Snapshot::Gpu(s) => s.series(),
            Snapshot::Battery(s) => s.series(),
            Snapshot::Sensors(s) => s.series(),
            Snapshot::Bluetooth(s) => s.series(),
        }
    }

    /// Value of one series in this snapshot, if it was measured
    pub fn value(&self, key: SeriesKey) -> Option<f64> {
        if key.widget_type() != self.widget_type() {
            return None;
        }
        self.series().into_iter().find_map(|(series, value)| (series == key).then_some(value))
    }
}

/// Reader for any domain
#[derive(Debug)]
pub enum MetricReader {
    Cpu(DomainReader<CpuSnapshot>),
    Memory(DomainReader<MemorySnapshot>),
    Disk(DomainReader<DiskSnapshot>),
    Network(DomainReader<NetworkSnapshot>),
    Gpu(DomainReader<GpuSnapshot>),
    Battery(DomainReader<BatterySnapshot>),
    Sensors(DomainReader<SensorsSnapshot>),
    Bluetooth(DomainReader<BluetoothSnapshot>),
}

fn lift<S: MetricSnapshot>(
    fetch: BoxFuture<'static, Result<Fetched<S>, ReadError>>,
    wrap: fn(S) -> Snapshot,
) -> BoxFuture<'static, Result<Fetched<Snapshot>, ReadError>> {
    fetch.map(move |result| result.map(|fetched| fetched.map(wrap))).boxed()
}

impl MetricReader {
    pub fn descriptor(&self) -> &ReaderDescriptor {
        match self {
            MetricReader::Cpu(r) => r.descriptor(),
            MetricReader::Memory(r) => r.descriptor(),
            MetricReader::Disk(r) => r.descriptor(),
            MetricReader::Network(r) => r.descriptor(),
            MetricReader::Gpu(r) => r.descriptor(),
            MetricReader::Battery(r) => r.descriptor(),
            MetricReader::Sensors(r) => r.descriptor(),
            MetricReader::Bluetooth(r) => r.descriptor(),
        }
    }

    pub fn widget_type(&self) -> WidgetType {
        self.descriptor().widget_type
    }

    pub fn preferred_interval(&self) -> Duration {
        self.descriptor().preferred_interval
    }

    pub fn last_fetch(&self) -> Option<Instant> {
        match self {
            MetricReader::Cpu(r) => r.last_fetch(),
            MetricReader::Memory(r) => r.last_fetch(),
            MetricReader::Disk(r) => r.last_fetch(),
            MetricReader::Network(r) => r.last_fetch(),
            MetricReader::Gpu(r) => r.last_fetch(),
            MetricReader::Battery(r) => r.last_fetch(),
            MetricReader::Sensors(r) => r.last_fetch(),
            MetricReader::Bluetooth(r) => r.last_fetch(),
        }
    }

    pub fn fetch(&self) -> BoxFuture<'static, Result<Fetched<Snapshot>, ReadError>> {
        match self {
            MetricReader::Cpu(r) => lift(r.fetch(), Snapshot::Cpu),
            MetricReader::Memory(r) => lift(r.fetch(), Snapshot::Memory),
            MetricReader::Disk(r) => lift(r.fetch(), Snapshot::Disk),
            MetricReader::Network(r) => lift(r.fetch(), Snapshot::Network),
            MetricReader::Gpu(r) => lift(r.fetch(), Snapshot::Gpu),
            MetricReader::Battery(r) => lift(r.fetch(), Snapshot::Battery),
            MetricReader::Sensors(r) => lift(r.fetch(), Snapshot::Sensors),
            MetricReader::Bluetooth(r) => lift(r.fetch(), Snapshot::Bluetooth),
        }
    }
}

macro_rules! impl_domain_conversions {
    ($($variant:ident => $snapshot:ty),* $(,)?) => {
        $(
            impl From<DomainReader<$snapshot>> for MetricReader {
                fn from(reader: DomainReader<$snapshot>) -> Self {
                    MetricReader::$variant(reader)
                }
            }

            impl From<$snapshot> for Snapshot {
                fn from(snapshot: $snapshot) -> Self {
                    Snapshot::$variant(snapshot)
                }
            }
        )*
    };
}

impl_domain_conversions! {
    Cpu => CpuSnapshot,
    Memory => MemorySnapshot,
    Disk => DiskSnapshot,
    Network => NetworkSnapshot,
    Gpu => GpuSnapshot,
    Battery => BatterySnapshot,
    Sensors => SensorsSnapshot,
    Bluetooth => BluetoothSnapshot,
}
