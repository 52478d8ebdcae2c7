use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tracing::debug;

use super::{DomainReader, MetricReader, ReaderDescriptor};
use crate::{
    battery::SystemBatterySource,
    bluetooth::SystemBluetoothSource,
    core::types::WidgetType,
    cpu::SystemCpuSource,
    disk::SystemDiskSource,
    error::Result,
    gpu::SystemGpuSource,
    memory::SystemMemorySource,
    network::SystemNetworkSource,
    sensors::SystemSensorsSource,
    traits::{MetricSnapshot, NativeSource},
};

/// Creates the reader for a widget when it is enabled.
///
/// Creation may fail when the platform has no support for a domain at all;
/// the widget is then left disabled and reported unavailable.
#[cfg_attr(test, automock)]
pub trait ReaderFactory: Send {
    fn create(&mut self, widget_type: WidgetType) -> Result<MetricReader>;
}

/// Factory producing readers backed by the host's native sources
#[derive(Debug, Clone)]
pub struct NativeReaderFactory {
    timeout: Duration,
    cache_ttl: Option<Duration>,
}

impl Default for NativeReaderFactory {
    fn default() -> Self {
        Self { timeout: super::DEFAULT_FETCH_TIMEOUT, cache_ttl: None }
    }
}

impl NativeReaderFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, cache_ttl: None }
    }

    /// Overrides every domain's default cache TTL
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = Some(cache_ttl);
        self
    }

    fn reader<S: MetricSnapshot>(&self, source: impl NativeSource<S> + 'static) -> DomainReader<S> {
        let mut descriptor = ReaderDescriptor::for_widget(S::WIDGET_TYPE).with_timeout(self.timeout);
        if let Some(ttl) = self.cache_ttl {
            descriptor = descriptor.with_cache_ttl(ttl);
        }
        DomainReader::new(descriptor, Box::new(source))
    }
}

impl ReaderFactory for NativeReaderFactory {
    fn create(&mut self, widget_type: WidgetType) -> Result<MetricReader> {
        debug!(%widget_type, "creating native reader");
        let reader = match widget_type {
            WidgetType::Cpu => MetricReader::Cpu(self.reader(SystemCpuSource::new()?)),
            WidgetType::Memory => MetricReader::Memory(self.reader(SystemMemorySource::new()?)),
            WidgetType::Disk => MetricReader::Disk(self.reader(SystemDiskSource::new()?)),
            WidgetType::Network => MetricReader::Network(self.reader(SystemNetworkSource::new()?)),
            WidgetType::Gpu => MetricReader::Gpu(self.reader(SystemGpuSource::new())),
            WidgetType::Battery => MetricReader::Battery(self.reader(SystemBatterySource::new())),
            WidgetType::Sensors => MetricReader::Sensors(self.reader(SystemSensorsSource::new()?)),
            WidgetType::Bluetooth => MetricReader::Bluetooth(self.reader(SystemBluetoothSource::new())),
        };
        Ok(reader)
    }
}
