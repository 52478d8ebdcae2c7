use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tonic_telemetry::{
    config::{KeyValueStore, MemoryStore},
    notifications::{NotificationDelivery, ThresholdEvent},
    reader::{DomainReader, MetricReader, ReaderDescriptor, ReaderFactory},
    traits::{MetricSnapshot, NativeSource},
    Error, ReadError, Result, WidgetType,
};

/// Native source replaying a fixed script of results; the last one repeats
pub struct ScriptedSource<S> {
    steps: Arc<Vec<std::result::Result<S, ReadError>>>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl<S> Clone for ScriptedSource<S> {
    fn clone(&self) -> Self {
        Self { steps: Arc::clone(&self.steps), delay: self.delay, calls: Arc::clone(&self.calls) }
    }
}

impl<S> ScriptedSource<S> {
    pub fn new(steps: Vec<std::result::Result<S, ReadError>>) -> Self {
        Self { steps: Arc::new(steps), delay: Duration::ZERO, calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn always(snapshot: S) -> Self {
        Self::new(vec![Ok(snapshot)])
    }

    /// Every call blocks for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Native calls made so far, shared between clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<S: Clone + Send + Sync + 'static> NativeSource<S> for ScriptedSource<S> {
    fn sample(&mut self) -> std::result::Result<S, ReadError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.steps
            .get(call)
            .or_else(|| self.steps.last())
            .cloned()
            .unwrap_or_else(|| Err(ReadError::unavailable("empty script")))
    }
}

type ReaderBuilder = Box<dyn FnMut() -> MetricReader + Send>;

/// Reader factory serving scripted sources; unknown widget types fail to start
#[derive(Default)]
pub struct FakeFactory {
    builders: HashMap<WidgetType, ReaderBuilder>,
    created: Arc<Mutex<Vec<WidgetType>>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Readers for `S` share `source`, with caching disabled
    pub fn with<S>(mut self, source: ScriptedSource<S>) -> Self
    where
        S: MetricSnapshot,
        DomainReader<S>: Into<MetricReader>,
    {
        self.builders.insert(
            S::WIDGET_TYPE,
            Box::new(move || {
                let descriptor = ReaderDescriptor::for_widget(S::WIDGET_TYPE)
                    .with_cache_ttl(Duration::ZERO)
                    .with_timeout(Duration::from_millis(200));
                DomainReader::new(descriptor, Box::new(source.clone())).into()
            }),
        );
        self
    }

    /// Widget types a reader was created for, in order
    pub fn created(&self) -> Arc<Mutex<Vec<WidgetType>>> {
        Arc::clone(&self.created)
    }
}

impl ReaderFactory for FakeFactory {
    fn create(&mut self, widget_type: WidgetType) -> Result<MetricReader> {
        let builder = self
            .builders
            .get_mut(&widget_type)
            .ok_or_else(|| Error::NotAvailable(format!("no fake reader for {widget_type}")))?;
        self.created.lock().push(widget_type);
        Ok(builder())
    }
}

/// Memory-backed store whose writes can be switched to fail
#[derive(Clone, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_writes: Arc<AtomicBool>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contents(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.get(key)
    }
}

impl KeyValueStore for FailingStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume")));
        }
        self.inner.write(key, value)
    }
}

/// Delivery that records every event it is handed
#[derive(Clone, Default)]
pub struct RecordingDelivery {
    delivered: Arc<Mutex<Vec<ThresholdEvent>>>,
}

impl RecordingDelivery {
    pub fn delivered(&self) -> Vec<ThresholdEvent> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl NotificationDelivery for RecordingDelivery {
    async fn deliver(&self, event: ThresholdEvent) -> Result<()> {
        self.delivered.lock().push(event);
        Ok(())
    }
}
