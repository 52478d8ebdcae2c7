//! # Monitor
//!
//! The main context. A single task owns the scheduler, the data store, the
//! coordinator, the threshold engine and the configuration store, and is the
//! only place any of them is mutated. Background fetches report back over a
//! channel; the presentation layer talks to the task through a cloneable
//! [`MonitorHandle`].
//!
//! ## Example
//!
//! ```no_run
//! use tonic_telemetry::{config::{ConfigurationStore, FileStore}, monitor::{Monitor, MonitorConfig}};
//!
//! # async fn run() -> tonic_telemetry::Result<()> {
//! let (configuration, _warnings) = ConfigurationStore::load(Box::new(FileStore::default_location()?));
//! let monitor = Monitor::start_native(MonitorConfig::default(), configuration);
//!
//! let mut revisions = monitor.revisions();
//! revisions.changed().await.ok();
//! println!("{:?}", monitor.store().current(tonic_telemetry::WidgetType::Cpu));
//!
//! monitor.stop().await
//! # }
//! ```
use std::{sync::Arc, time::Duration};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::info;

use crate::{
    config::ConfigurationStore,
    coordinator::{Debouncer, WidgetCoordinator},
    core::metrics::{DEFAULT_HISTORY_CAPACITY, MAX_HISTORY_CAPACITY},
    notifications::{spawn_delivery, LogDelivery, NotificationDelivery, NotificationThresholdEngine},
    reader::{NativeReaderFactory, ReaderFactory},
    scheduler::{RefreshScheduler, TickPolicy},
    store::{StoreReader, WidgetDataStore},
};

mod actor;
mod handle;

use actor::MonitorActor;
pub use handle::MonitorHandle;

const COMMAND_CAPACITY: usize = 32;
const COMPLETION_CAPACITY: usize = 64;

/// Shortest tick period the monitor will run with
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(10);
/// Shortest bound on a single native call
pub const MIN_FETCH_TIMEOUT: Duration = Duration::from_millis(10);

/// Runtime knobs of the monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorConfig {
    /// Points kept per series, at most [`MAX_HISTORY_CAPACITY`]
    pub history_capacity: usize,
    pub fetch_timeout_ms: u64,
    /// Overrides every domain's cache TTL when set
    pub cache_ttl_ms: Option<u64>,
    pub debounce_ms: u64,
    pub cooldown_secs: u64,
    /// Refresh intervals without data before a widget reads as stale
    pub stale_after_cycles: u32,
    pub tick: TickPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            fetch_timeout_ms: 5_000,
            cache_ttl_ms: None,
            debounce_ms: 100,
            cooldown_secs: 60,
            stale_after_cycles: 3,
            tick: TickPolicy::default(),
        }
    }
}

impl MonitorConfig {
    pub fn history_capacity(&self) -> usize {
        self.history_capacity.clamp(1, MAX_HISTORY_CAPACITY)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms).max(MIN_FETCH_TIMEOUT)
    }

    /// Tick policy with both periods raised to at least [`MIN_TICK_PERIOD`]
    pub fn tick_policy(&self) -> TickPolicy {
        TickPolicy { slow: self.tick.slow.max(MIN_TICK_PERIOD), fast: self.tick.fast.max(MIN_TICK_PERIOD), ..self.tick }
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_ms.map(Duration::from_millis)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Entry point for starting monitoring sessions
#[derive(Debug)]
pub struct Monitor;

impl Monitor {
    /// Spawns the monitor task. Must be called inside a Tokio runtime.
    pub fn start(
        config: MonitorConfig,
        configuration: ConfigurationStore,
        factory: Box<dyn ReaderFactory>,
        delivery: Arc<dyn NotificationDelivery>,
    ) -> MonitorHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (completion_tx, completion_rx) = mpsc::channel(COMPLETION_CAPACITY);
        let (revision_tx, revision_rx) = watch::channel(0);

        let store = Arc::new(RwLock::new(WidgetDataStore::new(config.history_capacity(), config.stale_after_cycles)));
        let engine = NotificationThresholdEngine::new(config.cooldown());
        let alerts = engine.subscribe();
        spawn_delivery(engine.subscribe(), delivery);
        let configuration_events = configuration.subscribe();

        let handle = MonitorHandle::new(
            command_tx,
            StoreReader::new(Arc::clone(&store)),
            revision_rx,
            Arc::new(configuration.subscribe()),
            Arc::new(alerts),
        );

        let actor = MonitorActor {
            scheduler: RefreshScheduler::new(completion_tx, config.tick_policy()),
            store,
            coordinator: WidgetCoordinator::new(factory),
            engine,
            configuration,
            debouncer: Debouncer::new(config.debounce_window()),
            revision: 0,
            revisions: revision_tx,
        };
        info!(?config, "monitor starting");
        tokio::spawn(actor.run(command_rx, completion_rx, configuration_events));

        handle
    }

    /// Starts monitoring with the host's native readers and log-only alerts
    pub fn start_native(config: MonitorConfig, configuration: ConfigurationStore) -> MonitorHandle {
        let mut factory = NativeReaderFactory::new(config.fetch_timeout());
        if let Some(ttl) = config.cache_ttl() {
            factory = factory.with_cache_ttl(ttl);
        }
        Self::start(config, configuration, Box::new(factory), Arc::new(LogDelivery))
    }
}

#[cfg(test)]
mod tests;
