#![allow(dead_code)]

pub mod builders;
pub mod fakes;

use std::time::Duration;

use tonic_telemetry::{
    config::{ConfigurationStore, KeyValueStore, MemoryStore},
    monitor::{MonitorConfig, MonitorHandle},
    scheduler::TickPolicy,
    store::StoreReader,
    WidgetType,
};

pub use builders::{TestBatteryBuilder, TestCpuBuilder};
pub use fakes::{FailingStore, FakeFactory, RecordingDelivery, ScriptedSource};

pub const WAIT: Duration = Duration::from_secs(3);

/// Monitor settings with short timers so tests run in real time
pub fn fast_config() -> MonitorConfig {
    MonitorConfig {
        debounce_ms: 20,
        fetch_timeout_ms: 200,
        tick: TickPolicy { slow: Duration::from_millis(25), fast: Duration::from_millis(25), fast_threshold: 5 },
        ..MonitorConfig::default()
    }
}

/// Configuration with exactly `enabled` turned on and the fastest refresh interval
pub fn configuration_with(backend: impl KeyValueStore + 'static, enabled: &[WidgetType]) -> ConfigurationStore {
    let (mut store, _) = ConfigurationStore::load(Box::new(backend));
    for widget_type in WidgetType::ALL {
        let is_enabled = enabled.contains(&widget_type);
        store
            .update(widget_type, move |widget| {
                widget.is_enabled = is_enabled;
                widget.refresh_interval_seconds = 0.5;
            })
            .ok();
    }
    store
}

pub fn memory_configuration(enabled: &[WidgetType]) -> ConfigurationStore {
    configuration_with(MemoryStore::new(), enabled)
}

/// Waits on store revisions until `ready` holds or [`WAIT`] passes
pub async fn wait_until(handle: &MonitorHandle, ready: impl Fn(&StoreReader) -> bool) -> bool {
    let mut revisions = handle.revisions();
    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        if ready(handle.store()) {
            return true;
        }
        if tokio::time::timeout_at(deadline, revisions.changed()).await.is_err() {
            return ready(handle.store());
        }
    }
}
