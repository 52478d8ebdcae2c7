use std::time::Duration;

use super::*;
use crate::{
    config::{ComparisonOperator, MemoryStore, NotificationThreshold},
    coordinator::WidgetState,
    core::types::{SeriesKey, WidgetType},
    error::Error,
    reader::MockReaderFactory,
    store::{Availability, StoreReader},
    test_utils::{cpu_reader, memory_reader},
};

const WAIT: Duration = Duration::from_secs(2);

fn test_config() -> MonitorConfig {
    MonitorConfig {
        debounce_ms: 20,
        tick: TickPolicy { slow: Duration::from_millis(50), fast: Duration::from_millis(50), fast_threshold: 5 },
        ..MonitorConfig::default()
    }
}

fn configuration(enabled: &[WidgetType]) -> ConfigurationStore {
    let (mut store, _) = ConfigurationStore::load(Box::new(MemoryStore::new()));
    for widget_type in WidgetType::ALL {
        let is_enabled = enabled.contains(&widget_type);
        store.update(widget_type, move |widget| widget.is_enabled = is_enabled).unwrap();
    }
    store
}

fn factory(cpu_usage: f64) -> MockReaderFactory {
    let mut factory = MockReaderFactory::new();
    factory.expect_create().returning(move |widget_type| match widget_type {
        WidgetType::Cpu => Ok(cpu_reader(cpu_usage)),
        WidgetType::Memory => Ok(memory_reader(3)),
        other => Err(Error::NotAvailable(other.to_string())),
    });
    factory
}

fn start(enabled: &[WidgetType], cpu_usage: f64) -> MonitorHandle {
    Monitor::start(test_config(), configuration(enabled), Box::new(factory(cpu_usage)), Arc::new(LogDelivery))
}

/// Waits on store revisions until `ready` holds
async fn wait_until(handle: &MonitorHandle, ready: impl Fn(&StoreReader) -> bool) -> bool {
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

#[tokio::test]
async fn test_first_sample_is_committed() {
    let handle = start(&[WidgetType::Cpu], 42.5);

    assert!(wait_until(&handle, |store| store.current(WidgetType::Cpu).is_some()).await);

    assert_eq!(handle.store().latest(SeriesKey::CpuTotal).map(|sample| sample.value), Some(42.5));
    assert_eq!(handle.store().availability(WidgetType::Cpu), Some(Availability::Available));
    assert_eq!(handle.widget_state(WidgetType::Cpu).await.unwrap(), WidgetState::Active);
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_configuration_change_reaches_readers() {
    let handle = start(&[WidgetType::Cpu], 10.0);
    assert!(wait_until(&handle, |store| store.current(WidgetType::Cpu).is_some()).await);

    handle.update_configuration(WidgetType::Cpu, |cpu| cpu.is_enabled = false).await.unwrap();
    handle.update_configuration(WidgetType::Memory, |memory| memory.is_enabled = true).await.unwrap();

    assert!(
        wait_until(&handle, |store| {
            store.availability(WidgetType::Cpu).is_none() && store.current(WidgetType::Memory).is_some()
        })
        .await
    );
    assert_eq!(handle.widget_state(WidgetType::Cpu).await.unwrap(), WidgetState::Disabled);
    assert_eq!(handle.widget_state(WidgetType::Memory).await.unwrap(), WidgetState::Active);
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_unsupported_widget_is_hidden() {
    let handle = start(&[WidgetType::Gpu], 10.0);

    assert!(wait_until(&handle, |store| store.availability(WidgetType::Gpu) == Some(Availability::Hidden)).await);
    assert_eq!(handle.widget_state(WidgetType::Gpu).await.unwrap(), WidgetState::Disabled);
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_threshold_fires_once_while_condition_holds() {
    let mut configuration = configuration(&[WidgetType::Cpu]);
    configuration
        .update(WidgetType::Cpu, |cpu| {
            cpu.refresh_interval_seconds = 0.5;
            cpu.notification_thresholds.push(NotificationThreshold::new(
                SeriesKey::CpuTotal,
                ComparisonOperator::GreaterThan,
                90.0,
            ));
        })
        .unwrap();
    let handle = Monitor::start(test_config(), configuration, Box::new(factory(95.0)), Arc::new(LogDelivery));
    let mut alerts = handle.subscribe_alerts();

    let event = tokio::time::timeout(WAIT, alerts.recv()).await.unwrap().unwrap();
    assert_eq!(event.metric_key, SeriesKey::CpuTotal);
    assert_eq!(event.value, 95.0);

    // Several more fresh samples arrive, all above the threshold
    assert!(wait_until(&handle, |store| store.history(SeriesKey::CpuTotal).len() >= 3).await);
    assert!(alerts.try_recv().is_err());

    let configuration = handle.configuration().await.unwrap();
    let cpu = configuration.iter().find(|widget| widget.widget_type == WidgetType::Cpu).unwrap();
    assert!(cpu.notification_thresholds[0].last_fired_timestamp.is_some());
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_tears_down_store() {
    let handle = start(&[WidgetType::Cpu, WidgetType::Memory], 10.0);
    assert!(wait_until(&handle, |store| store.current(WidgetType::Memory).is_some()).await);

    handle.stop().await.unwrap();

    assert!(!handle.is_running());
    assert!(handle.store().with(|store| store.is_torn_down()));
    assert!(handle.store().current(WidgetType::Cpu).is_none());
    assert!(matches!(handle.configuration().await, Err(Error::Channel(_))));
    // Stopping twice is fine
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_enable_lands_while_configuration_keeps_changing() {
    let config = MonitorConfig { tick: test_config().tick, ..MonitorConfig::default() };
    assert_eq!(config.debounce_window(), Duration::from_millis(100));
    let handle =
        Monitor::start(config, configuration(&[WidgetType::Memory]), Box::new(factory(10.0)), Arc::new(LogDelivery));

    let enabled_at = tokio::time::Instant::now();
    handle.update_configuration(WidgetType::Cpu, |cpu| cpu.is_enabled = true).await.unwrap();

    let mut active_after = None;
    for step in 0..20u32 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let color = format!("#0000{:02X}", step);
        handle.update_configuration(WidgetType::Memory, move |memory| memory.accent_color = color).await.unwrap();
        if handle.widget_state(WidgetType::Cpu).await.unwrap() == WidgetState::Active {
            active_after = Some(enabled_at.elapsed());
            break;
        }
    }

    let active_after = active_after.expect("cpu never started while memory kept changing");
    assert!(active_after <= Duration::from_millis(300), "cpu started after {active_after:?}");
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_zero_periods_are_clamped() {
    let config = MonitorConfig {
        debounce_ms: 0,
        fetch_timeout_ms: 0,
        tick: TickPolicy { slow: Duration::ZERO, fast: Duration::ZERO, fast_threshold: 5 },
        ..MonitorConfig::default()
    };
    let handle = Monitor::start(config, configuration(&[WidgetType::Cpu]), Box::new(factory(42.5)), Arc::new(LogDelivery));

    assert!(wait_until(&handle, |store| store.current(WidgetType::Cpu).is_some()).await);
    assert!(handle.is_running());
    assert_eq!(handle.widget_state(WidgetType::Cpu).await.unwrap(), WidgetState::Active);
    handle.stop().await.unwrap();
}

#[test]
fn test_monitor_config_defaults_and_clamps() {
    let config: MonitorConfig = serde_json::from_str(r#"{ "historyCapacity": 500, "debounceMs": 50 }"#).unwrap();

    assert_eq!(config.history_capacity(), MAX_HISTORY_CAPACITY);
    assert_eq!(config.debounce_window(), Duration::from_millis(50));
    assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
    assert_eq!(config.cooldown(), Duration::from_secs(60));
    assert_eq!(config.cache_ttl(), None);
    assert_eq!(config.tick, TickPolicy::default());
    assert_eq!(config.tick_policy(), TickPolicy::default());

    let config: MonitorConfig =
        serde_json::from_str(r#"{ "fetchTimeoutMs": 0, "tick": { "slow": 0, "fast": 0, "fastThreshold": 2 } }"#)
            .unwrap();
    assert_eq!(config.fetch_timeout(), MIN_FETCH_TIMEOUT);
    assert_eq!(
        config.tick_policy(),
        TickPolicy { slow: MIN_TICK_PERIOD, fast: MIN_TICK_PERIOD, fast_threshold: 2 }
    );
}
