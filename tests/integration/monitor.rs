use std::{sync::Arc, time::Duration};

use tonic_telemetry::{
    battery::BatterySnapshot,
    config::{ComparisonOperator, NotificationThreshold},
    coordinator::WidgetState,
    memory::{MemorySnapshot, SwapUsage},
    monitor::Monitor,
    notifications::LogDelivery,
    reader::Snapshot,
    store::{Availability, Freshness},
    Error, ReadError, SeriesKey, WidgetType,
};

use crate::common::{
    configuration_with, fast_config, memory_configuration, wait_until, FailingStore, FakeFactory, RecordingDelivery,
    ScriptedSource, TestBatteryBuilder, TestCpuBuilder,
};

fn memory() -> MemorySnapshot {
    let gib = 1024 * 1024 * 1024;
    MemorySnapshot::new(16 * gib, 6 * gib, 10 * gib, SwapUsage { total: 2 * gib, used: 0 })
}

#[tokio::test]
async fn test_cpu_sample_is_committed_to_snapshot_and_history() {
    let cpu = ScriptedSource::always(TestCpuBuilder::new().usage(42.5).build());
    let factory = FakeFactory::new().with(cpu);
    let handle =
        Monitor::start(fast_config(), memory_configuration(&[WidgetType::Cpu]), Box::new(factory), Arc::new(LogDelivery));

    assert!(wait_until(&handle, |store| store.current(WidgetType::Cpu).is_some()).await);

    let Some(Snapshot::Cpu(snapshot)) = handle.store().current(WidgetType::Cpu) else {
        panic!("expected a cpu snapshot");
    };
    assert_eq!(snapshot.total_usage, 42.5);
    let history = handle.store().history(SeriesKey::CpuTotal);
    assert_eq!(history.last().map(|sample| sample.value), Some(42.5));
    assert!(matches!(handle.store().freshness(WidgetType::Cpu), Freshness::Live { .. }));

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_missing_battery_hides_widget() {
    let battery = ScriptedSource::always(TestBatteryBuilder::new().present(false).build());
    let factory = FakeFactory::new().with(battery);
    let handle = Monitor::start(
        fast_config(),
        memory_configuration(&[WidgetType::Battery]),
        Box::new(factory),
        Arc::new(LogDelivery),
    );

    assert!(
        wait_until(&handle, |store| store.availability(WidgetType::Battery) == Some(Availability::Hidden)).await
    );

    let view = handle.store().view(WidgetType::Battery).unwrap();
    assert_eq!(view.freshness, Freshness::Unavailable);
    assert!(view.snapshot.is_none());
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_present_battery_is_shown() {
    let battery: ScriptedSource<BatterySnapshot> =
        ScriptedSource::always(TestBatteryBuilder::new().charge(64.0).build());
    let factory = FakeFactory::new().with(battery);
    let handle = Monitor::start(
        fast_config(),
        memory_configuration(&[WidgetType::Battery]),
        Box::new(factory),
        Arc::new(LogDelivery),
    );

    assert!(wait_until(&handle, |store| store.latest(SeriesKey::BatteryCharge).is_some()).await);
    assert_eq!(handle.store().availability(WidgetType::Battery), Some(Availability::Available));
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_disabling_mid_fetch_discards_result() {
    let cpu = ScriptedSource::always(TestCpuBuilder::new().build()).with_delay(Duration::from_millis(150));
    let spy = cpu.clone();
    let factory = FakeFactory::new().with(cpu);
    let handle =
        Monitor::start(fast_config(), memory_configuration(&[WidgetType::Cpu]), Box::new(factory), Arc::new(LogDelivery));

    // The first fetch is issued as soon as the monitor starts
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.update_configuration(WidgetType::Cpu, |cpu| cpu.is_enabled = false).await.unwrap();
    assert!(wait_until(&handle, |store| store.availability(WidgetType::Cpu).is_none()).await);

    // Well past the point where the native call returned
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(spy.calls(), 1);
    assert!(handle.store().current(WidgetType::Cpu).is_none());
    assert!(handle.store().history(SeriesKey::CpuTotal).is_empty());
    assert_eq!(handle.widget_state(WidgetType::Cpu).await.unwrap(), WidgetState::Disabled);
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_transient_failures_keep_last_good_value() {
    let cpu = ScriptedSource::new(vec![
        Ok(TestCpuBuilder::new().usage(30.0).build()),
        Err(ReadError::native("sensor busy")),
        Err(ReadError::Timeout(Duration::from_millis(200))),
    ]);
    let factory = FakeFactory::new().with(cpu);
    let handle =
        Monitor::start(fast_config(), memory_configuration(&[WidgetType::Cpu]), Box::new(factory), Arc::new(LogDelivery));

    assert!(wait_until(&handle, |store| store.with(|s| s.consecutive_failures(WidgetType::Cpu) >= 2)).await);

    assert_eq!(handle.store().latest(SeriesKey::CpuTotal).map(|sample| sample.value), Some(30.0));
    assert_eq!(handle.store().availability(WidgetType::Cpu), Some(Availability::Available));
    assert!(handle.store().current(WidgetType::Cpu).is_some());
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_data_goes_stale_when_fetches_keep_failing() {
    let cpu = ScriptedSource::new(vec![Ok(TestCpuBuilder::new().build()), Err(ReadError::native("gone quiet"))]);
    let factory = FakeFactory::new().with(cpu);
    let handle =
        Monitor::start(fast_config(), memory_configuration(&[WidgetType::Cpu]), Box::new(factory), Arc::new(LogDelivery));

    // 0.5 s interval, stale after three missed intervals
    assert!(
        wait_until(&handle, |store| matches!(store.freshness(WidgetType::Cpu), Freshness::Stale { .. })).await
    );
    assert!(handle.store().current(WidgetType::Cpu).is_some());
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_threshold_alert_is_delivered_once() {
    let cpu = ScriptedSource::always(TestCpuBuilder::new().usage(96.0).build());
    let factory = FakeFactory::new().with(cpu);
    let mut configuration = memory_configuration(&[WidgetType::Cpu]);
    configuration
        .update(WidgetType::Cpu, |cpu| {
            cpu.notification_thresholds.push(NotificationThreshold::new(
                SeriesKey::CpuTotal,
                ComparisonOperator::GreaterOrEqual,
                95.0,
            ))
        })
        .unwrap();
    let delivery = RecordingDelivery::default();
    let handle = Monitor::start(fast_config(), configuration, Box::new(factory), Arc::new(delivery.clone()));

    assert!(wait_until(&handle, |store| store.history(SeriesKey::CpuTotal).len() >= 3).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let delivered = delivery.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].widget_type, WidgetType::Cpu);
    assert_eq!(delivered[0].value, 96.0);
    assert_eq!(delivered[0].threshold.value, 95.0);
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_persistence_error_still_reaches_running_readers() {
    let backend = FailingStore::new();
    let configuration = configuration_with(backend.clone(), &[WidgetType::Cpu]);
    let factory = FakeFactory::new()
        .with(ScriptedSource::always(TestCpuBuilder::new().build()))
        .with(ScriptedSource::always(memory()));
    let handle = Monitor::start(fast_config(), configuration, Box::new(factory), Arc::new(LogDelivery));
    let mut changes = handle.subscribe_configuration();

    backend.fail_writes(true);
    let result = handle.update_configuration(WidgetType::Memory, |memory| memory.is_enabled = true).await;

    assert!(matches!(result, Err(Error::Io(_))));
    assert!(changes.recv().await.is_ok());
    assert!(wait_until(&handle, |store| store.current(WidgetType::Memory).is_some()).await);
    assert_eq!(handle.widget_state(WidgetType::Memory).await.unwrap(), WidgetState::Active);
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_unsupported_widget_is_hidden_without_affecting_others() {
    let factory = FakeFactory::new().with(ScriptedSource::always(TestCpuBuilder::new().build()));
    let created = factory.created();
    let handle = Monitor::start(
        fast_config(),
        memory_configuration(&[WidgetType::Cpu, WidgetType::Bluetooth]),
        Box::new(factory),
        Arc::new(LogDelivery),
    );

    assert!(
        wait_until(&handle, |store| {
            store.current(WidgetType::Cpu).is_some()
                && store.availability(WidgetType::Bluetooth) == Some(Availability::Hidden)
        })
        .await
    );
    assert_eq!(*created.lock(), vec![WidgetType::Cpu]);
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_cancels_work_and_tears_down() {
    let cpu = ScriptedSource::always(TestCpuBuilder::new().build()).with_delay(Duration::from_millis(100));
    let factory = FakeFactory::new().with(cpu);
    let handle =
        Monitor::start(fast_config(), memory_configuration(&[WidgetType::Cpu]), Box::new(factory), Arc::new(LogDelivery));
    tokio::time::sleep(Duration::from_millis(20)).await;

    handle.stop().await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(!handle.is_running());
    assert!(handle.store().current(WidgetType::Cpu).is_none());
    assert!(handle.store().with(|store| store.is_torn_down()));
}
