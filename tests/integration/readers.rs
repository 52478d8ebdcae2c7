use std::time::Duration;

use tonic_telemetry::{
    battery::BatterySnapshot,
    reader::{DomainReader, MetricReader, ReaderDescriptor},
    ReadError, SeriesKey, WidgetType,
};

use crate::common::{ScriptedSource, TestBatteryBuilder, TestCpuBuilder};

#[tokio::test]
async fn test_cache_serves_repeated_fetches() {
    let source = ScriptedSource::always(TestCpuBuilder::new().usage(12.0).build());
    let spy = source.clone();
    let reader: MetricReader = DomainReader::with_defaults(source).into();

    let first = reader.fetch().await.unwrap();
    let second = reader.fetch().await.unwrap();

    assert!(first.is_fresh());
    assert!(!second.is_fresh());
    assert_eq!(spy.calls(), 1);
    assert_eq!(second.snapshot().value(SeriesKey::CpuTotal), Some(12.0));
    assert_eq!(reader.widget_type(), WidgetType::Cpu);
    assert_eq!(reader.preferred_interval(), Duration::from_secs(2));
}

#[tokio::test]
async fn test_hung_native_call_is_bounded_by_timeout() {
    let source =
        ScriptedSource::always(TestCpuBuilder::new().build()).with_delay(Duration::from_millis(300));
    let descriptor = ReaderDescriptor::for_widget(WidgetType::Cpu).with_timeout(Duration::from_millis(50));
    let reader = DomainReader::new(descriptor, Box::new(source));

    let started = tokio::time::Instant::now();
    let result = reader.fetch().await;

    assert_eq!(result.unwrap_err(), ReadError::Timeout(Duration::from_millis(50)));
    assert!(started.elapsed() < Duration::from_millis(250));
}

#[tokio::test]
async fn test_absent_battery_reads_as_unavailable() {
    let source: ScriptedSource<BatterySnapshot> =
        ScriptedSource::always(TestBatteryBuilder::new().present(false).build());
    let reader = DomainReader::with_defaults(source);

    assert!(reader.fetch().await.unwrap_err().is_unavailable());
}

#[tokio::test]
async fn test_battery_series() {
    let source = ScriptedSource::always(TestBatteryBuilder::new().charge(55.0).charging(true).build());
    let reader: MetricReader = DomainReader::with_defaults(source).into();

    let fetched = reader.fetch().await.unwrap();

    assert_eq!(fetched.snapshot().value(SeriesKey::BatteryCharge), Some(55.0));
    assert_eq!(fetched.snapshot().value(SeriesKey::CpuTotal), None);
}
