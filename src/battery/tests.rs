use std::time::Duration;

use super::*;
use crate::{core::types::SeriesKey, traits::MetricSnapshot};

fn discharging(charge: f64) -> BatterySnapshot {
    BatterySnapshot {
        is_present: true,
        charge,
        state: ChargeState::Discharging,
        power_source: PowerSource::Battery,
        health: Some(91.0),
        cycle_count: Some(120),
        temperature: Some(31.5),
        time_remaining: Some(Duration::from_secs(3600)),
        power_draw: Some(8.2),
    }
}

#[test]
fn test_absent_battery_is_hidden() {
    let snapshot = BatterySnapshot::absent();
    assert!(!snapshot.is_present());
    assert!(snapshot.series().is_empty());
    assert!(!snapshot.is_low());
}

#[test]
fn test_series() {
    let snapshot = discharging(64.0);
    assert_eq!(snapshot.series(), vec![(SeriesKey::BatteryCharge, 64.0), (SeriesKey::BatteryTemperature, 31.5)]);
}

#[test]
fn test_power_source_from_state() {
    assert_eq!(ChargeState::Charging.power_source(), PowerSource::AC);
    assert_eq!(ChargeState::Full.power_source(), PowerSource::AC);
    assert_eq!(ChargeState::Discharging.power_source(), PowerSource::Battery);
    assert_eq!(ChargeState::Unknown.power_source(), PowerSource::Unknown);
}

#[test]
fn test_condition_buckets() {
    assert_eq!(BatteryCondition::from_health(95.0), BatteryCondition::Good);
    assert_eq!(BatteryCondition::from_health(HEALTH_FAIR_THRESHOLD), BatteryCondition::Fair);
    assert_eq!(BatteryCondition::from_health(30.0), BatteryCondition::Poor);
    assert_eq!(discharging(50.0).condition(), Some(BatteryCondition::Good));
}

#[test]
fn test_low_charge_only_on_battery_power() {
    assert!(discharging(10.0).is_low());

    let mut charging = discharging(10.0);
    charging.state = ChargeState::Charging;
    charging.power_source = PowerSource::AC;
    assert!(!charging.is_low());
}
