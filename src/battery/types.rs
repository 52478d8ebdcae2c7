use std::time::Duration;

use serde::Serialize;

use super::{HEALTH_FAIR_THRESHOLD, HEALTH_GOOD_THRESHOLD, LOW_CHARGE_THRESHOLD};
use crate::{
    core::types::{SeriesKey, WidgetType},
    traits::MetricSnapshot,
};

/// Represents the current power source for the system
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum PowerSource {
    /// Running on battery power
    Battery,
    /// Running on AC power
    AC,
    /// Power source could not be determined
    Unknown,
}

/// Charging state reported by the battery controller
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeState {
    Charging,
    Discharging,
    Full,
    Empty,
    Unknown,
}

impl ChargeState {
    /// Charging or full implies external power
    pub fn power_source(&self) -> PowerSource {
        match self {
            ChargeState::Charging | ChargeState::Full => PowerSource::AC,
            ChargeState::Discharging | ChargeState::Empty => PowerSource::Battery,
            ChargeState::Unknown => PowerSource::Unknown,
        }
    }
}

/// Coarse battery health bucket
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryCondition {
    Good,
    Fair,
    Poor,
}

impl BatteryCondition {
    pub fn from_health(percent: f64) -> Self {
        if percent >= HEALTH_GOOD_THRESHOLD {
            BatteryCondition::Good
        } else if percent >= HEALTH_FAIR_THRESHOLD {
            BatteryCondition::Fair
        } else {
            BatteryCondition::Poor
        }
    }
}

/// One battery sample.
///
/// Machines without a battery produce a snapshot with `is_present == false`,
/// which hides the widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatterySnapshot {
    pub is_present: bool,
    /// Current charge percentage (0-100)
    pub charge: f64,
    pub state: ChargeState,
    pub power_source: PowerSource,
    /// Full-charge capacity relative to design capacity (0-100)
    pub health: Option<f64>,
    pub cycle_count: Option<u32>,
    /// Temperature in Celsius
    pub temperature: Option<f64>,
    /// Time until empty when discharging, until full when charging
    pub time_remaining: Option<Duration>,
    /// Power flowing in or out of the battery in watts
    pub power_draw: Option<f64>,
}

impl BatterySnapshot {
    /// A snapshot for a machine without a battery
    pub fn absent() -> Self {
        Self {
            is_present: false,
            charge: 0.0,
            state: ChargeState::Unknown,
            power_source: PowerSource::AC,
            health: None,
            cycle_count: None,
            temperature: None,
            time_remaining: None,
            power_draw: None,
        }
    }

    pub fn condition(&self) -> Option<BatteryCondition> {
        self.health.map(BatteryCondition::from_health)
    }

    pub fn is_low(&self) -> bool {
        self.is_present && self.power_source == PowerSource::Battery && self.charge < LOW_CHARGE_THRESHOLD
    }
}

impl MetricSnapshot for BatterySnapshot {
    const WIDGET_TYPE: WidgetType = WidgetType::Battery;

    fn series(&self) -> Vec<(SeriesKey, f64)> {
        if !self.is_present {
            return Vec::new();
        }
        let mut series = vec![(SeriesKey::BatteryCharge, self.charge)];
        if let Some(temperature) = self.temperature {
            series.push((SeriesKey::BatteryTemperature, temperature));
        }
        series
    }

    fn is_present(&self) -> bool {
        self.is_present
    }
}
