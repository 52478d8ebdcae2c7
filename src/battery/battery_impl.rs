use std::time::Duration;

use battery::{
    units::{power::watt, ratio::percent, thermodynamic_temperature::kelvin, time::second},
    Manager, State,
};

use super::{BatterySnapshot, ChargeState, KELVIN_OFFSET};
use crate::{error::ReadError, traits::NativeSource};

/// Battery source backed by the `battery` crate.
///
/// A manager is created per sample since the platform handles it wraps are
/// not guaranteed to be `Send`.
#[derive(Debug, Default)]
pub struct SystemBatterySource;

impl SystemBatterySource {
    pub fn new() -> Self {
        Self
    }
}

impl NativeSource<BatterySnapshot> for SystemBatterySource {
    fn sample(&mut self) -> Result<BatterySnapshot, ReadError> {
        let manager = Manager::new().map_err(|e| ReadError::unavailable(format!("battery manager: {e}")))?;
        let mut batteries = manager.batteries().map_err(|e| ReadError::native(format!("enumerating batteries: {e}")))?;

        let battery = match batteries.next() {
            None => return Ok(BatterySnapshot::absent()),
            Some(Err(e)) => return Err(ReadError::native(format!("reading battery: {e}"))),
            Some(Ok(battery)) => battery,
        };

        let state = match battery.state() {
            State::Charging => ChargeState::Charging,
            State::Discharging => ChargeState::Discharging,
            State::Full => ChargeState::Full,
            State::Empty => ChargeState::Empty,
            _ => ChargeState::Unknown,
        };
        let time_remaining = match state {
            ChargeState::Charging => battery.time_to_full(),
            ChargeState::Discharging => battery.time_to_empty(),
            _ => None,
        }
        .map(|t| Duration::from_secs_f64(f64::from(t.get::<second>()).max(0.0)));
        let health = f64::from(battery.state_of_health().get::<percent>());

        Ok(BatterySnapshot {
            is_present: true,
            charge: f64::from(battery.state_of_charge().get::<percent>()).clamp(0.0, 100.0),
            state,
            power_source: state.power_source(),
            health: (health > 0.0).then(|| health.min(100.0)),
            cycle_count: battery.cycle_count(),
            temperature: battery.temperature().map(|t| f64::from(t.get::<kelvin>()) - KELVIN_OFFSET),
            time_remaining,
            power_draw: Some(f64::from(battery.energy_rate().get::<watt>())).filter(|w| w.is_finite()),
        })
    }
}
