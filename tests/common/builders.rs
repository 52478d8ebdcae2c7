use std::time::Duration;

use tonic_telemetry::{
    battery::{BatterySnapshot, ChargeState, PowerSource},
    cpu::{CpuSnapshot, LoadAverage},
};

pub struct TestCpuBuilder {
    total_usage: f64,
    user_usage: Option<f64>,
    system_usage: Option<f64>,
    cores: usize,
    temperature: Option<f64>,
}

impl TestCpuBuilder {
    pub fn new() -> Self {
        Self { total_usage: 25.0, user_usage: None, system_usage: None, cores: 4, temperature: None }
    }

    pub fn usage(mut self, total_usage: f64) -> Self {
        self.total_usage = total_usage;
        self
    }

    pub fn split(mut self, user_usage: f64, system_usage: f64) -> Self {
        self.user_usage = Some(user_usage);
        self.system_usage = Some(system_usage);
        self
    }

    pub fn cores(mut self, cores: usize) -> Self {
        self.cores = cores;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn build(self) -> CpuSnapshot {
        CpuSnapshot {
            model_name: "Test CPU".to_string(),
            total_usage: self.total_usage,
            user_usage: self.user_usage,
            system_usage: self.system_usage,
            idle: 100.0 - self.total_usage,
            per_core: vec![self.total_usage; self.cores],
            physical_cores: Some(self.cores),
            frequency_mhz: Some(3200.0),
            temperature: self.temperature,
            load_average: LoadAverage { one: 1.0, five: 0.8, fifteen: 0.5 },
            uptime: Duration::from_secs(3600),
        }
    }
}

impl Default for TestCpuBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TestBatteryBuilder {
    is_present: bool,
    charge: f64,
    charging: bool,
}

impl TestBatteryBuilder {
    pub fn new() -> Self {
        Self { is_present: true, charge: 75.0, charging: false }
    }

    pub fn present(mut self, is_present: bool) -> Self {
        self.is_present = is_present;
        self
    }

    pub fn charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    pub fn charging(mut self, charging: bool) -> Self {
        self.charging = charging;
        self
    }

    pub fn build(self) -> BatterySnapshot {
        if !self.is_present {
            return BatterySnapshot::absent();
        }
        BatterySnapshot {
            is_present: true,
            charge: self.charge,
            state: if self.charging { ChargeState::Charging } else { ChargeState::Discharging },
            power_source: if self.charging { PowerSource::AC } else { PowerSource::Battery },
            health: Some(92.0),
            cycle_count: Some(150),
            temperature: Some(31.5),
            time_remaining: Some(Duration::from_secs(7200)),
            power_draw: Some(8.5),
        }
    }
}

impl Default for TestBatteryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
