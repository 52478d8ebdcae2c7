use std::{fmt, time::Duration, time::SystemTime};

use serde::{Deserialize, Serialize};

use crate::{
    core::types::{SeriesKey, WidgetType},
    utils,
};

/// Shortest refresh interval a widget may be configured with
pub const MIN_REFRESH_INTERVAL_SECONDS: f64 = 0.5;
/// Longest refresh interval a widget may be configured with
pub const MAX_REFRESH_INTERVAL_SECONDS: f64 = 3600.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    #[default]
    Compact,
    Detailed,
    Minimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualizationType {
    #[default]
    Text,
    Sparkline,
    Gauge,
    Bar,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueFormat {
    #[default]
    Percentage,
    Absolute,
    Both,
}

/// Comparison applied by a notification threshold.
///
/// Unknown operators survive a load/save cycle as `Invalid` so a typo in the
/// persisted file is reported instead of silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComparisonOperator {
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Equal,
    NotEqual,
    Invalid(String),
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &str {
        match self {
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::Invalid(raw) => raw,
        }
    }

    /// `None` for an invalid operator
    pub fn evaluate(&self, lhs: f64, rhs: f64) -> Option<bool> {
        let result = match self {
            ComparisonOperator::GreaterThan => lhs > rhs,
            ComparisonOperator::LessThan => lhs < rhs,
            ComparisonOperator::GreaterOrEqual => lhs >= rhs,
            ComparisonOperator::LessOrEqual => lhs <= rhs,
            ComparisonOperator::Equal => lhs == rhs,
            ComparisonOperator::NotEqual => lhs != rhs,
            ComparisonOperator::Invalid(_) => return None,
        };
        Some(result)
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, ComparisonOperator::Invalid(_))
    }
}

impl From<String> for ComparisonOperator {
    fn from(raw: String) -> Self {
        match raw.trim() {
            ">" => ComparisonOperator::GreaterThan,
            "<" => ComparisonOperator::LessThan,
            ">=" => ComparisonOperator::GreaterOrEqual,
            "<=" => ComparisonOperator::LessOrEqual,
            "==" => ComparisonOperator::Equal,
            "!=" => ComparisonOperator::NotEqual,
            _ => ComparisonOperator::Invalid(raw),
        }
    }
}

impl From<ComparisonOperator> for String {
    fn from(operator: ComparisonOperator) -> Self {
        operator.as_str().to_string()
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enabled() -> bool {
    true
}

/// A user-defined alert on one series of a widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationThreshold {
    pub metric_key: String,
    pub comparison_operator: ComparisonOperator,
    #[serde(with = "utils::lenient_f64")]
    pub value: f64,
    #[serde(default = "enabled")]
    pub is_enabled: bool,
    /// Seconds since the Unix epoch
    #[serde(default)]
    pub last_fired_timestamp: Option<f64>,
}

impl NotificationThreshold {
    pub fn new(metric_key: SeriesKey, comparison_operator: ComparisonOperator, value: f64) -> Self {
        Self {
            metric_key: metric_key.as_str().to_string(),
            comparison_operator,
            value,
            is_enabled: true,
            last_fired_timestamp: None,
        }
    }

    pub fn series_key(&self) -> Option<SeriesKey> {
        SeriesKey::parse(&self.metric_key)
    }

    pub fn last_fired(&self) -> Option<SystemTime> {
        self.last_fired_timestamp.and_then(utils::from_unix_seconds)
    }

    /// Whether `other` is the same rule, ignoring its enabled flag and fire time
    pub fn same_rule(&self, other: &NotificationThreshold) -> bool {
        self.metric_key == other.metric_key
            && self.comparison_operator == other.comparison_operator
            && self.value.to_bits() == other.value.to_bits()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpuSettings {
    pub show_per_core: bool,
    pub show_temperature: bool,
    pub show_load_average: bool,
}

impl Default for CpuSettings {
    fn default() -> Self {
        Self { show_per_core: false, show_temperature: true, show_load_average: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemorySettings {
    pub show_swap: bool,
    pub show_pressure: bool,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self { show_swap: true, show_pressure: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiskSettings {
    /// Mount point to display; the root volume when unset
    pub mount_point: Option<String>,
    pub show_io_rates: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkSettings {
    /// Interface to display; the busiest one when unset
    pub interface: Option<String>,
    pub show_wifi: bool,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self { interface: None, show_wifi: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GpuSettings {
    pub show_memory: bool,
    pub show_temperature: bool,
}

impl Default for GpuSettings {
    fn default() -> Self {
        Self { show_memory: true, show_temperature: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatterySettings {
    pub show_time_remaining: bool,
    pub show_health: bool,
}

impl Default for BatterySettings {
    fn default() -> Self {
        Self { show_time_remaining: true, show_health: false }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensorsSettings {
    pub show_fans: bool,
    /// Sensor label to display; the hottest one when unset
    pub preferred_sensor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BluetoothSettings {
    pub show_disconnected: bool,
}

/// Widget-specific options, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModuleSettings {
    Cpu(CpuSettings),
    Memory(MemorySettings),
    Disk(DiskSettings),
    Network(NetworkSettings),
    Gpu(GpuSettings),
    Battery(BatterySettings),
    Sensors(SensorsSettings),
    Bluetooth(BluetoothSettings),
}

impl ModuleSettings {
    pub fn default_for(widget_type: WidgetType) -> Self {
        match widget_type {
            WidgetType::Cpu => ModuleSettings::Cpu(CpuSettings::default()),
            WidgetType::Memory => ModuleSettings::Memory(MemorySettings::default()),
            WidgetType::Disk => ModuleSettings::Disk(DiskSettings::default()),
            WidgetType::Network => ModuleSettings::Network(NetworkSettings::default()),
            WidgetType::Gpu => ModuleSettings::Gpu(GpuSettings::default()),
            WidgetType::Battery => ModuleSettings::Battery(BatterySettings::default()),
            WidgetType::Sensors => ModuleSettings::Sensors(SensorsSettings::default()),
            WidgetType::Bluetooth => ModuleSettings::Bluetooth(BluetoothSettings::default()),
        }
    }

    pub fn widget_type(&self) -> WidgetType {
        match self {
            ModuleSettings::Cpu(_) => WidgetType::Cpu,
            ModuleSettings::Memory(_) => WidgetType::Memory,
            ModuleSettings::Disk(_) => WidgetType::Disk,
            ModuleSettings::Network(_) => WidgetType::Network,
            ModuleSettings::Gpu(_) => WidgetType::Gpu,
            ModuleSettings::Battery(_) => WidgetType::Battery,
            ModuleSettings::Sensors(_) => WidgetType::Sensors,
            ModuleSettings::Bluetooth(_) => WidgetType::Bluetooth,
        }
    }
}

/// Persisted configuration of one widget, keyed by its type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfiguration {
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    #[serde(default = "enabled")]
    pub is_enabled: bool,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub visualization_type: VisualizationType,
    #[serde(default)]
    pub accent_color: String,
    #[serde(default)]
    pub value_format: ValueFormat,
    #[serde(with = "utils::lenient_f64")]
    pub refresh_interval_seconds: f64,
    pub module_settings: ModuleSettings,
    #[serde(default)]
    pub notification_thresholds: Vec<NotificationThreshold>,
}

impl WidgetConfiguration {
    /// Compiled-in configuration for a widget
    pub fn default_for(widget_type: WidgetType, position: usize) -> Self {
        let (is_enabled, accent_color, visualization_type) = match widget_type {
            WidgetType::Cpu => (true, "#0A84FF", VisualizationType::Sparkline),
            WidgetType::Memory => (true, "#BF5AF2", VisualizationType::Bar),
            WidgetType::Disk => (true, "#FF9F0A", VisualizationType::Bar),
            WidgetType::Network => (true, "#30D158", VisualizationType::Sparkline),
            WidgetType::Gpu => (false, "#FF375F", VisualizationType::Sparkline),
            WidgetType::Battery => (true, "#32D74B", VisualizationType::Gauge),
            WidgetType::Sensors => (false, "#FF453A", VisualizationType::Text),
            WidgetType::Bluetooth => (false, "#64D2FF", VisualizationType::Text),
        };

        Self {
            widget_type,
            is_enabled,
            position,
            display_mode: DisplayMode::default(),
            visualization_type,
            accent_color: accent_color.to_string(),
            value_format: ValueFormat::default(),
            refresh_interval_seconds: widget_type.preferred_interval().as_secs_f64(),
            module_settings: ModuleSettings::default_for(widget_type),
            notification_thresholds: Vec::new(),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(clamp_refresh_interval(self.refresh_interval_seconds, self.widget_type))
    }

    /// Brings the configuration back within its invariants.
    ///
    /// Returns a description of each correction made.
    pub fn normalize(&mut self) -> Vec<String> {
        let mut fixes = Vec::new();

        let interval = clamp_refresh_interval(self.refresh_interval_seconds, self.widget_type);
        if interval.to_bits() != self.refresh_interval_seconds.to_bits() {
            fixes.push(format!(
                "{}: refresh interval {} clamped to {interval}",
                self.widget_type, self.refresh_interval_seconds
            ));
            self.refresh_interval_seconds = interval;
        }

        if self.module_settings.widget_type() != self.widget_type {
            fixes.push(format!(
                "{}: module settings for {} replaced with defaults",
                self.widget_type,
                self.module_settings.widget_type()
            ));
            self.module_settings = ModuleSettings::default_for(self.widget_type);
        }

        fixes
    }
}

/// Clamps to the allowed range; a non-finite value falls back to the widget's preferred interval
fn clamp_refresh_interval(seconds: f64, widget_type: WidgetType) -> f64 {
    if seconds.is_nan() {
        return widget_type.preferred_interval().as_secs_f64();
    }
    seconds.clamp(MIN_REFRESH_INTERVAL_SECONDS, MAX_REFRESH_INTERVAL_SECONDS)
}

/// The compiled-in configuration of every widget, in default order
pub fn default_widgets() -> Vec<WidgetConfiguration> {
    WidgetType::ALL
        .into_iter()
        .enumerate()
        .map(|(position, widget_type)| WidgetConfiguration::default_for(widget_type, position))
        .collect()
}
