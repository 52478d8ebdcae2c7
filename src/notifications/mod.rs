//! # Notification Thresholds
//!
//! Evaluates user thresholds against freshly committed snapshots. A threshold
//! fires on the transition from "not met" to "met" and is then silent for a
//! cool-down period. Events are published on a broadcast channel; delivery
//! happens on its own task so evaluation never waits on it.
use std::{
    collections::{HashMap, HashSet},
    time::{Duration, SystemTime},
};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{
    config::{ComparisonOperator, NotificationThreshold},
    core::types::{SeriesKey, WidgetType},
    reader::Snapshot,
};

mod delivery;

pub use delivery::{spawn_delivery, LogDelivery, NotificationDelivery};

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

const EVENT_CAPACITY: usize = 64;

/// A threshold that just fired
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdEvent {
    pub widget_type: WidgetType,
    pub metric_key: SeriesKey,
    /// The observed value that met the threshold
    pub value: f64,
    pub threshold: NotificationThreshold,
    pub fired_at: SystemTime,
}

impl ThresholdEvent {
    /// One-line human readable description, e.g. `cpu.total 93.0 > 90`
    pub fn summary(&self) -> String {
        format!(
            "{} {:.1} {} {}",
            self.metric_key, self.value, self.threshold.comparison_operator, self.threshold.value
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RuleKey {
    widget_type: WidgetType,
    metric_key: String,
    operator: ComparisonOperator,
    value_bits: u64,
}

impl RuleKey {
    fn new(widget_type: WidgetType, threshold: &NotificationThreshold) -> Self {
        Self {
            widget_type,
            metric_key: threshold.metric_key.clone(),
            operator: threshold.comparison_operator.clone(),
            value_bits: threshold.value.to_bits(),
        }
    }
}

#[derive(Debug, Default)]
struct RuleState {
    condition_met: bool,
    last_fired: Option<SystemTime>,
}

/// Edge-triggered, rate-limited threshold evaluation
#[derive(Debug)]
pub struct NotificationThresholdEngine {
    cooldown: Duration,
    states: HashMap<RuleKey, RuleState>,
    warned: HashSet<RuleKey>,
    events: broadcast::Sender<ThresholdEvent>,
}

impl Default for NotificationThresholdEngine {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl NotificationThresholdEngine {
    pub fn new(cooldown: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { cooldown, states: HashMap::new(), warned: HashSet::new(), events }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ThresholdEvent> {
        self.events.subscribe()
    }

    /// Evaluates a widget's thresholds against a fresh snapshot.
    ///
    /// Returns the events that fired, which have also been published.
    pub fn evaluate(
        &mut self,
        widget_type: WidgetType,
        thresholds: &[NotificationThreshold],
        snapshot: &Snapshot,
        now: SystemTime,
    ) -> Vec<ThresholdEvent> {
        let mut fired = Vec::new();
        let mut live = HashSet::with_capacity(thresholds.len());

        for threshold in thresholds {
            let key = RuleKey::new(widget_type, threshold);
            if !threshold.is_enabled {
                self.states.remove(&key);
                continue;
            }
            let Some(metric_key) = self.validate(widget_type, threshold, &key) else {
                continue;
            };
            live.insert(key.clone());

            let Some(value) = snapshot.value(metric_key) else {
                continue;
            };
            let met = threshold.comparison_operator.evaluate(value, threshold.value).unwrap_or(false);

            let state = self
                .states
                .entry(key)
                .or_insert_with(|| RuleState { condition_met: false, last_fired: threshold.last_fired() });
            let rising = met && !state.condition_met;
            state.condition_met = met;
            if !rising {
                continue;
            }

            let cooling_down = state
                .last_fired
                .and_then(|last| now.duration_since(last).ok())
                .is_some_and(|elapsed| elapsed < self.cooldown);
            if cooling_down {
                debug!(%widget_type, metric = %metric_key, "threshold met during cool-down");
                continue;
            }

            state.last_fired = Some(now);
            fired.push(ThresholdEvent {
                widget_type,
                metric_key,
                value,
                threshold: threshold.clone(),
                fired_at: now,
            });
        }

        // Rules removed from configuration lose their state
        self.states.retain(|key, _| key.widget_type != widget_type || live.contains(key));

        for event in &fired {
            debug!(summary = %event.summary(), "threshold fired");
            let _ = self.events.send(event.clone());
        }
        fired
    }

    /// Drops all state for a widget, e.g. when it is disabled
    pub fn forget(&mut self, widget_type: WidgetType) {
        self.states.retain(|key, _| key.widget_type != widget_type);
        self.warned.retain(|key| key.widget_type != widget_type);
    }

    /// The threshold's series, or `None` (logged once) when it cannot be evaluated
    fn validate(
        &mut self,
        widget_type: WidgetType,
        threshold: &NotificationThreshold,
        key: &RuleKey,
    ) -> Option<SeriesKey> {
        let problem = match threshold.series_key() {
            None => Some(format!("unknown metric key {:?}", threshold.metric_key)),
            Some(series) if series.widget_type() != widget_type => {
                Some(format!("metric {series} does not belong to {widget_type}"))
            },
            Some(_) if !threshold.comparison_operator.is_valid() => {
                Some(format!("unknown operator {:?}", threshold.comparison_operator.as_str()))
            },
            Some(_) if !threshold.value.is_finite() => Some(format!("non-finite value {}", threshold.value)),
            Some(_) => None,
        };

        match problem {
            None => threshold.series_key(),
            Some(problem) => {
                if self.warned.insert(key.clone()) {
                    warn!(%widget_type, %problem, "skipping misconfigured threshold");
                }
                None
            },
        }
    }
}
