//! # Widget Configuration
//!
//! Persisted, versioned configuration for every widget. Loading never fails:
//! corrupt, unreadable or too-new data falls back to the compiled-in defaults
//! and is reported as a [`ConfigWarning`]. Every mutation is persisted and
//! announced on a broadcast channel so the running monitor picks it up
//! immediately.
use std::{fmt, time::SystemTime};

use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    core::types::WidgetType,
    error::{Error, Result},
    utils,
};

mod migration;
mod storage;
mod types;

pub use migration::{migrate, schema_version, CURRENT_SCHEMA_VERSION, SCHEMA_VERSION_KEY, WIDGETS_KEY};
#[cfg(test)]
pub use storage::MockKeyValueStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore, CONFIG_DIR_NAME};
pub use types::*;

/// Key the configuration document is stored under
pub const CONFIGURATION_KEY: &str = "widget-configuration";

const EVENT_CAPACITY: usize = 64;

/// Announced after every in-memory configuration change
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationEvent {
    Changed(WidgetConfiguration),
    Reordered,
    Reset,
}

/// Non-fatal problem found while loading configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigWarning {
    #[error("configuration could not be read, using defaults: {0}")]
    Unreadable(String),

    #[error("configuration is corrupt, using defaults: {0}")]
    Corrupt(String),

    #[error("configuration schema {found} is newer than supported {supported}, using defaults")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("configuration migration failed, using defaults: {0}")]
    MigrationFailed(String),

    #[error("widget entry {index} skipped: {reason}")]
    InvalidWidget { index: usize, reason: String },

    #[error("configuration corrected: {0}")]
    Normalized(String),

    #[error("configuration could not be saved: {0}")]
    PersistFailed(String),
}

/// Owner of the widget configuration list
pub struct ConfigurationStore {
    backend: Box<dyn KeyValueStore>,
    widgets: Vec<WidgetConfiguration>,
    events: broadcast::Sender<ConfigurationEvent>,
}

impl fmt::Debug for ConfigurationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationStore").field("widgets", &self.widgets).finish_non_exhaustive()
    }
}

impl ConfigurationStore {
    /// Loads, migrates and normalizes the persisted configuration.
    ///
    /// Migrated or corrected documents are written back. Documents that
    /// could not be used at all are left untouched until the next mutation.
    pub fn load(backend: Box<dyn KeyValueStore>) -> (Self, Vec<ConfigWarning>) {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut store = Self { backend, widgets: Vec::new(), events };
        let mut warnings = Vec::new();

        let loaded = match store.backend.read(CONFIGURATION_KEY) {
            Ok(Some(bytes)) => parse_document(&bytes, &mut warnings),
            Ok(None) => {
                info!("no stored configuration, writing defaults");
                Some((Value::Null, default_widgets()))
            },
            Err(e) => {
                warnings.push(ConfigWarning::Unreadable(e.to_string()));
                None
            },
        };

        match loaded {
            Some((original, widgets)) => {
                store.widgets = widgets;
                if store.document() != original {
                    if let Err(e) = store.persist() {
                        warnings.push(ConfigWarning::PersistFailed(e.to_string()));
                    }
                }
            },
            None => store.widgets = default_widgets(),
        }

        for warning in &warnings {
            warn!(%warning, "configuration load");
        }
        (store, warnings)
    }

    /// All widgets ordered by position
    pub fn widgets(&self) -> &[WidgetConfiguration] {
        &self.widgets
    }

    pub fn get(&self, widget_type: WidgetType) -> Option<&WidgetConfiguration> {
        self.widgets.iter().find(|widget| widget.widget_type == widget_type)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &WidgetConfiguration> + '_ {
        self.widgets.iter().filter(|widget| widget.is_enabled)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigurationEvent> {
        self.events.subscribe()
    }

    /// Applies `mutation` to one widget, then normalizes, announces and persists it.
    ///
    /// A persistence failure is returned, but the change stays applied and
    /// has already been announced.
    pub fn update<F>(&mut self, widget_type: WidgetType, mutation: F) -> Result<WidgetConfiguration>
    where
        F: FnOnce(&mut WidgetConfiguration),
    {
        let widget = self
            .widgets
            .iter_mut()
            .find(|widget| widget.widget_type == widget_type)
            .ok_or_else(|| Error::configuration(format!("no configuration for {widget_type}")))?;

        let position = widget.position;
        mutation(widget);
        // The key and ordering are owned by the store
        widget.widget_type = widget_type;
        widget.position = position;
        for fix in widget.normalize() {
            debug!(%fix, "normalized configuration update");
        }

        let updated = widget.clone();
        self.announce(ConfigurationEvent::Changed(updated.clone()));
        self.persist()?;
        Ok(updated)
    }

    /// Moves a widget to `new_position`, shifting the others
    pub fn reorder(&mut self, widget_type: WidgetType, new_position: usize) -> Result<()> {
        let index = self
            .widgets
            .iter()
            .position(|widget| widget.widget_type == widget_type)
            .ok_or_else(|| Error::configuration(format!("no configuration for {widget_type}")))?;

        let widget = self.widgets.remove(index);
        let new_position = new_position.min(self.widgets.len());
        self.widgets.insert(new_position, widget);
        renumber(&mut self.widgets);

        self.announce(ConfigurationEvent::Reordered);
        self.persist()
    }

    pub fn reset_to_defaults(&mut self) -> Result<()> {
        self.widgets = default_widgets();
        self.announce(ConfigurationEvent::Reset);
        self.persist()
    }

    /// Persists the fire time of a threshold without announcing a change
    pub fn record_fired(
        &mut self,
        widget_type: WidgetType,
        threshold: &NotificationThreshold,
        fired_at: SystemTime,
    ) -> Result<()> {
        let Some(widget) = self.widgets.iter_mut().find(|widget| widget.widget_type == widget_type) else {
            return Ok(());
        };
        let timestamp = utils::unix_seconds(fired_at);
        let mut changed = false;
        for stored in widget.notification_thresholds.iter_mut().filter(|stored| stored.same_rule(threshold)) {
            stored.last_fired_timestamp = Some(timestamp);
            changed = true;
        }

        if changed {
            self.persist()?;
        }
        Ok(())
    }

    fn announce(&self, event: ConfigurationEvent) {
        // No subscribers is fine, the monitor may not be running
        let _ = self.events.send(event);
    }

    fn document(&self) -> Value {
        json!({
            SCHEMA_VERSION_KEY: CURRENT_SCHEMA_VERSION,
            WIDGETS_KEY: self.widgets,
        })
    }

    fn persist(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.document())?;
        self.backend.write(CONFIGURATION_KEY, &bytes)
    }
}

/// Decodes and migrates a stored document.
///
/// Returns the document as read and the normalized widget list, or `None`
/// when defaults must be used.
fn parse_document(bytes: &[u8], warnings: &mut Vec<ConfigWarning>) -> Option<(Value, Vec<WidgetConfiguration>)> {
    let original: Value = match serde_json::from_slice(bytes) {
        Ok(document) => document,
        Err(e) => {
            warnings.push(ConfigWarning::Corrupt(e.to_string()));
            return None;
        },
    };

    let mut document = original.clone();
    match schema_version(&document) {
        Ok(found) if found > CURRENT_SCHEMA_VERSION => {
            warnings.push(ConfigWarning::UnsupportedVersion { found, supported: CURRENT_SCHEMA_VERSION });
            return None;
        },
        Ok(_) => {},
        Err(e) => {
            warnings.push(ConfigWarning::Corrupt(e.to_string()));
            return None;
        },
    }

    match migrate(&mut document) {
        Ok(from) if from < CURRENT_SCHEMA_VERSION => {
            info!(from, to = CURRENT_SCHEMA_VERSION, "configuration migrated");
        },
        Ok(_) => {},
        Err(e) => {
            warnings.push(ConfigWarning::MigrationFailed(e.to_string()));
            return None;
        },
    }

    let entries = match document.get_mut(WIDGETS_KEY).map(Value::take) {
        Some(Value::Array(entries)) => entries,
        _ => {
            warnings.push(ConfigWarning::Corrupt("widgets is not an array".to_string()));
            return None;
        },
    };

    let mut widgets = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<WidgetConfiguration>(entry) {
            Ok(widget) => widgets.push(widget),
            Err(e) => warnings.push(ConfigWarning::InvalidWidget { index, reason: e.to_string() }),
        }
    }

    for fix in normalize(&mut widgets) {
        warnings.push(ConfigWarning::Normalized(fix));
    }
    Some((original, widgets))
}

/// Enforces one entry per widget type with positions 0..n.
///
/// Duplicates after the first are dropped, missing widget types are appended
/// with defaults, and entries keep their relative order by position.
pub(crate) fn normalize(widgets: &mut Vec<WidgetConfiguration>) -> Vec<String> {
    let mut fixes = Vec::new();

    let mut seen = Vec::with_capacity(WidgetType::ALL.len());
    widgets.retain(|widget| {
        if seen.contains(&widget.widget_type) {
            fixes.push(format!("duplicate {} entry dropped", widget.widget_type));
            false
        } else {
            seen.push(widget.widget_type);
            true
        }
    });

    for widget in widgets.iter_mut() {
        fixes.extend(widget.normalize());
    }

    // Stable: ties keep their stored order
    widgets.sort_by_key(|widget| widget.position);

    for widget_type in WidgetType::ALL {
        if !seen.contains(&widget_type) {
            fixes.push(format!("missing {widget_type} entry added"));
            widgets.push(WidgetConfiguration::default_for(widget_type, widgets.len()));
        }
    }

    renumber(widgets);
    fixes
}

fn renumber(widgets: &mut [WidgetConfiguration]) {
    for (position, widget) in widgets.iter_mut().enumerate() {
        widget.position = position;
    }
}
