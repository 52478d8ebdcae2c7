//! Schema migrations for the persisted configuration document.
//!
//! Migrations work on raw JSON so that documents written by older versions
//! never have to deserialize into the current types.
use serde_json::{Map, Value};
use tracing::debug;

use super::types::ModuleSettings;
use crate::{
    core::types::WidgetType,
    error::{Error, Result},
};

pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";
pub const WIDGETS_KEY: &str = "widgets";
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

type Migration = fn(&mut Map<String, Value>) -> Result<()>;

/// `MIGRATIONS[n]` upgrades version `n + 1` to `n + 2`
const MIGRATIONS: [Migration; (CURRENT_SCHEMA_VERSION - 1) as usize] = [add_refresh_interval, add_module_settings];

/// Reads the document's schema version; a missing version means 1
pub fn schema_version(document: &Value) -> Result<u32> {
    let Some(object) = document.as_object() else {
        return Err(Error::invalid_data("configuration document is not an object"));
    };
    match object.get(SCHEMA_VERSION_KEY) {
        None => Ok(1),
        Some(version) => version
            .as_u64()
            .and_then(|version| u32::try_from(version).ok())
            .filter(|version| *version >= 1)
            .ok_or_else(|| Error::invalid_data(format!("invalid schema version: {version}"))),
    }
}

/// Upgrades `document` in place to [`CURRENT_SCHEMA_VERSION`], returning the version it started at.
///
/// Running it on an up-to-date document is a no-op.
pub fn migrate(document: &mut Value) -> Result<u32> {
    let from = schema_version(document)?;
    if from > CURRENT_SCHEMA_VERSION {
        return Err(Error::migration(
            from,
            format!("schema version {from} is newer than supported version {CURRENT_SCHEMA_VERSION}"),
        ));
    }

    let Some(object) = document.as_object_mut() else {
        return Err(Error::invalid_data("configuration document is not an object"));
    };

    for version in from..CURRENT_SCHEMA_VERSION {
        let target = version + 1;
        MIGRATIONS[(version - 1) as usize](object)?;
        object.insert(SCHEMA_VERSION_KEY.to_string(), Value::from(target));
        debug!(from = version, to = target, "migrated configuration schema");
    }

    Ok(from)
}

fn widgets_mut(document: &mut Map<String, Value>, target: u32) -> Result<&mut Vec<Value>> {
    document
        .entry(WIDGETS_KEY)
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| Error::migration(target, "widgets is not an array"))
}

/// The widget type of an entry, if it names a known one
fn entry_type(widget: &Map<String, Value>) -> Option<WidgetType> {
    widget.get("type")?.as_str()?.parse().ok()
}

/// v1 → v2: per-widget refresh interval, defaulting to the widget's preferred interval
fn add_refresh_interval(document: &mut Map<String, Value>) -> Result<()> {
    for widget in widgets_mut(document, 2)? {
        let Some(widget) = widget.as_object_mut() else {
            continue;
        };
        let Some(widget_type) = entry_type(widget) else {
            continue;
        };
        widget
            .entry("refreshIntervalSeconds")
            .or_insert_with(|| Value::from(widget_type.preferred_interval().as_secs_f64()));
    }
    Ok(())
}

/// v2 → v3: widget-specific module settings
fn add_module_settings(document: &mut Map<String, Value>) -> Result<()> {
    for widget in widgets_mut(document, 3)? {
        let Some(widget) = widget.as_object_mut() else {
            continue;
        };
        let Some(widget_type) = entry_type(widget) else {
            continue;
        };
        if !widget.contains_key("moduleSettings") {
            let settings = serde_json::to_value(ModuleSettings::default_for(widget_type))
                .map_err(|e| Error::migration(3, e.to_string()))?;
            widget.insert("moduleSettings".to_string(), settings);
        }
    }
    Ok(())
}
