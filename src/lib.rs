//! Tonic Telemetry - the hardware telemetry core behind the Tonic widgets
//!
//! This crate samples a fixed set of OS-level metrics at a bounded cadence,
//! keeps a short rolling history per metric and exposes one coherent,
//! observable snapshot to a presentation layer.
//!
//! # Features
//!
//! - **CPU**: total and per-core usage, user/system split where available, load, temperature
//! - **Memory**: usage, swap and pressure level
//! - **Disk**: volumes, primary volume usage and I/O rates
//! - **Network**: throughput per interface and WiFi link quality
//! - **GPU**: utilization, video memory and temperature
//! - **Battery**: charge, state, health and time remaining
//! - **Sensors**: temperature sensors and fans
//! - **Bluetooth**: adapters and connected devices
//!
//! # Architecture
//!
//! One reader per hardware domain wraps a native source behind the
//! [`traits::NativeSource`] trait and caches its last sample. A single
//! monitor task owns the [`scheduler::RefreshScheduler`], the
//! [`store::WidgetDataStore`], the [`coordinator::WidgetCoordinator`], the
//! [`notifications::NotificationThresholdEngine`] and the
//! [`config::ConfigurationStore`]. Native calls run on blocking workers and
//! only their results re-enter the monitor task.
//!
//! # Examples
//!
//! ```no_run
//! use tonic_telemetry::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     tonic_telemetry::logging::init()?;
//!
//!     let (configuration, warnings) = ConfigurationStore::load(Box::new(FileStore::default_location()?));
//!     for warning in warnings {
//!         eprintln!("{warning}");
//!     }
//!
//!     let monitor = Monitor::start_native(MonitorConfig::default(), configuration);
//!     monitor.update_configuration(WidgetType::Gpu, |gpu| gpu.is_enabled = true).await?;
//!
//!     let mut revisions = monitor.revisions();
//!     while revisions.changed().await.is_ok() {
//!         if let Some(sample) = monitor.store().latest(SeriesKey::CpuTotal) {
//!             println!("CPU {:.1}%", sample.value);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Reader failures are typed as [`error::ReadError`]: `Unavailable` hides a
//! widget, `Timeout` and `NativeCall` keep the last good value and retry.
//! Everything else uses the crate-wide [`Error`]:
//!
//! ```rust
//! use tonic_telemetry::{Error, Result};
//!
//! fn example() -> Result<()> {
//!     Err(Error::NotAvailable("GPU metrics not available".to_string()))
//! }
//! # assert!(example().is_err());
//! ```
#![doc(html_root_url = "https://docs.rs/tonic-telemetry/0.1.0")]

pub mod battery;
pub mod bluetooth;
pub mod config;
pub mod coordinator;
pub mod core;
pub mod cpu;
pub mod disk;
pub mod error;
pub mod gpu;
pub mod logging;
pub mod memory;
pub mod monitor;
pub mod network;
pub mod notifications;
pub mod reader;
pub mod resource;
pub mod scheduler;
pub mod sensors;
pub mod store;
pub mod traits;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use crate::core::types::{SeriesKey, WidgetType};

pub use error::{Error, ReadError, Result};

/// Common types for embedding the monitor
pub mod prelude {
    pub use crate::{
        config::{
            ComparisonOperator, ConfigWarning, ConfigurationEvent, ConfigurationStore, FileStore, KeyValueStore,
            MemoryStore, NotificationThreshold, WidgetConfiguration,
        },
        coordinator::WidgetState,
        core::{
            metrics::{HistoryBuffer, Sample},
            types::{SeriesKey, WidgetType},
        },
        error::{Error, ReadError, Result},
        monitor::{Monitor, MonitorConfig, MonitorHandle},
        notifications::{NotificationDelivery, ThresholdEvent},
        reader::{Fetched, MetricReader, ReaderFactory, Snapshot},
        store::{Availability, Freshness, StoreReader, WidgetView},
        traits::{MetricSnapshot, NativeSource},
    };
}
