//! # Widget Data Store
//!
//! Current snapshot, availability and per-series history for every tracked
//! widget. Only the main context mutates the store; consumers get a
//! [`StoreReader`] and are told about changes through a revision counter.
use std::{collections::BTreeMap, sync::Arc, time::Duration};

use parking_lot::RwLock;
use serde::Serialize;
use tokio::time::Instant;

use crate::{
    core::{
        metrics::{HistoryBuffer, Sample},
        types::{SeriesKey, WidgetType},
    },
    error::ReadError,
    reader::{Fetched, Snapshot},
};

/// Whether a widget should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// Enabled, waiting for its first sample
    Pending,
    Available,
    /// The hardware is absent or unsupported
    Hidden,
}

/// How current the data shown for a widget is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Pending,
    Live { age: Duration },
    /// No successful sample for several refresh intervals
    Stale { age: Duration },
    Unavailable,
}

/// Whether a fetch result was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { history_appended: bool },
    /// The widget is not tracked or the store was torn down
    Rejected,
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

#[derive(Debug)]
struct WidgetEntry {
    interval: Duration,
    availability: Availability,
    /// How long the reader may answer from its cache
    cache_ttl: Duration,
    current: Option<Snapshot>,
    captured_at: Option<Instant>,
    last_error: Option<ReadError>,
    consecutive_failures: u32,
}

impl WidgetEntry {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            cache_ttl: Duration::ZERO,
            availability: Availability::Pending,
            current: None,
            captured_at: None,
            last_error: None,
            consecutive_failures: 0,
        }
    }
}

/// Store mutated by the main context only
#[derive(Debug)]
pub struct WidgetDataStore {
    entries: BTreeMap<WidgetType, WidgetEntry>,
    history: BTreeMap<SeriesKey, HistoryBuffer<f64>>,
    history_capacity: usize,
    stale_after_cycles: u32,
    torn_down: bool,
}

impl WidgetDataStore {
    pub fn new(history_capacity: usize, stale_after_cycles: u32) -> Self {
        Self {
            entries: BTreeMap::new(),
            history: BTreeMap::new(),
            history_capacity,
            stale_after_cycles: stale_after_cycles.max(1),
            torn_down: false,
        }
    }

    /// Starts tracking a widget, or updates the interval of a tracked one
    pub(crate) fn track(&mut self, widget_type: WidgetType, interval: Duration) {
        if self.torn_down {
            return;
        }
        self.entries.entry(widget_type).and_modify(|entry| entry.interval = interval).or_insert_with(|| WidgetEntry::new(interval));
    }

    /// Records the reader's cache TTL; a cached answer is never older than it
    pub(crate) fn set_cache_ttl(&mut self, widget_type: WidgetType, cache_ttl: Duration) {
        if let Some(entry) = self.entries.get_mut(&widget_type) {
            entry.cache_ttl = cache_ttl;
        }
    }

    /// Stops tracking a widget and drops its history
    pub(crate) fn untrack(&mut self, widget_type: WidgetType) -> bool {
        self.history.retain(|key, _| key.widget_type() != widget_type);
        self.entries.remove(&widget_type).is_some()
    }

    /// Applies a successful fetch.
    ///
    /// Every commit replaces the current snapshot; only fresh samples are
    /// appended to history, so cache hits never duplicate points.
    pub(crate) fn commit(&mut self, fetched: &Fetched<Snapshot>, now: Instant) -> CommitOutcome {
        if self.torn_down {
            return CommitOutcome::Rejected;
        }
        let snapshot = fetched.snapshot();
        let Some(entry) = self.entries.get_mut(&snapshot.widget_type()) else {
            return CommitOutcome::Rejected;
        };

        entry.availability = Availability::Available;
        entry.current = Some(snapshot.clone());
        entry.captured_at = Some(fetched.captured_at());
        entry.last_error = None;
        entry.consecutive_failures = 0;

        let history_appended = fetched.is_fresh();
        if history_appended {
            let capacity = self.history_capacity;
            for (key, value) in snapshot.series() {
                if value.is_finite() {
                    self.history.entry(key).or_insert_with(|| HistoryBuffer::new(capacity)).push(now, value);
                }
            }
        }
        CommitOutcome::Committed { history_appended }
    }

    /// Records a failed fetch. Unavailable hardware hides the widget; other
    /// failures keep the last good snapshot visible until it goes stale.
    pub(crate) fn record_failure(&mut self, widget_type: WidgetType, error: &ReadError) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(entry) = self.entries.get_mut(&widget_type) else {
            return false;
        };
        if error.is_unavailable() {
            entry.availability = Availability::Hidden;
        }
        entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
        entry.last_error = Some(error.clone());
        true
    }

    /// Marks a tracked widget hidden without a fetch, e.g. when no reader could be created
    pub(crate) fn mark_unavailable(&mut self, widget_type: WidgetType, interval: Duration, reason: &str) {
        self.track(widget_type, interval);
        self.record_failure(widget_type, &ReadError::unavailable(reason));
    }

    /// Drops everything and refuses further writes
    pub(crate) fn teardown(&mut self) {
        self.entries.clear();
        self.history.clear();
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn is_tracked(&self, widget_type: WidgetType) -> bool {
        self.entries.contains_key(&widget_type)
    }

    pub fn tracked(&self) -> impl Iterator<Item = WidgetType> + '_ {
        self.entries.keys().copied()
    }

    pub fn current(&self, widget_type: WidgetType) -> Option<&Snapshot> {
        self.entries.get(&widget_type)?.current.as_ref()
    }

    pub fn availability(&self, widget_type: WidgetType) -> Option<Availability> {
        self.entries.get(&widget_type).map(|entry| entry.availability)
    }

    /// When the current snapshot was sampled from hardware
    pub fn captured_at(&self, widget_type: WidgetType) -> Option<Instant> {
        self.entries.get(&widget_type)?.captured_at
    }

    pub fn last_error(&self, widget_type: WidgetType) -> Option<&ReadError> {
        self.entries.get(&widget_type)?.last_error.as_ref()
    }

    pub fn consecutive_failures(&self, widget_type: WidgetType) -> u32 {
        self.entries.get(&widget_type).map_or(0, |entry| entry.consecutive_failures)
    }

    pub fn history(&self, key: SeriesKey) -> Option<&HistoryBuffer<f64>> {
        self.history.get(&key)
    }

    /// Live while the snapshot is younger than `stale_after_cycles` refresh
    /// periods. The period is the refresh interval, or the reader's cache TTL
    /// when that is longer, since cached answers keep their capture time.
    pub fn freshness(&self, widget_type: WidgetType, now: Instant) -> Freshness {
        let Some(entry) = self.entries.get(&widget_type) else {
            return Freshness::Unavailable;
        };
        if entry.availability == Availability::Hidden {
            return Freshness::Unavailable;
        }
        let Some(captured_at) = entry.captured_at else {
            return Freshness::Pending;
        };

        let age = now.saturating_duration_since(captured_at);
        if age > entry.interval.max(entry.cache_ttl) * self.stale_after_cycles {
            Freshness::Stale { age }
        } else {
            Freshness::Live { age }
        }
    }
}

/// Everything a widget needs to render, copied out of the store
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView {
    pub widget_type: WidgetType,
    pub availability: Availability,
    pub freshness: Freshness,
    pub snapshot: Option<Snapshot>,
}

/// Read-only, cloneable handle onto the store
#[derive(Debug, Clone)]
pub struct StoreReader {
    inner: Arc<RwLock<WidgetDataStore>>,
}

impl StoreReader {
    pub(crate) fn new(inner: Arc<RwLock<WidgetDataStore>>) -> Self {
        Self { inner }
    }

    /// Runs `f` against the store under a read lock, avoiding copies
    pub fn with<R>(&self, f: impl FnOnce(&WidgetDataStore) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn current(&self, widget_type: WidgetType) -> Option<Snapshot> {
        self.inner.read().current(widget_type).cloned()
    }

    pub fn history(&self, key: SeriesKey) -> Vec<Sample<f64>> {
        self.inner.read().history(key).map(HistoryBuffer::to_vec).unwrap_or_default()
    }

    pub fn latest(&self, key: SeriesKey) -> Option<Sample<f64>> {
        self.inner.read().history(key).and_then(|history| history.latest().copied())
    }

    pub fn availability(&self, widget_type: WidgetType) -> Option<Availability> {
        self.inner.read().availability(widget_type)
    }

    pub fn freshness(&self, widget_type: WidgetType) -> Freshness {
        self.inner.read().freshness(widget_type, Instant::now())
    }

    pub fn view(&self, widget_type: WidgetType) -> Option<WidgetView> {
        let store = self.inner.read();
        let availability = store.availability(widget_type)?;
        Some(WidgetView {
            widget_type,
            availability,
            freshness: store.freshness(widget_type, Instant::now()),
            snapshot: store.current(widget_type).cloned(),
        })
    }
}
