//! # Refresh Scheduler
//!
//! Decides which readers are due and issues their fetches as background
//! tasks. Each registration gets a fresh epoch; completions carry the epoch
//! they were issued under and are only accepted while it still matches, so a
//! result from a reader that was disabled, or disabled and re-enabled, is
//! discarded instead of resurrecting old state.
use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use tracing::{debug, trace};

use crate::{
    core::types::WidgetType,
    error::ReadError,
    reader::{Fetched, MetricReader, Snapshot},
};

/// Tick period policy: slower when few widgets are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TickPolicy {
    #[serde(with = "crate::utils::duration_ms")]
    pub slow: Duration,
    #[serde(with = "crate::utils::duration_ms")]
    pub fast: Duration,
    /// Active reader count at which the fast period kicks in
    pub fast_threshold: usize,
}

impl Default for TickPolicy {
    fn default() -> Self {
        Self { slow: Duration::from_secs(1), fast: Duration::from_millis(500), fast_threshold: 5 }
    }
}

impl TickPolicy {
    pub fn period(&self, active_readers: usize) -> Duration {
        if active_readers >= self.fast_threshold {
            self.fast
        } else {
            self.slow
        }
    }
}

/// Outcome of a background fetch, delivered back to the main context
#[derive(Debug)]
pub struct FetchCompletion {
    pub widget_type: WidgetType,
    pub epoch: u64,
    pub issued_at: Instant,
    pub result: Result<Fetched<Snapshot>, ReadError>,
}

struct ReaderSlot {
    reader: MetricReader,
    interval: Duration,
    epoch: u64,
    last_completed: Option<Instant>,
    in_flight: Option<JoinHandle<()>>,
}

impl ReaderSlot {
    fn is_due(&self, now: Instant) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        match self.last_completed {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }
}

/// Tracks registered readers and their in-flight fetches
pub struct RefreshScheduler {
    slots: BTreeMap<WidgetType, ReaderSlot>,
    next_epoch: u64,
    completions: mpsc::Sender<FetchCompletion>,
    policy: TickPolicy,
}

impl RefreshScheduler {
    pub fn new(completions: mpsc::Sender<FetchCompletion>, policy: TickPolicy) -> Self {
        Self { slots: BTreeMap::new(), next_epoch: 1, completions, policy }
    }

    /// Registers a reader, replacing and cancelling any previous one for the
    /// same widget. Returns the epoch of the new registration.
    pub fn register(&mut self, reader: MetricReader, interval: Duration) -> u64 {
        let widget_type = reader.widget_type();
        self.deregister(widget_type);

        let epoch = self.next_epoch;
        self.next_epoch += 1;
        debug!(%widget_type, epoch, ?interval, "reader registered");
        self.slots.insert(widget_type, ReaderSlot { reader, interval, epoch, last_completed: None, in_flight: None });
        epoch
    }

    /// Removes a reader and aborts its in-flight fetch
    pub fn deregister(&mut self, widget_type: WidgetType) -> bool {
        match self.slots.remove(&widget_type) {
            Some(slot) => {
                if let Some(handle) = slot.in_flight {
                    handle.abort();
                }
                debug!(%widget_type, epoch = slot.epoch, "reader deregistered");
                true
            },
            None => false,
        }
    }

    /// Changes how often a reader is polled without restarting it
    pub fn set_interval(&mut self, widget_type: WidgetType, interval: Duration) -> bool {
        match self.slots.get_mut(&widget_type) {
            Some(slot) => {
                slot.interval = interval;
                true
            },
            None => false,
        }
    }

    pub fn is_registered(&self, widget_type: WidgetType) -> bool {
        self.slots.contains_key(&widget_type)
    }

    pub fn is_in_flight(&self, widget_type: WidgetType) -> bool {
        self.slots.get(&widget_type).is_some_and(|slot| slot.in_flight.is_some())
    }

    pub fn epoch(&self, widget_type: WidgetType) -> Option<u64> {
        self.slots.get(&widget_type).map(|slot| slot.epoch)
    }

    pub fn interval(&self, widget_type: WidgetType) -> Option<Duration> {
        self.slots.get(&widget_type).map(|slot| slot.interval)
    }

    pub fn active_count(&self) -> usize {
        self.slots.len()
    }

    pub fn tick_period(&self) -> Duration {
        self.policy.period(self.active_count())
    }

    /// Readers that should be fetched at `now`
    pub fn due(&self, now: Instant) -> Vec<WidgetType> {
        self.slots.iter().filter(|(_, slot)| slot.is_due(now)).map(|(widget_type, _)| *widget_type).collect()
    }

    /// Issues a fetch for every due reader. Must run inside a Tokio runtime.
    pub fn dispatch_due(&mut self, now: Instant) -> Vec<WidgetType> {
        let due = self.due(now);
        for widget_type in &due {
            let Some(slot) = self.slots.get_mut(widget_type) else {
                continue;
            };

            let fetch = slot.reader.fetch();
            let completions = self.completions.clone();
            let (widget_type, epoch) = (*widget_type, slot.epoch);
            trace!(%widget_type, epoch, "fetch issued");

            slot.in_flight = Some(tokio::spawn(async move {
                let result = fetch.await;
                // The receiver is gone only during shutdown
                let _ = completions.send(FetchCompletion { widget_type, epoch, issued_at: now, result }).await;
            }));
        }
        due
    }

    /// Accepts a completion if it belongs to the current registration.
    ///
    /// Transient failures leave the reader due again on the next tick;
    /// absent hardware waits out the normal interval.
    pub fn accept(&mut self, completion: &FetchCompletion, now: Instant) -> bool {
        let Some(slot) = self.slots.get_mut(&completion.widget_type) else {
            trace!(widget_type = %completion.widget_type, "completion for unregistered reader dropped");
            return false;
        };
        if slot.epoch != completion.epoch {
            trace!(
                widget_type = %completion.widget_type,
                current = slot.epoch,
                stale = completion.epoch,
                "stale completion dropped"
            );
            return false;
        }

        slot.in_flight = None;
        let retry = matches!(&completion.result, Err(e) if !e.is_unavailable());
        if !retry {
            slot.last_completed = Some(now);
        }
        true
    }

    /// Deregisters everything, returning the aborted fetch handles so the
    /// caller can wait for them to unwind.
    pub fn shutdown(&mut self) -> Vec<JoinHandle<()>> {
        let slots = std::mem::take(&mut self.slots);
        slots
            .into_values()
            .filter_map(|slot| slot.in_flight)
            .map(|handle| {
                handle.abort();
                handle
            })
            .collect()
    }
}
