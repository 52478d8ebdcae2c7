//! # Core Metrics Module
//!
//! Timestamped samples and the bounded rolling history that charts read from.
//!
//! ## Example
//!
//! ```rust
//! use tonic_telemetry::core::metrics::HistoryBuffer;
//! use tokio::time::Instant;
//!
//! let mut history = HistoryBuffer::new(2);
//! let now = Instant::now();
//! history.push(now, 10.0);
//! history.push(now, 20.0);
//! history.push(now, 30.0);
//!
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.latest().map(|s| s.value), Some(30.0));
//! ```
use std::collections::VecDeque;

use tokio::time::Instant;

/// Number of samples kept per series when nothing else is configured
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

/// Largest history a series may be configured to keep
pub const MAX_HISTORY_CAPACITY: usize = 180;

/// A single measurement with the instant it was committed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T> {
    pub timestamp: Instant,
    pub value: T,
}

/// Fixed-capacity ring of samples, oldest first.
///
/// Pushing onto a full buffer evicts the oldest sample. Timestamps never go
/// backwards: a sample older than the newest one is clamped to the newest
/// timestamp so readers can rely on monotonic ordering.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    capacity: usize,
    samples: VecDeque<Sample<T>>,
}

impl<T> HistoryBuffer<T> {
    /// Creates an empty buffer. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, samples: VecDeque::with_capacity(capacity) }
    }

    /// Appends a sample, returning the evicted one when the buffer was full
    pub fn push(&mut self, timestamp: Instant, value: T) -> Option<Sample<T>> {
        let timestamp = match self.samples.back() {
            Some(newest) if newest.timestamp > timestamp => newest.timestamp,
            _ => timestamp,
        };

        let evicted = if self.samples.len() >= self.capacity { self.samples.pop_front() } else { None };
        self.samples.push_back(Sample { timestamp, value });
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&Sample<T>> {
        self.samples.back()
    }

    pub fn oldest(&self) -> Option<&Sample<T>> {
        self.samples.front()
    }

    /// Iterates from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Sample<T>> + '_ {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<T: Clone> HistoryBuffer<T> {
    /// Copies the samples out, oldest first
    pub fn to_vec(&self) -> Vec<Sample<T>> {
        self.samples.iter().cloned().collect()
    }
}

impl HistoryBuffer<f64> {
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.value)
    }

    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.values().sum::<f64>() / self.samples.len() as f64)
    }

    pub fn max(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.values().reduce(f64::min)
    }
}
