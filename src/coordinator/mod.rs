//! # Widget Coordinator
//!
//! Keeps the set of running readers in line with the enabled widget
//! configuration. Each widget moves through
//! `Disabled → Starting → Active → Stopping → Disabled`; transitions only
//! happen in [`WidgetCoordinator::reconcile`] and [`WidgetCoordinator::stop_all`].
use std::{collections::BTreeMap, fmt, time::Duration};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::WidgetConfiguration, core::types::WidgetType, reader::ReaderFactory, scheduler::RefreshScheduler,
    store::WidgetDataStore,
};

mod debounce;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE_WINDOW};

/// Lifecycle state of one widget's reader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetState {
    #[default]
    Disabled,
    Starting,
    Active,
    Stopping,
}

/// One lifecycle step taken during reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub widget_type: WidgetType,
    pub from: WidgetState,
    pub to: WidgetState,
}

/// Owns reader lifecycle for every widget type
pub struct WidgetCoordinator {
    factory: Box<dyn ReaderFactory>,
    states: BTreeMap<WidgetType, WidgetState>,
}

impl fmt::Debug for WidgetCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetCoordinator").field("states", &self.states).finish_non_exhaustive()
    }
}

impl WidgetCoordinator {
    pub fn new(factory: Box<dyn ReaderFactory>) -> Self {
        Self { factory, states: BTreeMap::new() }
    }

    pub fn state(&self, widget_type: WidgetType) -> WidgetState {
        self.states.get(&widget_type).copied().unwrap_or_default()
    }

    pub fn active(&self) -> impl Iterator<Item = WidgetType> + '_ {
        self.states.iter().filter(|(_, state)| **state == WidgetState::Active).map(|(widget_type, _)| *widget_type)
    }

    /// Starts, stops or retunes readers so they match `widgets`.
    ///
    /// Widgets missing from `widgets` are treated as disabled.
    pub fn reconcile(
        &mut self,
        widgets: &[WidgetConfiguration],
        scheduler: &mut RefreshScheduler,
        store: &mut WidgetDataStore,
    ) -> Vec<Transition> {
        let mut transitions = Vec::new();

        for widget_type in WidgetType::ALL {
            let desired = widgets.iter().find(|widget| widget.widget_type == widget_type && widget.is_enabled);

            match (self.state(widget_type), desired) {
                (WidgetState::Disabled, Some(widget)) => {
                    self.start(widget_type, widget.refresh_interval(), scheduler, store, &mut transitions);
                },
                (WidgetState::Active, Some(widget)) => {
                    let interval = widget.refresh_interval();
                    if scheduler.interval(widget_type) != Some(interval) {
                        debug!(%widget_type, ?interval, "refresh interval changed");
                        scheduler.set_interval(widget_type, interval);
                        store.track(widget_type, interval);
                    }
                },
                (WidgetState::Active, None) => self.stop(widget_type, scheduler, store, &mut transitions),
                (WidgetState::Disabled, None) => {
                    // Left over from a reader that could not be created
                    store.untrack(widget_type);
                },
                (WidgetState::Starting | WidgetState::Stopping, _) => {
                    warn!(%widget_type, state = ?self.state(widget_type), "widget caught mid-transition");
                },
            }
        }

        transitions
    }

    /// Stops every active reader
    pub fn stop_all(&mut self, scheduler: &mut RefreshScheduler, store: &mut WidgetDataStore) -> Vec<Transition> {
        let mut transitions = Vec::new();
        let active: Vec<_> = self.active().collect();
        for widget_type in active {
            self.stop(widget_type, scheduler, store, &mut transitions);
        }
        transitions
    }

    fn start(
        &mut self,
        widget_type: WidgetType,
        interval: Duration,
        scheduler: &mut RefreshScheduler,
        store: &mut WidgetDataStore,
        transitions: &mut Vec<Transition>,
    ) {
        self.transition(widget_type, WidgetState::Starting, transitions);

        match self.factory.create(widget_type) {
            Ok(reader) => {
                store.track(widget_type, interval);
                store.set_cache_ttl(widget_type, reader.descriptor().cache_ttl);
                scheduler.register(reader, interval);
                self.transition(widget_type, WidgetState::Active, transitions);
                info!(%widget_type, ?interval, "widget started");
            },
            Err(e) => {
                warn!(%widget_type, error = %e, "reader could not be created, hiding widget");
                store.mark_unavailable(widget_type, interval, &e.to_string());
                self.transition(widget_type, WidgetState::Disabled, transitions);
            },
        }
    }

    fn stop(
        &mut self,
        widget_type: WidgetType,
        scheduler: &mut RefreshScheduler,
        store: &mut WidgetDataStore,
        transitions: &mut Vec<Transition>,
    ) {
        self.transition(widget_type, WidgetState::Stopping, transitions);
        scheduler.deregister(widget_type);
        store.untrack(widget_type);
        self.transition(widget_type, WidgetState::Disabled, transitions);
        info!(%widget_type, "widget stopped");
    }

    fn transition(&mut self, widget_type: WidgetType, to: WidgetState, transitions: &mut Vec<Transition>) {
        let from = self.state(widget_type);
        debug!(%widget_type, ?from, ?to, "widget transition");
        self.states.insert(widget_type, to);
        transitions.push(Transition { widget_type, from, to });
    }
}
