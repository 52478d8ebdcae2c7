use std::{future, ops::ControlFlow, sync::Arc, time::Duration, time::SystemTime};

use futures::future::join_all;
use parking_lot::RwLock;
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc, oneshot, watch,
    },
    time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    config::{ConfigurationEvent, ConfigurationStore, WidgetConfiguration},
    coordinator::{Debouncer, WidgetCoordinator, WidgetState},
    core::types::WidgetType,
    error::Result,
    notifications::NotificationThresholdEngine,
    reader::{Fetched, Snapshot},
    scheduler::{FetchCompletion, RefreshScheduler},
    store::WidgetDataStore,
};

pub(crate) type Mutation = Box<dyn FnOnce(&mut WidgetConfiguration) + Send>;

/// Requests from a [`super::MonitorHandle`]
pub(crate) enum Command {
    UpdateConfiguration {
        widget_type: WidgetType,
        mutation: Mutation,
        reply: oneshot::Sender<Result<WidgetConfiguration>>,
    },
    Configuration {
        reply: oneshot::Sender<Vec<WidgetConfiguration>>,
    },
    WidgetState {
        widget_type: WidgetType,
        reply: oneshot::Sender<WidgetState>,
    },
    Reorder {
        widget_type: WidgetType,
        position: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    ResetToDefaults {
        reply: oneshot::Sender<Result<()>>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
}

pub(super) struct MonitorActor {
    pub(super) scheduler: RefreshScheduler,
    pub(super) store: Arc<RwLock<WidgetDataStore>>,
    pub(super) coordinator: WidgetCoordinator,
    pub(super) engine: NotificationThresholdEngine,
    pub(super) configuration: ConfigurationStore,
    pub(super) debouncer: Debouncer,
    pub(super) revision: u64,
    pub(super) revisions: watch::Sender<u64>,
}

fn new_ticker(period: Duration) -> Interval {
    let period = period.max(super::MIN_TICK_PERIOD);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}

impl MonitorActor {
    pub(super) async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut completions: mpsc::Receiver<FetchCompletion>,
        mut configuration_events: broadcast::Receiver<ConfigurationEvent>,
    ) {
        self.reconcile();
        let mut period = self.scheduler.tick_period();
        let mut ticker = new_ticker(period);
        info!(active = self.scheduler.active_count(), ?period, "monitor running");

        loop {
            let next_period = self.scheduler.tick_period();
            if next_period != period {
                debug!(from = ?period, to = ?next_period, "tick period changed");
                period = next_period;
                ticker = new_ticker(period);
            }

            tokio::select! {
                _ = ticker.tick() => {
                    self.scheduler.dispatch_due(Instant::now());
                },
                Some(completion) = completions.recv() => self.apply_completion(completion),
                event = configuration_events.recv() => match event {
                    Ok(_) => self.debouncer.note(Instant::now()),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "configuration events lagged");
                        self.debouncer.note(Instant::now());
                    },
                    // The sender lives in `self.configuration`
                    Err(RecvError::Closed) => {},
                },
                _ = until(self.debouncer.deadline()) => {
                    if self.debouncer.fire(Instant::now()) {
                        self.reconcile();
                    }
                },
                command = commands.recv() => match command {
                    Some(command) => {
                        if let ControlFlow::Break(reply) = self.handle(command) {
                            commands.close();
                            self.shutdown().await;
                            let _ = reply.send(());
                            return;
                        }
                    },
                    None => {
                        debug!("all monitor handles dropped");
                        self.shutdown().await;
                        return;
                    },
                },
            }
        }
    }

    /// Serves one command; `Break` carries the reply of a stop request
    fn handle(&mut self, command: Command) -> ControlFlow<oneshot::Sender<()>> {
        match command {
            Command::UpdateConfiguration { widget_type, mutation, reply } => {
                let result = self.configuration.update(widget_type, mutation);
                if let Err(e) = &result {
                    warn!(%widget_type, error = %e, "configuration update not fully applied");
                }
                let _ = reply.send(result);
            },
            Command::Configuration { reply } => {
                let _ = reply.send(self.configuration.widgets().to_vec());
            },
            Command::WidgetState { widget_type, reply } => {
                let _ = reply.send(self.coordinator.state(widget_type));
            },
            Command::Reorder { widget_type, position, reply } => {
                let _ = reply.send(self.configuration.reorder(widget_type, position));
            },
            Command::ResetToDefaults { reply } => {
                let _ = reply.send(self.configuration.reset_to_defaults());
            },
            Command::Stop { reply } => return ControlFlow::Break(reply),
        }
        ControlFlow::Continue(())
    }

    /// Brings readers in line with the current configuration and fetches new ones right away
    fn reconcile(&mut self) {
        let transitions = {
            let mut store = self.store.write();
            self.coordinator.reconcile(self.configuration.widgets(), &mut self.scheduler, &mut store)
        };
        for transition in transitions.iter().filter(|t| t.to == WidgetState::Disabled) {
            self.engine.forget(transition.widget_type);
        }

        self.scheduler.dispatch_due(Instant::now());
        self.publish();
    }

    fn apply_completion(&mut self, completion: FetchCompletion) {
        let now = Instant::now();
        if !self.scheduler.accept(&completion, now) {
            return;
        }

        let widget_type = completion.widget_type;
        match completion.result {
            Ok(fetched) => {
                if !self.store.write().commit(&fetched, now).is_committed() {
                    return;
                }
                if fetched.is_fresh() {
                    self.evaluate_thresholds(widget_type, &fetched);
                }
            },
            Err(error) => {
                if error.is_unavailable() {
                    debug!(%widget_type, %error, "hardware unavailable");
                } else {
                    warn!(%widget_type, %error, "fetch failed, keeping last value");
                }
                self.store.write().record_failure(widget_type, &error);
            },
        }
        self.publish();
    }

    fn evaluate_thresholds(&mut self, widget_type: WidgetType, fetched: &Fetched<Snapshot>) {
        let Some(widget) = self.configuration.get(widget_type) else {
            return;
        };
        if widget.notification_thresholds.is_empty() {
            return;
        }

        let fired =
            self.engine.evaluate(widget_type, &widget.notification_thresholds, fetched.snapshot(), SystemTime::now());
        for event in fired {
            if let Err(e) = self.configuration.record_fired(widget_type, &event.threshold, event.fired_at) {
                warn!(%widget_type, error = %e, "threshold fire time not saved");
            }
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        self.revisions.send_replace(self.revision);
    }

    async fn shutdown(&mut self) {
        let aborted = self.scheduler.shutdown();
        {
            let mut store = self.store.write();
            self.coordinator.stop_all(&mut self.scheduler, &mut store);
        }
        // Let aborted fetches unwind before tearing the store down
        join_all(aborted).await;
        self.store.write().teardown();
        self.publish();
        info!("monitor stopped");
    }
}
