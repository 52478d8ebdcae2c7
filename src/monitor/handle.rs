use std::{fmt, sync::Arc};

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use super::actor::Command;
use crate::{
    config::{ConfigurationEvent, WidgetConfiguration},
    coordinator::WidgetState,
    core::types::WidgetType,
    error::{Error, Result},
    notifications::ThresholdEvent,
    store::StoreReader,
};

/// Cloneable access to a running monitor
#[derive(Clone)]
pub struct MonitorHandle {
    commands: mpsc::Sender<Command>,
    store: StoreReader,
    revisions: watch::Receiver<u64>,
    // Kept only to resubscribe; never read
    configuration_events: Arc<broadcast::Receiver<ConfigurationEvent>>,
    alerts: Arc<broadcast::Receiver<ThresholdEvent>>,
}

impl fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("running", &self.is_running())
            .field("revision", &*self.revisions.borrow())
            .finish_non_exhaustive()
    }
}

impl MonitorHandle {
    pub(super) fn new(
        commands: mpsc::Sender<Command>,
        store: StoreReader,
        revisions: watch::Receiver<u64>,
        configuration_events: Arc<broadcast::Receiver<ConfigurationEvent>>,
        alerts: Arc<broadcast::Receiver<ThresholdEvent>>,
    ) -> Self {
        Self { commands, store, revisions, configuration_events, alerts }
    }

    /// Read-only view of the data store
    pub fn store(&self) -> &StoreReader {
        &self.store
    }

    /// Store revision, bumped on every change to the store
    pub fn revisions(&self) -> watch::Receiver<u64> {
        self.revisions.clone()
    }

    /// Configuration changes from this point on
    pub fn subscribe_configuration(&self) -> broadcast::Receiver<ConfigurationEvent> {
        self.configuration_events.resubscribe()
    }

    /// Threshold alerts from this point on
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<ThresholdEvent> {
        self.alerts.resubscribe()
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    /// Mutates one widget's configuration.
    ///
    /// The change is persisted and reaches the running readers after the
    /// debounce window. On a persistence error the change is still live and
    /// the error is returned.
    pub async fn update_configuration<F>(&self, widget_type: WidgetType, mutation: F) -> Result<WidgetConfiguration>
    where
        F: FnOnce(&mut WidgetConfiguration) + Send + 'static,
    {
        self.request(|reply| Command::UpdateConfiguration { widget_type, mutation: Box::new(mutation), reply })
            .await?
    }

    /// Every widget's configuration ordered by position
    pub async fn configuration(&self) -> Result<Vec<WidgetConfiguration>> {
        self.request(|reply| Command::Configuration { reply }).await
    }

    pub async fn widget_state(&self, widget_type: WidgetType) -> Result<WidgetState> {
        self.request(|reply| Command::WidgetState { widget_type, reply }).await
    }

    pub async fn reorder(&self, widget_type: WidgetType, position: usize) -> Result<()> {
        self.request(|reply| Command::Reorder { widget_type, position, reply }).await?
    }

    pub async fn reset_to_defaults(&self) -> Result<()> {
        self.request(|reply| Command::ResetToDefaults { reply }).await?
    }

    /// Stops monitoring and waits for in-flight work to be cancelled.
    ///
    /// Stopping an already stopped monitor is a no-op.
    pub async fn stop(&self) -> Result<()> {
        match self.request(|reply| Command::Stop { reply }).await {
            Ok(()) | Err(Error::Channel(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands.send(command(reply)).await.map_err(|_| Error::channel("monitor is not running"))?;
        response.await.map_err(|_| Error::channel("monitor stopped before replying"))
    }
}
