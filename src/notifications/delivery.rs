use std::sync::Arc;

use async_trait::async_trait;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{info, warn};

use super::ThresholdEvent;
use crate::error::Result;

/// Presents fired thresholds to the user
#[async_trait]
pub trait NotificationDelivery: Send + Sync {
    async fn deliver(&self, event: ThresholdEvent) -> Result<()>;
}

/// Delivery that only logs, used when no presenter is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDelivery;

#[async_trait]
impl NotificationDelivery for LogDelivery {
    async fn deliver(&self, event: ThresholdEvent) -> Result<()> {
        info!(widget = %event.widget_type, summary = %event.summary(), "threshold alert");
        Ok(())
    }
}

/// Forwards events to `delivery` until the channel closes.
///
/// Delivery failures are logged and do not stop the task.
pub fn spawn_delivery(
    mut events: broadcast::Receiver<ThresholdEvent>,
    delivery: Arc<dyn NotificationDelivery>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = delivery.deliver(event).await {
                        warn!(error = %e, "notification delivery failed");
                    }
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "notification delivery fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}
