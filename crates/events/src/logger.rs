//! Background subscriber that writes every event to `tracing`.

use tokio::sync::broadcast;

use crate::bus::DomainEvent;

pub struct EventLogger;

impl EventLogger {
    /// Log events until the bus is dropped. Returns how many events were
    /// logged.
    pub async fn run(mut receiver: broadcast::Receiver<DomainEvent>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    logged += 1;
                    tracing::debug!(
                        event_type = %event.event_type,
                        entity_type = event.entity_type.as_deref().unwrap_or("-"),
                        entity_id = event.entity_id,
                        payload = %event.payload,
                        "Domain event"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event logger lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event logger shutting down");
                    break;
                }
            }
        }
        logged
    }
}
