use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Domain events emitted after a committed state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    WorkOrderCreated { wo_id: i64, wo_number: String },
    WorkOrderUpdated { wo_id: i64 },
    WorkOrderDeleted { wo_id: i64 },
}

/// Channel-backed event publisher shared by the service layer.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, returning an error when the channel is closed.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {e}"))
    }

    /// Fire-and-forget publish. Event delivery never fails a request
    /// that has already committed; failures are logged instead.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            error!(?event, "event dispatch failed: {e}");
        }
    }
}

/// Background consumer that drains the event channel. Downstream
/// integrations (outbox, webhooks) would hang off this loop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::WorkOrderCreated { wo_id, wo_number } => {
                info!(wo_id, wo_number, "work order created");
            }
            Event::WorkOrderUpdated { wo_id } => {
                info!(wo_id, "work order updated");
            }
            Event::WorkOrderDeleted { wo_id } => {
                info!(wo_id, "work order deleted");
            }
        }
    }
}
