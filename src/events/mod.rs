//! Change signal plumbing.
//!
//! Services publish domain [`Event`]s on an mpsc channel after their database
//! transaction commits. A background task ([`process_events`]) consumes the
//! channel and republishes client-facing notifications on a broadcast hub that
//! the SSE endpoint subscribes to. Delivery is best-effort: a full or dropped
//! channel never affects the committed transaction.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

/// Domain events emitted by the services after a successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A stock-affecting transaction committed.
    InventoryChanged {
        transaction_id: Uuid,
        component_id: Uuid,
        from_location_id: Option<Uuid>,
        to_location_id: Option<Uuid>,
        transaction_type: String,
        quantity: i32,
    },
    /// An inventory item crossed from above its threshold to at-or-below it.
    LowStockDetected {
        component_id: Uuid,
        location_id: Uuid,
        quantity: i32,
        min_stock_level: i32,
    },
    ComponentCreated(Uuid),
    ComponentDeactivated(Uuid),
    UserCreated(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Best-effort send used after a commit: failures are logged, never
    /// propagated, so a saturated channel cannot fail a committed mutation.
    pub async fn send_best_effort(&self, event: Event) {
        if let Err(err) = self.send(event).await {
            warn!("Dropping post-commit event: {}", err);
        }
    }
}

/// Notification shape pushed to connected clients. Clients are expected to
/// re-fetch rather than trust the payload as authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientNotification {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: serde_json::Value,
}

pub const NOTIFY_INVENTORY_UPDATED: &str = "INVENTORY_UPDATED";
pub const NOTIFY_LOW_STOCK: &str = "LOW_STOCK";

/// Fan-out hub for client notifications.
#[derive(Debug, Clone)]
pub struct ChangeBroadcaster {
    sender: broadcast::Sender<ClientNotification>,
}

impl ChangeBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientNotification> {
        self.sender.subscribe()
    }

    /// Publishes to all connected subscribers; having none is not an error.
    pub fn publish(&self, notification: ClientNotification) {
        let _ = self.sender.send(notification);
    }
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Background consumer translating domain events into client notifications.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, broadcaster: ChangeBroadcaster) {
    while let Some(event) = rx.recv().await {
        debug!(?event, "Processing event");
        match &event {
            Event::InventoryChanged {
                component_id,
                from_location_id,
                to_location_id,
                transaction_type,
                ..
            } => {
                broadcaster.publish(ClientNotification {
                    kind: NOTIFY_INVENTORY_UPDATED.to_string(),
                    payload: serde_json::json!({
                        "componentId": component_id,
                        "fromLocationId": from_location_id,
                        "toLocationId": to_location_id,
                        "transactionType": transaction_type,
                    }),
                });
            }
            Event::LowStockDetected {
                component_id,
                location_id,
                quantity,
                min_stock_level,
            } => {
                broadcaster.publish(ClientNotification {
                    kind: NOTIFY_LOW_STOCK.to_string(),
                    payload: serde_json::json!({
                        "componentId": component_id,
                        "locationId": location_id,
                        "quantity": quantity,
                        "minStockLevel": min_stock_level,
                    }),
                });
            }
            // Reference-data events are not pushed; clients poll those lists.
            Event::ComponentCreated(_) | Event::ComponentDeactivated(_) | Event::UserCreated(_) => {
            }
        }
    }
    debug!("Event channel closed; processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inventory_changed_reaches_subscribers() {
        let (tx, rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);
        let broadcaster = ChangeBroadcaster::new(8);
        let mut sub = broadcaster.subscribe();
        tokio::spawn(process_events(rx, broadcaster.clone()));

        sender
            .send(Event::InventoryChanged {
                transaction_id: Uuid::new_v4(),
                component_id: Uuid::new_v4(),
                from_location_id: None,
                to_location_id: Some(Uuid::new_v4()),
                transaction_type: "add".to_string(),
                quantity: 3,
            })
            .await
            .unwrap();

        let notification = sub.recv().await.unwrap();
        assert_eq!(notification.kind, NOTIFY_INVENTORY_UPDATED);
        assert_eq!(notification.payload["transactionType"], "add");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_not_an_error() {
        let broadcaster = ChangeBroadcaster::new(8);
        broadcaster.publish(ClientNotification {
            kind: NOTIFY_LOW_STOCK.to_string(),
            payload: serde_json::json!({}),
        });
    }
}
