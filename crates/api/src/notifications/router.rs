//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the platform event bus and pushes
//! payment-related events to the affected user's WebSocket email group, so a
//! browser waiting on a QR payment sees the credit top-up without polling.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;

use servia_events::PlatformEvent;

use crate::ws::WsManager;

/// Event types pushed to connected clients.
const ROUTED_EVENTS: [&str; 2] = ["payment.updated", "subscription.updated"];

/// Routes platform events to WebSocket clients.
pub struct NotificationRouter {
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    /// Create a new router delivering through the given connection manager.
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](servia_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Push a single event to the email group it concerns.
    async fn route_event(&self, event: &PlatformEvent) {
        if !ROUTED_EVENTS.contains(&event.event_type.as_str()) {
            return;
        }

        let Some(email) = event.email.as_deref() else {
            tracing::warn!(event_type = %event.event_type, "Routable event without email, skipping");
            return;
        };

        let message = serde_json::json!({
            "type": event.event_type,
            "payload": event.payload,
            "timestamp": event.timestamp,
        });

        let sent = self
            .ws_manager
            .send_to_email(email, Message::Text(message.to_string().into()))
            .await;

        tracing::debug!(
            event_type = %event.event_type,
            connections = sent,
            "Routed event to WebSocket group"
        );
    }
}
