use std::sync::Arc;

use servia_events::EventBus;

use crate::config::ServerConfig;
use crate::gateway::billing::BillingClient;
use crate::gateway::orders::OrdersClient;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: servia_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients, grouped by email).
    pub ws_manager: Arc<WsManager>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
    /// Recurring-billing provider client.
    pub billing: Arc<BillingClient>,
    /// Credit top-up order provider client.
    pub orders: Arc<OrdersClient>,
    /// SMTP delivery, absent when email is not configured.
    pub mailer: Option<Arc<servia_events::delivery::EmailDelivery>>,
}
