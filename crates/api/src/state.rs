use std::sync::Arc;

use instabids_core::persistence::AdminTables;
use instabids_core::services::{BidCardService, MessageService};

use crate::config::ServerConfig;
use crate::mock::MockBidCards;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: services hold their collaborators behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub bid_cards: BidCardService,
    pub messages: MessageService,
    /// Generic table access for the admin passthrough.
    pub admin: Arc<dyn AdminTables>,
    /// Present only when `MOCK_BID_CARDS` is on.
    pub mock: Option<MockBidCards>,
    /// Database pool for the health check. `None` when running on
    /// in-memory collaborators.
    pub pool: Option<instabids_db::DbPool>,
}
