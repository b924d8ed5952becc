//! Route definitions for the `/bid-cards` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bid_card;
use crate::state::AppState;

/// Routes mounted at `/bid-cards`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create (multipart)
/// POST   /validate?step=    -> validate_step
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(bid_card::list).post(bid_card::create))
        .route("/validate", post(bid_card::validate_step))
        .route("/{id}", get(bid_card::get_by_id).put(bid_card::update))
}
