use axum::routing::get;
use axum::Router;

use crate::handlers::mock;
use crate::state::AppState;

/// Routes mounted at `/mock-bid-cards` when the mock is enabled.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(mock::list).post(mock::create))
        .route("/{id}", get(mock::get_by_id))
}
