use axum::routing::get;
use axum::Router;

use crate::handlers::message;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /{project_id}/contractors                              -> contractors
/// GET    /{project_id}/contractors/{contractor_id}/messages     -> thread
/// POST   /{project_id}/contractors/{contractor_id}/messages     -> send
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{project_id}/contractors", get(message::contractors))
        .route(
            "/{project_id}/contractors/{contractor_id}/messages",
            get(message::thread).post(message::send),
        )
}
