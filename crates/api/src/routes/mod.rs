pub mod admin;
pub mod bid_card;
pub mod health;
pub mod message;
pub mod mock;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /bid-cards                                          list, create
/// /bid-cards/validate?step=                           per-step wizard validation
/// /bid-cards/{id}                                     get, update
///
/// /projects/{project_id}/contractors                  contractor summaries
/// /projects/{project_id}/contractors/{id}/messages    thread, send
///
/// /admin/db/records                                   insert, update, delete
/// /admin/db/table                                     create table, select rows
///
/// /mock-bid-cards                                     dev mock (MOCK_BID_CARDS)
/// /mock-bid-cards/{id}
/// ```
pub fn api_routes(mock_bid_cards: bool) -> Router<AppState> {
    let routes = Router::new()
        .nest("/bid-cards", bid_card::router())
        .nest("/projects", message::router())
        .nest("/admin/db", admin::router());

    if mock_bid_cards {
        routes.nest("/mock-bid-cards", mock::router())
    } else {
        routes
    }
}
