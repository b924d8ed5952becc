use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin/db`.
///
/// ```text
/// POST   /records    -> insert_record
/// PUT    /records    -> update_records
/// DELETE /records    -> delete_records
/// POST   /table      -> create_table
/// GET    /table      -> select_rows
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/records",
            post(admin::insert_record)
                .put(admin::update_records)
                .delete(admin::delete_records),
        )
        .route("/table", post(admin::create_table).get(admin::select_rows))
}
