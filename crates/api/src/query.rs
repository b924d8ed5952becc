//! Shared query parameter types for API handlers.

use serde::Deserialize;

use instabids_core::types::EntityId;

/// `GET /api/bid-cards?ownerId=&limit=&offset=`. Values are clamped in the
/// service via `clamp_limit` / `clamp_offset`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidCardListParams {
    pub owner_id: Option<EntityId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?step=` for per-step wizard validation (zero-based).
#[derive(Debug, Deserialize)]
pub struct StepParams {
    pub step: usize,
}

/// `GET /api/admin/db/table?name=&columns=&limit=&offset=&orderBy=`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableParams {
    pub name: Option<String>,
    pub columns: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order_by: Option<String>,
}
