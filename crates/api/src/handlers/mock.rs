//! Handlers for the development mock under `/mock-bid-cards`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use instabids_core::bid_card::BidCard;
use instabids_core::types::EntityId;

use crate::error::{AppError, AppResult};
use crate::extract::{AppMultipart, AppPath, MaybeUser};
use crate::mock::{MockBidCard, MockBidCards};
use crate::multipart::read_submission;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MockCreated {
    pub success: bool,
    pub id: EntityId,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockList {
    pub bid_cards: Vec<BidCard>,
}

fn mock(state: &AppState) -> AppResult<&MockBidCards> {
    state
        .mock
        .as_ref()
        .ok_or_else(|| AppError::RouteNotFound("/api/mock-bid-cards".into()))
}

/// POST /api/mock-bid-cards
pub async fn create(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    AppMultipart(multipart): AppMultipart,
) -> AppResult<(StatusCode, Json<MockCreated>)> {
    let submission = read_submission(multipart).await?;
    let card = mock(&state)?
        .create(submission.form, submission.files, caller)
        .await?;
    tracing::debug!(bid_card_id = %card.id, "Mock bid card stored");
    Ok((
        StatusCode::CREATED,
        Json(MockCreated {
            success: true,
            id: card.id,
            message: "Bid card created".into(),
        }),
    ))
}

/// GET /api/mock-bid-cards
pub async fn list(State(state): State<AppState>) -> AppResult<Json<MockList>> {
    let bid_cards = mock(&state)?.list().await?;
    Ok(Json(MockList { bid_cards }))
}

/// GET /api/mock-bid-cards/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<MockBidCard>> {
    let card = mock(&state)?.lookup(&id).await?;
    Ok(Json(card))
}
