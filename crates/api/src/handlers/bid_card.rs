//! Handlers for the `/bid-cards` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use instabids_core::bid_card::{validate, BidCard, BidCardForm, SubmissionMode, ValidationContext};
use instabids_core::error::CoreError;
use instabids_core::types::EntityId;
use instabids_core::validation::FieldViolation;
use instabids_core::wizard::{parse_step, step_violations, with_default_status, WizardStep};

use crate::error::AppResult;
use crate::extract::{AppJson, AppMultipart, AppPath, AppQuery, MaybeUser};
use crate::multipart::read_submission;
use crate::query::{BidCardListParams, StepParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn context(mode: SubmissionMode) -> ValidationContext {
    let now = Utc::now();
    match mode {
        SubmissionMode::Submit => ValidationContext::submit(now),
        SubmissionMode::Draft => ValidationContext::draft(now),
    }
}

/// GET /api/bid-cards
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<BidCardListParams>,
) -> AppResult<Json<DataResponse<Vec<BidCard>>>> {
    let cards = state
        .bid_cards
        .list(params.owner_id, params.limit, params.offset)
        .await?;
    Ok(Json(DataResponse { data: cards }))
}

/// GET /api/bid-cards/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
) -> AppResult<Json<DataResponse<BidCard>>> {
    let card = state.bid_cards.get(id).await?;
    Ok(Json(DataResponse { data: card }))
}

/// POST /api/bid-cards
///
/// Multipart: `data`, `mode`, repeated `files`. An identified caller always
/// owns the card they create.
pub async fn create(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    AppMultipart(multipart): AppMultipart,
) -> AppResult<(StatusCode, Json<DataResponse<BidCard>>)> {
    let mut submission = read_submission(multipart).await?;
    if let Some(user) = caller {
        submission.form.owner_id = Some(user.to_string());
    }

    let form = with_default_status(&submission.form, submission.mode);
    let details =
        validate(&form, &context(submission.mode)).map_err(CoreError::InvalidFields)?;
    let card = state.bid_cards.create(details, submission.files).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: card })))
}

/// PUT /api/bid-cards/{id}
///
/// Multipart: `data` (the full form), `mode`, `removedMedia`, `files`.
pub async fn update(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    AppPath(id): AppPath<EntityId>,
    AppMultipart(multipart): AppMultipart,
) -> AppResult<Json<DataResponse<BidCard>>> {
    let mut submission = read_submission(multipart).await?;
    if submission.form.owner_id.is_none() {
        submission.form.owner_id = caller.map(|u| u.to_string());
    }

    let form = with_default_status(&submission.form, submission.mode);
    let details = validate(&form, &context(submission.mode).for_update())
        .map_err(CoreError::InvalidFields)?;
    let card = state
        .bid_cards
        .update(id, details, submission.files, submission.removed_media)
        .await?;
    Ok(Json(DataResponse { data: card }))
}

#[derive(Debug, Serialize)]
pub struct StepValidation {
    pub step: usize,
    pub name: WizardStep,
    pub label: &'static str,
    pub valid: bool,
    pub violations: Vec<FieldViolation>,
}

/// POST /api/bid-cards/validate?step=
///
/// Checks the fields one wizard step owns. The media step is checked by the
/// client against the same limits before upload, so only form fields are
/// considered here.
pub async fn validate_step(
    AppQuery(params): AppQuery<StepParams>,
    AppJson(form): AppJson<BidCardForm>,
) -> AppResult<Json<StepValidation>> {
    let step = parse_step(params.step)?;
    let violations = step_violations(&form, step, Utc::now(), true);
    Ok(Json(StepValidation {
        step: step.index(),
        name: step,
        label: step.label(),
        valid: violations.is_empty(),
        violations,
    }))
}
