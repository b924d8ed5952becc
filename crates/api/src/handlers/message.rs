//! Handlers for contractor lists and message threads under `/projects`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use instabids_core::messaging::{
    ContractorSummary, Message, MessageAttachment, NewMessage, ThreadMessage,
};
use instabids_core::types::EntityId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, CurrentUser};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// GET /api/projects/{project_id}/contractors
pub async fn contractors(
    State(state): State<AppState>,
    AppPath(project_id): AppPath<EntityId>,
) -> AppResult<Json<DataResponse<Vec<ContractorSummary>>>> {
    let list = state.messages.contractors(project_id).await?;
    Ok(Json(DataResponse { data: list }))
}

/// GET /api/projects/{project_id}/contractors/{contractor_id}/messages
///
/// Messages come back oldest first, labeled for the calling user.
pub async fn thread(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath((project_id, contractor_id)): AppPath<(EntityId, EntityId)>,
) -> AppResult<Json<DataResponse<Vec<ThreadMessage>>>> {
    let messages = state
        .messages
        .thread(project_id, contractor_id, user.user_id)
        .await?;
    Ok(Json(DataResponse { data: messages }))
}

/// POST /api/projects/{project_id}/contractors/{contractor_id}/messages
pub async fn send(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath((project_id, contractor_id)): AppPath<(EntityId, EntityId)>,
    AppJson(input): AppJson<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Message>>)> {
    let message = state
        .messages
        .send(NewMessage {
            project_id,
            contractor_id,
            sender_id: user.user_id,
            content: input.content,
            attachments: input.attachments,
            metadata: input.metadata,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}
