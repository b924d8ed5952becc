//! Multipart bid card submissions.
//!
//! Fields: `data` (JSON bid card form, required), `mode` (`submit` or
//! `draft`, default `submit`), `files` (repeated), and on edits
//! `removedMedia` (JSON array of media ids).

use axum::extract::multipart::Field;
use axum::extract::Multipart;

use instabids_core::bid_card::{BidCardForm, MediaUpload, SubmissionMode};
use instabids_core::types::EntityId;

use crate::error::{AppError, AppResult};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug)]
pub struct BidCardSubmission {
    pub form: BidCardForm,
    pub mode: SubmissionMode,
    pub files: Vec<MediaUpload>,
    pub removed_media: Vec<EntityId>,
}

pub async fn read_submission(mut multipart: Multipart) -> AppResult<BidCardSubmission> {
    let mut form: Option<BidCardForm> = None;
    let mut mode = SubmissionMode::Submit;
    let mut files = Vec::new();
    let mut removed_media = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "data" => {
                let text = field_text(field).await?;
                let parsed = serde_json::from_str(&text)
                    .map_err(|e| AppError::BadRequest(format!("Invalid 'data' field: {e}")))?;
                form = Some(parsed);
            }
            "mode" => {
                mode = match field_text(field).await?.trim() {
                    "submit" | "" => SubmissionMode::Submit,
                    "draft" => SubmissionMode::Draft,
                    other => {
                        return Err(AppError::BadRequest(format!(
                            "Invalid 'mode' value '{other}'. Expected 'submit' or 'draft'"
                        )))
                    }
                };
            }
            "files" | "files[]" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                files.push(MediaUpload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "removedMedia" => {
                let text = field_text(field).await?;
                removed_media = serde_json::from_str(&text).map_err(|e| {
                    AppError::BadRequest(format!("Invalid 'removedMedia' field: {e}"))
                })?;
            }
            _ => {}
        }
    }

    let form = form.ok_or_else(|| AppError::BadRequest("Missing required 'data' field".into()))?;
    Ok(BidCardSubmission {
        form,
        mode,
        files,
        removed_media,
    })
}

async fn field_text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}
