use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::bid_card::schema::fields;
use crate::bid_card::{validate_media, BidCard, BidCardDetails, MediaUpload, NewMedia};
use crate::error::{CoreError, PersistenceError};
use crate::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use crate::persistence::{BidCardStore, MediaStorage, StoreError};
use crate::types::EntityId;
use crate::validation::Violations;
use crate::wizard::SubmissionHandler;

const ENTITY: &str = "BidCard";

/// Creates, reads and edits bid cards.
///
/// Media is uploaded one file at a time before the record is written. If a
/// later step fails, the URLs already stored are reported in the error so the
/// caller knows which part to retry.
#[derive(Clone)]
pub struct BidCardService {
    store: Arc<dyn BidCardStore>,
    media: Arc<dyn MediaStorage>,
}

impl BidCardService {
    pub fn new(store: Arc<dyn BidCardStore>, media: Arc<dyn MediaStorage>) -> Self {
        Self { store, media }
    }

    pub async fn get(&self, id: EntityId) -> Result<BidCard, CoreError> {
        self.store.find(id).await.map_err(|e| {
            if !matches!(e, StoreError::NotFound) {
                tracing::error!(bid_card_id = %id, error = %e, "Failed to load bid card");
            }
            CoreError::from_store(ENTITY, id, e)
        })
    }

    pub async fn list(
        &self,
        owner: Option<EntityId>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<BidCard>, CoreError> {
        let limit = clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT);
        let offset = clamp_offset(offset);
        self.store.list(owner, limit, offset).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to list bid cards");
            CoreError::from(PersistenceError::Unavailable(e.to_string()))
        })
    }

    /// Upload `files` in order, then write the card.
    pub async fn create(
        &self,
        details: BidCardDetails,
        files: Vec<MediaUpload>,
    ) -> Result<BidCard, CoreError> {
        let violations = validate_media(&files, 0);
        if !violations.is_empty() {
            return Err(CoreError::InvalidFields(violations));
        }

        let media = self.upload_all(details.owner_id, &files).await?;
        match self.store.insert(&details, &media).await {
            Ok(card) => {
                tracing::info!(
                    bid_card_id = %card.id,
                    owner_id = %card.details.owner_id,
                    status = card.details.status.as_str(),
                    media_count = card.media.len(),
                    "Bid card created",
                );
                Ok(card)
            }
            Err(e) => Err(record_write_failed(None, &media, e)),
        }
    }

    /// Replace the card's fields, drop `removed_media`, and append `files`
    /// after the media that stays.
    pub async fn update(
        &self,
        id: EntityId,
        details: BidCardDetails,
        files: Vec<MediaUpload>,
        removed_media: Vec<EntityId>,
    ) -> Result<BidCard, CoreError> {
        let existing = self.get(id).await?;

        let mut v = Violations::default();
        if details.owner_id != existing.details.owner_id {
            v.push(
                fields::OWNER_ID,
                "immutable",
                "ownerId cannot be changed after creation",
            );
        }
        if !existing.details.status.can_transition_to(details.status) {
            v.push(
                fields::STATUS,
                "invalid_transition",
                format!(
                    "status cannot change from {} to {}",
                    existing.details.status.as_str(),
                    details.status.as_str()
                ),
            );
        }
        for media_id in &removed_media {
            if !existing.media.iter().any(|m| m.id == *media_id) {
                v.push(
                    fields::MEDIA,
                    "unknown_media",
                    format!("media {media_id} is not attached to this bid card"),
                );
            }
        }
        let kept = existing
            .media
            .iter()
            .filter(|m| !removed_media.contains(&m.id))
            .count();
        v.extend(validate_media(&files, kept));
        v.finish().map_err(CoreError::InvalidFields)?;

        let media = self.upload_all(details.owner_id, &files).await?;
        match self.store.update(id, &details, &media, &removed_media).await {
            Ok(card) => {
                tracing::info!(
                    bid_card_id = %id,
                    status = card.details.status.as_str(),
                    added_media = media.len(),
                    removed_media = removed_media.len(),
                    "Bid card updated",
                );
                Ok(card)
            }
            Err(StoreError::NotFound) => Err(CoreError::not_found(ENTITY, id)),
            Err(e) => Err(record_write_failed(Some(id), &media, e)),
        }
    }

    /// Sequential uploads. Stops at the first failure.
    async fn upload_all(
        &self,
        owner: EntityId,
        files: &[MediaUpload],
    ) -> Result<Vec<NewMedia>, PersistenceError> {
        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let key = object_key(owner, file);
            match self.media.upload(&key, file).await {
                Ok(url) => {
                    tracing::debug!(key = %key, size = file.size(), "Media uploaded");
                    stored.push(NewMedia {
                        media_type: file.content_type.clone(),
                        filename: file.filename.clone(),
                        size: file.size() as i64,
                        url,
                    });
                }
                Err(e) => {
                    tracing::error!(
                        filename = %file.filename,
                        uploaded = stored.len(),
                        error = %e,
                        "Media upload failed",
                    );
                    return Err(PersistenceError::UploadFailed {
                        filename: file.filename.clone(),
                        orphaned_media: stored.into_iter().map(|m| m.url).collect(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(stored)
    }
}

/// Storage key for an upload: `bid-cards/{owner}/{random}.{ext}`.
fn object_key(owner: EntityId, file: &MediaUpload) -> String {
    match file.extension() {
        Some(ext) => format!("bid-cards/{owner}/{}.{ext}", Uuid::new_v4()),
        None => format!("bid-cards/{owner}/{}", Uuid::new_v4()),
    }
}

fn record_write_failed(id: Option<EntityId>, media: &[NewMedia], err: StoreError) -> CoreError {
    let orphaned: Vec<String> = media.iter().map(|m| m.url.clone()).collect();
    tracing::error!(
        bid_card_id = ?id,
        orphaned_media = orphaned.len(),
        error = %err,
        "Bid card record write failed",
    );
    if orphaned.is_empty() {
        PersistenceError::Unavailable(err.to_string()).into()
    } else {
        PersistenceError::RecordWriteFailed {
            orphaned_media: orphaned,
            reason: err.to_string(),
        }
        .into()
    }
}

#[async_trait]
impl SubmissionHandler for BidCardService {
    async fn create(&self, details: BidCardDetails, files: Vec<MediaUpload>) -> Result<BidCard, CoreError> {
        BidCardService::create(self, details, files).await
    }

    async fn update(
        &self,
        id: EntityId,
        details: BidCardDetails,
        files: Vec<MediaUpload>,
        removed_media: Vec<EntityId>,
    ) -> Result<BidCard, CoreError> {
        BidCardService::update(self, id, details, files, removed_media).await
    }
}
