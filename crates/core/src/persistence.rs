//! Collaborator seams for storage and records.
//!
//! Services depend on these traits only. Postgres and object-storage
//! implementations live in `instabids-db` and `instabids-storage`; the
//! in-memory doubles in [`crate::memory`] back the tests and the
//! development mock API.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::admin::{Identifier, TableDefinition, TableQuery};
use crate::bid_card::{BidCard, BidCardDetails, MediaUpload, NewMedia};
use crate::messaging::{ContractorSummary, Message, NewMessage};
use crate::types::EntityId;

/// Failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait BidCardStore: Send + Sync {
    async fn find(&self, id: EntityId) -> StoreResult<BidCard>;

    /// Newest first. `owner` narrows to one homeowner's cards.
    async fn list(&self, owner: Option<EntityId>, limit: i64, offset: i64) -> StoreResult<Vec<BidCard>>;

    /// Write a new card with `media` attached in the given order.
    async fn insert(&self, details: &BidCardDetails, media: &[NewMedia]) -> StoreResult<BidCard>;

    /// Replace the card's fields, drop the media in `remove`, and append
    /// `append` after the media that stays.
    async fn update(
        &self,
        id: EntityId,
        details: &BidCardDetails,
        append: &[NewMedia],
        remove: &[EntityId],
    ) -> StoreResult<BidCard>;
}

#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store `upload` under `key` and return its public URL.
    async fn upload(&self, key: &str, upload: &MediaUpload) -> StoreResult<String>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Every message between a project and one contractor, oldest first.
    async fn thread(&self, project_id: EntityId, contractor_id: EntityId) -> StoreResult<Vec<Message>>;

    async fn insert(&self, message: &NewMessage) -> StoreResult<Message>;

    async fn contractors(&self, project_id: EntityId) -> StoreResult<Vec<ContractorSummary>>;
}

/// Generic row access for the admin UI. Rows travel as JSON objects.
#[async_trait]
pub trait AdminTables: Send + Sync {
    async fn insert(&self, table: &Identifier, data: &Map<String, Value>) -> StoreResult<Value>;

    /// Update every row whose columns equal `filters`; returns the new rows.
    async fn update(
        &self,
        table: &Identifier,
        data: &Map<String, Value>,
        filters: &Map<String, Value>,
    ) -> StoreResult<Vec<Value>>;

    /// Delete every row whose columns equal `filters`; returns the old rows.
    async fn delete(&self, table: &Identifier, filters: &Map<String, Value>) -> StoreResult<Vec<Value>>;

    async fn create_table(&self, definition: &TableDefinition) -> StoreResult<()>;

    async fn select(&self, query: &TableQuery) -> StoreResult<Vec<Value>>;
}
