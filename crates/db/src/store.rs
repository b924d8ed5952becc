//! Postgres-backed implementations of the core collaborator traits.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use instabids_core::admin::{Identifier, TableDefinition, TableQuery};
use instabids_core::bid_card::{BidCard, BidCardDetails, MediaAttachment, NewMedia};
use instabids_core::messaging::{ContractorSummary, Message, NewMessage};
use instabids_core::persistence::{AdminTables, BidCardStore, MessageStore, StoreError, StoreResult};
use instabids_core::types::EntityId;

use crate::models::bid_card::BidCardRow;
use crate::repositories::{AdminTableRepo, BidCardMediaRepo, BidCardRepo, ContractorBidRepo, MessageRepo};
use crate::DbPool;

/// Map a sqlx error onto the collaborator error.
pub fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) => StoreError::Backend(db.message().to_string()),
        other => StoreError::Backend(other.to_string()),
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Load media for `rows` in one query and assemble the cards.
    async fn with_media(&self, rows: Vec<BidCardRow>) -> StoreResult<Vec<BidCard>> {
        let ids: Vec<EntityId> = rows.iter().map(|r| r.id).collect();
        let mut media: HashMap<EntityId, Vec<MediaAttachment>> = HashMap::new();
        for row in BidCardMediaRepo::list_for_cards(&self.pool, &ids)
            .await
            .map_err(store_error)?
        {
            media.entry(row.bid_card_id).or_default().push(row.into());
        }
        rows.into_iter()
            .map(|row| {
                let attached = media.remove(&row.id).unwrap_or_default();
                row.into_bid_card(attached)
            })
            .collect()
    }

    async fn one_with_media(&self, row: BidCardRow) -> StoreResult<BidCard> {
        self.with_media(vec![row])
            .await?
            .pop()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl BidCardStore for PgStore {
    async fn find(&self, id: EntityId) -> StoreResult<BidCard> {
        let row = BidCardRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .ok_or(StoreError::NotFound)?;
        self.one_with_media(row).await
    }

    async fn list(&self, owner: Option<EntityId>, limit: i64, offset: i64) -> StoreResult<Vec<BidCard>> {
        let rows = BidCardRepo::list(&self.pool, owner, limit, offset)
            .await
            .map_err(store_error)?;
        self.with_media(rows).await
    }

    async fn insert(&self, details: &BidCardDetails, media: &[NewMedia]) -> StoreResult<BidCard> {
        let row = BidCardRepo::create(&self.pool, details, media)
            .await
            .map_err(store_error)?;
        self.one_with_media(row).await
    }

    async fn update(
        &self,
        id: EntityId,
        details: &BidCardDetails,
        append: &[NewMedia],
        remove: &[EntityId],
    ) -> StoreResult<BidCard> {
        let row = BidCardRepo::update(&self.pool, id, details, append, remove)
            .await
            .map_err(store_error)?
            .ok_or(StoreError::NotFound)?;
        self.one_with_media(row).await
    }
}

#[async_trait]
impl MessageStore for PgStore {
    async fn thread(&self, project_id: EntityId, contractor_id: EntityId) -> StoreResult<Vec<Message>> {
        let rows = MessageRepo::list_thread(&self.pool, project_id, contractor_id)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn insert(&self, message: &NewMessage) -> StoreResult<Message> {
        MessageRepo::create(&self.pool, message)
            .await
            .map(Message::from)
            .map_err(store_error)
    }

    async fn contractors(&self, project_id: EntityId) -> StoreResult<Vec<ContractorSummary>> {
        ContractorBidRepo::list_for_project(&self.pool, project_id)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|row| row.into_summary())
            .collect()
    }
}

#[async_trait]
impl AdminTables for PgStore {
    async fn insert(&self, table: &Identifier, data: &Map<String, Value>) -> StoreResult<Value> {
        AdminTableRepo::insert(&self.pool, table, data)
            .await
            .map_err(store_error)
    }

    async fn update(
        &self,
        table: &Identifier,
        data: &Map<String, Value>,
        filters: &Map<String, Value>,
    ) -> StoreResult<Vec<Value>> {
        AdminTableRepo::update(&self.pool, table, data, filters)
            .await
            .map_err(store_error)
    }

    async fn delete(&self, table: &Identifier, filters: &Map<String, Value>) -> StoreResult<Vec<Value>> {
        AdminTableRepo::delete(&self.pool, table, filters)
            .await
            .map_err(store_error)
    }

    async fn create_table(&self, definition: &TableDefinition) -> StoreResult<()> {
        AdminTableRepo::create_table(&self.pool, definition)
            .await
            .map_err(store_error)
    }

    async fn select(&self, query: &TableQuery) -> StoreResult<Vec<Value>> {
        AdminTableRepo::select(&self.pool, query)
            .await
            .map_err(store_error)
    }
}
