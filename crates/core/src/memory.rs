//! In-memory collaborators.
//!
//! These implement the [`persistence`](crate::persistence) traits on top of
//! `tokio::sync::RwLock`ed collections. They back the unit and router tests
//! and the development-only mock bid card API. Nothing here is durable.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::admin::{ColumnSpec, ColumnType, Identifier, TableDefinition, TableQuery};
use crate::bid_card::{BidCard, BidCardDetails, MediaAttachment, MediaUpload, NewMedia};
use crate::messaging::{ContractorSummary, Message, NewMessage};
use crate::persistence::{
    AdminTables, BidCardStore, MediaStorage, MessageStore, StoreError, StoreResult,
};
use crate::types::EntityId;

fn injected() -> StoreError {
    StoreError::Backend("injected failure".into())
}

// ---------------------------------------------------------------------------
// Bid cards
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InMemoryBidCards {
    cards: RwLock<Vec<BidCard>>,
    fail_writes: bool,
}

impl InMemoryBidCards {
    /// A store whose inserts and updates always fail.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.cards.read().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.cards.read().await.len()
    }
}

fn attach(media: &[NewMedia], start: usize) -> impl Iterator<Item = MediaAttachment> + '_ {
    media.iter().enumerate().map(move |(i, m)| MediaAttachment {
        id: Uuid::new_v4(),
        media_type: m.media_type.clone(),
        filename: m.filename.clone(),
        size: m.size,
        url: m.url.clone(),
        position: (start + i) as i32,
    })
}

#[async_trait]
impl BidCardStore for InMemoryBidCards {
    async fn find(&self, id: EntityId) -> StoreResult<BidCard> {
        self.cards
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, owner: Option<EntityId>, limit: i64, offset: i64) -> StoreResult<Vec<BidCard>> {
        let cards = self.cards.read().await;
        Ok(cards
            .iter()
            .rev()
            .filter(|c| owner.map_or(true, |o| c.details.owner_id == o))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn insert(&self, details: &BidCardDetails, media: &[NewMedia]) -> StoreResult<BidCard> {
        if self.fail_writes {
            return Err(injected());
        }
        let now = Utc::now();
        let card = BidCard {
            id: Uuid::new_v4(),
            details: details.clone(),
            media: attach(media, 0).collect(),
            created_at: now,
            updated_at: now,
        };
        self.cards.write().await.push(card.clone());
        Ok(card)
    }

    async fn update(
        &self,
        id: EntityId,
        details: &BidCardDetails,
        append: &[NewMedia],
        remove: &[EntityId],
    ) -> StoreResult<BidCard> {
        if self.fail_writes {
            return Err(injected());
        }
        let mut cards = self.cards.write().await;
        let card = cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound)?;

        card.details = details.clone();
        card.media.retain(|m| !remove.contains(&m.id));
        let kept = card.media.len();
        card.media.extend(attach(append, kept));
        for (i, m) in card.media.iter_mut().enumerate() {
            m.position = i as i32;
        }
        card.updated_at = Utc::now();
        Ok(card.clone())
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct InMemoryMedia {
    base_url: String,
    objects: RwLock<HashMap<String, Vec<u8>>>,
    /// Fail every upload once this many objects are stored.
    fail_after: Option<usize>,
}

impl Default for InMemoryMedia {
    fn default() -> Self {
        Self {
            base_url: "memory://media".to_string(),
            objects: RwLock::default(),
            fail_after: None,
        }
    }
}

impl InMemoryMedia {
    pub fn failing_after(stored: usize) -> Self {
        Self {
            fail_after: Some(stored),
            ..Default::default()
        }
    }

    pub async fn stored_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl MediaStorage for InMemoryMedia {
    async fn upload(&self, key: &str, upload: &MediaUpload) -> StoreResult<String> {
        let mut objects = self.objects.write().await;
        if self.fail_after.is_some_and(|n| objects.len() >= n) {
            return Err(injected());
        }
        objects.insert(key.to_string(), upload.bytes.clone());
        Ok(format!("{}/{key}", self.base_url))
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InMemoryMessages {
    messages: RwLock<Vec<Message>>,
    contractors: RwLock<HashMap<EntityId, Vec<ContractorSummary>>>,
    fail: bool,
}

impl InMemoryMessages {
    /// A store where every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Register a contractor bid on `project_id`.
    pub async fn add_contractor(&self, project_id: EntityId, contractor: ContractorSummary) {
        self.contractors
            .write()
            .await
            .entry(project_id)
            .or_default()
            .push(contractor);
    }

    /// Store a message as-is, keeping its id and timestamp.
    pub async fn seed(&self, message: Message) {
        self.messages.write().await.push(message);
    }
}

#[async_trait]
impl MessageStore for InMemoryMessages {
    async fn thread(&self, project_id: EntityId, contractor_id: EntityId) -> StoreResult<Vec<Message>> {
        if self.fail {
            return Err(injected());
        }
        let mut thread: Vec<Message> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.project_id == project_id && m.contractor_id == contractor_id)
            .cloned()
            .collect();
        thread.sort_by_key(|m| m.timestamp);
        Ok(thread)
    }

    async fn insert(&self, message: &NewMessage) -> StoreResult<Message> {
        if self.fail {
            return Err(injected());
        }
        let stored = Message {
            id: Uuid::new_v4(),
            project_id: message.project_id,
            contractor_id: message.contractor_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            timestamp: Utc::now(),
            attachments: message.attachments.clone(),
            metadata: message.metadata.clone(),
        };
        self.messages.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn contractors(&self, project_id: EntityId) -> StoreResult<Vec<ContractorSummary>> {
        if self.fail {
            return Err(injected());
        }
        Ok(self
            .contractors
            .read()
            .await
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Admin tables
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Table {
    columns: Vec<ColumnSpec>,
    rows: Vec<Map<String, Value>>,
    next_serial: i64,
}

impl Table {
    fn check_columns<'a>(&self, table: &Identifier, keys: impl Iterator<Item = &'a String>) -> StoreResult<()> {
        for key in keys {
            if !self.columns.iter().any(|c| c.name.as_str() == key) {
                return Err(StoreError::Backend(format!(
                    "column \"{key}\" of relation \"{table}\" does not exist"
                )));
            }
        }
        Ok(())
    }
}

fn matches_filters(row: &Map<String, Value>, filters: &Map<String, Value>) -> bool {
    filters
        .iter()
        .all(|(k, v)| row.get(k).unwrap_or(&Value::Null) == v)
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Admin tables kept in memory. Column types are not enforced beyond serial
/// defaults and `NOT NULL`.
#[derive(Debug, Default)]
pub struct InMemoryTables {
    tables: RwLock<HashMap<String, Table>>,
}

fn missing_table(table: &Identifier) -> StoreError {
    StoreError::Backend(format!("relation \"{table}\" does not exist"))
}

#[async_trait]
impl AdminTables for InMemoryTables {
    async fn insert(&self, table: &Identifier, data: &Map<String, Value>) -> StoreResult<Value> {
        let mut tables = self.tables.write().await;
        let t = tables
            .get_mut(table.as_str())
            .ok_or_else(|| missing_table(table))?;
        t.check_columns(table, data.keys())?;

        let mut row = Map::new();
        for col in &t.columns {
            let value = match data.get(col.name.as_str()) {
                Some(v) => v.clone(),
                None if matches!(col.column_type, ColumnType::Serial | ColumnType::BigSerial) => {
                    t.next_serial += 1;
                    Value::from(t.next_serial)
                }
                None => Value::Null,
            };
            if value.is_null() && !col.nullable {
                return Err(StoreError::Backend(format!(
                    "null value in column \"{}\" violates not-null constraint",
                    col.name
                )));
            }
            row.insert(col.name.as_str().to_string(), value);
        }
        t.rows.push(row.clone());
        Ok(Value::Object(row))
    }

    async fn update(
        &self,
        table: &Identifier,
        data: &Map<String, Value>,
        filters: &Map<String, Value>,
    ) -> StoreResult<Vec<Value>> {
        let mut tables = self.tables.write().await;
        let t = tables
            .get_mut(table.as_str())
            .ok_or_else(|| missing_table(table))?;
        t.check_columns(table, data.keys().chain(filters.keys()))?;

        let mut updated = Vec::new();
        for row in t.rows.iter_mut().filter(|r| matches_filters(r, filters)) {
            for (k, v) in data {
                row.insert(k.clone(), v.clone());
            }
            updated.push(Value::Object(row.clone()));
        }
        Ok(updated)
    }

    async fn delete(&self, table: &Identifier, filters: &Map<String, Value>) -> StoreResult<Vec<Value>> {
        let mut tables = self.tables.write().await;
        let t = tables
            .get_mut(table.as_str())
            .ok_or_else(|| missing_table(table))?;
        t.check_columns(table, filters.keys())?;

        let (deleted, kept): (Vec<_>, Vec<_>) = t
            .rows
            .drain(..)
            .partition(|r| matches_filters(r, filters));
        t.rows = kept;
        Ok(deleted.into_iter().map(Value::Object).collect())
    }

    async fn create_table(&self, definition: &TableDefinition) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.contains_key(definition.name.as_str()) {
            return Err(StoreError::Backend(format!(
                "relation \"{}\" already exists",
                definition.name
            )));
        }
        tables.insert(
            definition.name.as_str().to_string(),
            Table {
                columns: definition.columns.clone(),
                rows: Vec::new(),
                next_serial: 0,
            },
        );
        Ok(())
    }

    async fn select(&self, query: &TableQuery) -> StoreResult<Vec<Value>> {
        let tables = self.tables.read().await;
        let t = tables
            .get(query.table.as_str())
            .ok_or_else(|| missing_table(&query.table))?;

        let mut referenced: Vec<String> = query.columns.iter().map(|c| c.as_str().to_string()).collect();
        if let Some(order) = &query.order_by {
            referenced.push(order.column.as_str().to_string());
        }
        t.check_columns(&query.table, referenced.iter())?;

        let mut rows: Vec<&Map<String, Value>> = t.rows.iter().collect();
        if let Some(order) = &query.order_by {
            let key = order.column.as_str();
            rows.sort_by(|a, b| {
                let ord = compare_values(
                    a.get(key).unwrap_or(&Value::Null),
                    b.get(key).unwrap_or(&Value::Null),
                );
                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        Ok(rows
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|row| {
                if query.columns.is_empty() {
                    return Value::Object(row.clone());
                }
                let projected: Map<String, Value> = query
                    .columns
                    .iter()
                    .map(|c| {
                        let v = row.get(c.as_str()).cloned().unwrap_or(Value::Null);
                        (c.as_str().to_string(), v)
                    })
                    .collect();
                Value::Object(projected)
            })
            .collect())
    }
}
