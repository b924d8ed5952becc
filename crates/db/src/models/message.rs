//! Message rows.

use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

use instabids_core::messaging::{Message, MessageAttachment};
use instabids_core::types::{EntityId, Timestamp};

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: EntityId,
    pub project_id: EntityId,
    pub contractor_id: EntityId,
    pub sender_id: EntityId,
    pub content: String,
    pub attachments: Json<Vec<MessageAttachment>>,
    pub metadata: Value,
    pub created_at: Timestamp,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            contractor_id: row.contractor_id,
            sender_id: row.sender_id,
            content: row.content,
            timestamp: row.created_at,
            attachments: row.attachments.0,
            metadata: row.metadata,
        }
    }
}
