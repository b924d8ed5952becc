//! Repository for the `messages` table.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use instabids_core::messaging::NewMessage;
use instabids_core::types::EntityId;

use crate::models::message::MessageRow;

/// Column list for messages queries.
const COLUMNS: &str =
    "id, project_id, contractor_id, sender_id, content, attachments, metadata, created_at";

/// Messages are insert-only.
pub struct MessageRepo;

impl MessageRepo {
    /// Every message of one (project, contractor) thread, oldest first.
    pub async fn list_thread(
        pool: &PgPool,
        project_id: EntityId,
        contractor_id: EntityId,
    ) -> Result<Vec<MessageRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages
             WHERE project_id = $1 AND contractor_id = $2
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(project_id)
            .bind(contractor_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &NewMessage) -> Result<MessageRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages (id, project_id, contractor_id, sender_id, content, attachments, metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(Uuid::now_v7())
            .bind(input.project_id)
            .bind(input.contractor_id)
            .bind(input.sender_id)
            .bind(&input.content)
            .bind(Json(&input.attachments))
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }
}
