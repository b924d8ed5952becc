//! Repository for the `bid_card_media` table.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use instabids_core::bid_card::NewMedia;
use instabids_core::types::EntityId;

use crate::models::bid_card::BidCardMediaRow;

/// Column list for bid_card_media queries.
const COLUMNS: &str = "id, bid_card_id, media_type, filename, size, url, position";

/// Media rows for bid cards. Writes take a connection so they can join the
/// card's transaction.
pub struct BidCardMediaRepo;

impl BidCardMediaRepo {
    /// All media for the given cards, ordered by card then position.
    pub async fn list_for_cards(
        pool: &PgPool,
        bid_card_ids: &[EntityId],
    ) -> Result<Vec<BidCardMediaRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bid_card_media
             WHERE bid_card_id = ANY($1)
             ORDER BY bid_card_id, position"
        );
        sqlx::query_as::<_, BidCardMediaRow>(&query)
            .bind(bid_card_ids)
            .fetch_all(pool)
            .await
    }

    /// Insert `media` with positions starting at `start`.
    pub async fn insert_many(
        conn: &mut PgConnection,
        bid_card_id: EntityId,
        media: &[NewMedia],
        start: i32,
    ) -> Result<(), sqlx::Error> {
        for (offset, m) in media.iter().enumerate() {
            sqlx::query(
                "INSERT INTO bid_card_media (id, bid_card_id, media_type, filename, size, url, position)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(Uuid::now_v7())
            .bind(bid_card_id)
            .bind(&m.media_type)
            .bind(&m.filename)
            .bind(m.size)
            .bind(&m.url)
            .bind(start + offset as i32)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Delete the listed media of one card. Returns the number removed.
    pub async fn delete_ids(
        conn: &mut PgConnection,
        bid_card_id: EntityId,
        ids: &[EntityId],
    ) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM bid_card_media WHERE bid_card_id = $1 AND id = ANY($2)")
            .bind(bid_card_id)
            .bind(ids)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Close gaps left by deletions so positions run 0..n. Returns n.
    pub async fn renumber(conn: &mut PgConnection, bid_card_id: EntityId) -> Result<i32, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE bid_card_media m SET position = (r.rn - 1)::int
             FROM (
                SELECT id, ROW_NUMBER() OVER (ORDER BY position, created_at) AS rn
                FROM bid_card_media WHERE bid_card_id = $1
             ) r
             WHERE m.id = r.id",
        )
        .bind(bid_card_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() as i32)
    }
}
