//! Repository for the `bid_cards` table.

use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};

use instabids_core::bid_card::{BidCardDetails, NewMedia};
use instabids_core::types::EntityId;
use uuid::Uuid;

use crate::models::bid_card::BidCardRow;
use crate::repositories::BidCardMediaRepo;

/// Column list for bid_cards queries.
const COLUMNS: &str = "id, owner_id, title, description, \
    job_type_id, job_category_id, property_type, service_type, \
    status, bid_status, job_size, property_size, square_footage, \
    zip_code, city, state, location, \
    timeline_horizon_id, timeline_start, timeline_end, bid_deadline, \
    budget_min, budget_max, group_bidding_enabled, terms_accepted, marketing_consent, \
    created_at, updated_at";

/// Bind the editable columns as `$2..$26`, in the order of the INSERT and
/// UPDATE statements below.
fn bind_details<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    d: &'q BidCardDetails,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    query
        .bind(d.owner_id)
        .bind(&d.title)
        .bind(&d.description)
        .bind(&d.job_type_id)
        .bind(&d.job_category_id)
        .bind(&d.property_type)
        .bind(&d.service_type)
        .bind(d.status.as_str())
        .bind(d.bid_status.as_str())
        .bind(&d.job_size)
        .bind(&d.property_size)
        .bind(d.square_footage)
        .bind(&d.zip_code)
        .bind(&d.city)
        .bind(&d.state)
        .bind(d.location.as_ref().map(Json))
        .bind(d.timeline_horizon_id.map(|h| h.as_str()))
        .bind(d.timeline_start)
        .bind(d.timeline_end)
        .bind(d.bid_deadline)
        .bind(d.budget_min)
        .bind(d.budget_max)
        .bind(d.group_bidding_enabled)
        .bind(d.terms_accepted)
        .bind(d.marketing_consent)
}

/// Provides CRUD operations for bid cards. Media rows are written in the
/// same transaction as the card.
pub struct BidCardRepo;

impl BidCardRepo {
    /// Find a bid card by its ID.
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<BidCardRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bid_cards WHERE id = $1");
        sqlx::query_as::<_, BidCardRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List bid cards, newest first, optionally for one owner.
    pub async fn list(
        pool: &PgPool,
        owner_id: Option<EntityId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BidCardRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bid_cards
             WHERE ($1::uuid IS NULL OR owner_id = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, BidCardRow>(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Insert a bid card and its media, returning the created row.
    pub async fn create(
        pool: &PgPool,
        details: &BidCardDetails,
        media: &[NewMedia],
    ) -> Result<BidCardRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO bid_cards (id, owner_id, title, description,
                job_type_id, job_category_id, property_type, service_type,
                status, bid_status, job_size, property_size, square_footage,
                zip_code, city, state, location,
                timeline_horizon_id, timeline_start, timeline_end, bid_deadline,
                budget_min, budget_max, group_bidding_enabled, terms_accepted, marketing_consent)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                     $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
             RETURNING {COLUMNS}"
        );
        let row = bind_details(sqlx::query_as::<_, BidCardRow>(&query).bind(Uuid::now_v7()), details)
            .fetch_one(&mut *tx)
            .await?;

        BidCardMediaRepo::insert_many(&mut tx, row.id, media, 0).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Replace a bid card's fields, remove `remove` media, and append
    /// `append` after the remaining media. Returns `None` if the card does
    /// not exist.
    pub async fn update(
        pool: &PgPool,
        id: EntityId,
        details: &BidCardDetails,
        append: &[NewMedia],
        remove: &[EntityId],
    ) -> Result<Option<BidCardRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE bid_cards SET
                owner_id = $2, title = $3, description = $4,
                job_type_id = $5, job_category_id = $6, property_type = $7, service_type = $8,
                status = $9, bid_status = $10, job_size = $11, property_size = $12,
                square_footage = $13, zip_code = $14, city = $15, state = $16, location = $17,
                timeline_horizon_id = $18, timeline_start = $19, timeline_end = $20,
                bid_deadline = $21, budget_min = $22, budget_max = $23,
                group_bidding_enabled = $24, terms_accepted = $25, marketing_consent = $26
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(row) = bind_details(sqlx::query_as::<_, BidCardRow>(&query).bind(id), details)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        BidCardMediaRepo::delete_ids(&mut tx, id, remove).await?;
        let kept = BidCardMediaRepo::renumber(&mut tx, id).await?;
        BidCardMediaRepo::insert_many(&mut tx, id, append, kept).await?;
        tx.commit().await?;
        Ok(Some(row))
    }
}
