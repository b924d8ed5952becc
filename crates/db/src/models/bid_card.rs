//! Bid card and bid card media rows.

use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::FromRow;

use instabids_core::bid_card::{
    BidCard, BidCardDetails, BidStatus, ListingStatus, Location, MediaAttachment, TimelineHorizon,
};
use instabids_core::persistence::StoreError;
use instabids_core::types::{EntityId, Timestamp};

/// A row from the `bid_cards` table.
#[derive(Debug, Clone, FromRow)]
pub struct BidCardRow {
    pub id: EntityId,
    pub owner_id: EntityId,
    pub title: String,
    pub description: String,
    pub job_type_id: Option<String>,
    pub job_category_id: Option<String>,
    pub property_type: Option<String>,
    pub service_type: Option<String>,
    pub status: String,
    pub bid_status: String,
    pub job_size: Option<String>,
    pub property_size: Option<String>,
    pub square_footage: Option<f64>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub location: Option<Json<Location>>,
    pub timeline_horizon_id: Option<String>,
    pub timeline_start: Option<NaiveDate>,
    pub timeline_end: Option<NaiveDate>,
    pub bid_deadline: Option<Timestamp>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub group_bidding_enabled: bool,
    pub terms_accepted: bool,
    pub marketing_consent: Option<bool>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `bid_card_media` table.
#[derive(Debug, Clone, FromRow)]
pub struct BidCardMediaRow {
    pub id: EntityId,
    pub bid_card_id: EntityId,
    pub media_type: String,
    pub filename: String,
    pub size: i64,
    pub url: String,
    pub position: i32,
}

impl From<BidCardMediaRow> for MediaAttachment {
    fn from(row: BidCardMediaRow) -> Self {
        Self {
            id: row.id,
            media_type: row.media_type,
            filename: row.filename,
            size: row.size,
            url: row.url,
            position: row.position,
        }
    }
}

fn corrupt(id: EntityId, err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("bid card {id} has an unreadable value: {err}"))
}

impl BidCardRow {
    /// Combine the row with its media (already in position order).
    pub fn into_bid_card(self, media: Vec<MediaAttachment>) -> Result<BidCard, StoreError> {
        let id = self.id;
        let status = ListingStatus::from_str_db(&self.status).map_err(|e| corrupt(id, e))?;
        let bid_status = BidStatus::from_str_db(&self.bid_status).map_err(|e| corrupt(id, e))?;
        let timeline_horizon_id = self
            .timeline_horizon_id
            .as_deref()
            .map(TimelineHorizon::from_str_db)
            .transpose()
            .map_err(|e| corrupt(id, e))?;

        Ok(BidCard {
            id,
            details: BidCardDetails {
                title: self.title,
                description: self.description,
                job_type_id: self.job_type_id,
                job_category_id: self.job_category_id,
                property_type: self.property_type,
                service_type: self.service_type,
                status,
                bid_status,
                job_size: self.job_size,
                property_size: self.property_size,
                square_footage: self.square_footage,
                zip_code: self.zip_code,
                city: self.city,
                state: self.state,
                location: self.location.map(|Json(loc)| loc),
                timeline_horizon_id,
                timeline_start: self.timeline_start,
                timeline_end: self.timeline_end,
                bid_deadline: self.bid_deadline,
                budget_min: self.budget_min,
                budget_max: self.budget_max,
                group_bidding_enabled: self.group_bidding_enabled,
                terms_accepted: self.terms_accepted,
                marketing_consent: self.marketing_consent,
                owner_id: self.owner_id,
            },
            media,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
