//! Development-only bid card API backed by in-memory doubles.
//!
//! Records live for the life of the process. Unknown ids still resolve to a
//! fabricated sample card so front-end work can proceed without data.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use instabids_core::bid_card::{
    validate, BidCard, BidCardDetails, BidCardForm, BidStatus, ListingStatus, MediaAttachment,
    MediaUpload, SubmissionMode, ValidationContext,
};
use instabids_core::error::CoreError;
use instabids_core::memory::{InMemoryBidCards, InMemoryMedia};
use instabids_core::pagination::MAX_LIMIT;
use instabids_core::services::BidCardService;
use instabids_core::types::{EntityId, Timestamp};
use instabids_core::wizard::with_default_status;

/// A card as the mock API returns it. The id is kept as text because the
/// mock answers any id, not only UUIDs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockBidCard {
    pub id: String,
    #[serde(flatten)]
    pub details: BidCardDetails,
    pub media: Vec<MediaAttachment>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MockBidCard {
    fn with_id(id: String, card: BidCard) -> Self {
        Self {
            id,
            details: card.details,
            media: card.media,
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

impl From<BidCard> for MockBidCard {
    fn from(card: BidCard) -> Self {
        Self::with_id(card.id.to_string(), card)
    }
}

#[derive(Clone)]
pub struct MockBidCards {
    service: BidCardService,
}

impl Default for MockBidCards {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBidCards {
    pub fn new() -> Self {
        Self {
            service: BidCardService::new(
                Arc::new(InMemoryBidCards::default()),
                Arc::new(InMemoryMedia::default()),
            ),
        }
    }

    /// Store a card with draft rules. The caller, when known, owns it;
    /// otherwise an anonymous owner is filled in.
    pub async fn create(
        &self,
        form: BidCardForm,
        files: Vec<MediaUpload>,
        caller: Option<EntityId>,
    ) -> Result<BidCard, CoreError> {
        let mut form = with_default_status(&form, SubmissionMode::Draft);
        match caller {
            Some(user) => form.owner_id = Some(user.to_string()),
            None if form.owner_id.is_none() => form.owner_id = Some(EntityId::nil().to_string()),
            None => {}
        }
        let details = validate(&form, &ValidationContext::draft(Utc::now()))
            .map_err(CoreError::InvalidFields)?;
        self.service.create(details, files).await
    }

    pub async fn list(&self) -> Result<Vec<BidCard>, CoreError> {
        self.service.list(None, Some(MAX_LIMIT), None).await
    }

    pub async fn get_or_fabricate(&self, id: EntityId) -> Result<BidCard, CoreError> {
        match self.service.get(id).await {
            Err(CoreError::NotFound { .. }) => Ok(fabricate(id)),
            other => other,
        }
    }

    /// Resolve any path id. Ids that are not UUIDs can never be stored, so
    /// they get the sample card under the id that was asked for.
    pub async fn lookup(&self, raw_id: &str) -> Result<MockBidCard, CoreError> {
        match EntityId::parse_str(raw_id) {
            Ok(id) => self.get_or_fabricate(id).await.map(MockBidCard::from),
            Err(_) => Ok(MockBidCard::with_id(
                raw_id.to_string(),
                fabricate(EntityId::nil()),
            )),
        }
    }
}

fn fabricate(id: EntityId) -> BidCard {
    let now = Utc::now();
    BidCard {
        id,
        details: BidCardDetails {
            title: "Sample kitchen remodel".into(),
            description: "Replace cabinets and countertops, install new backsplash.".into(),
            job_type_id: Some("remodel".into()),
            job_category_id: Some("kitchen".into()),
            property_type: Some("single_family".into()),
            service_type: None,
            status: ListingStatus::Published,
            bid_status: BidStatus::default(),
            job_size: Some("medium".into()),
            property_size: None,
            square_footage: Some(180.0),
            zip_code: Some("94107".into()),
            city: Some("San Francisco".into()),
            state: Some("CA".into()),
            location: None,
            timeline_horizon_id: None,
            timeline_start: None,
            timeline_end: None,
            bid_deadline: None,
            budget_min: Some(15_000.0),
            budget_max: Some(25_000.0),
            group_bidding_enabled: false,
            terms_accepted: true,
            marketing_consent: None,
            owner_id: EntityId::nil(),
        },
        media: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}
