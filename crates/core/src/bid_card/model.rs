//! Bid card shapes: the candidate form, the validated payload, and the
//! persisted record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bid_card::status::{BidStatus, ListingStatus, TimelineHorizon};
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Candidate input
// ---------------------------------------------------------------------------

/// A numeric form field as it arrives from the client: either a JSON number
/// or the raw text of an input box. Any other JSON value is kept so the
/// schema can reject it against the field instead of failing the whole form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl NumericInput {
    /// Coerce to a finite `f64`. Blank text means "not provided".
    pub fn coerce(&self) -> Result<Option<f64>, ()> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed.parse::<f64>().map_err(|_| ())?
            }
            Self::Other(_) => return Err(()),
        };
        if value.is_finite() {
            Ok(Some(value))
        } else {
            Err(())
        }
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Structured location attached to a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Accumulated wizard input. Every field is optional until validation.
///
/// Enumerations and dates are kept as raw strings so an unknown value
/// produces a field-scoped error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BidCardForm {
    pub title: Option<String>,
    pub description: Option<String>,

    pub job_type_id: Option<String>,
    pub job_category_id: Option<String>,
    pub property_type: Option<String>,
    pub service_type: Option<String>,

    pub status: Option<String>,
    pub bid_status: Option<String>,

    pub job_size: Option<String>,
    pub property_size: Option<String>,
    pub square_footage: Option<NumericInput>,

    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub location: Option<Location>,

    pub timeline_horizon_id: Option<String>,
    pub timeline_start: Option<String>,
    pub timeline_end: Option<String>,
    pub bid_deadline: Option<String>,

    pub budget_min: Option<NumericInput>,
    pub budget_max: Option<NumericInput>,

    pub group_bidding_enabled: Option<bool>,
    pub terms_accepted: Option<bool>,
    pub marketing_consent: Option<bool>,

    pub owner_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Validated payload
// ---------------------------------------------------------------------------

/// A bid card payload that passed schema validation.
///
/// Only `schema::validate` constructs this from user input, so holding one
/// means the required fields and cross-field rules were checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidCardDetails {
    pub title: String,
    pub description: String,

    pub job_type_id: Option<String>,
    pub job_category_id: Option<String>,
    pub property_type: Option<String>,
    pub service_type: Option<String>,

    pub status: ListingStatus,
    pub bid_status: BidStatus,

    pub job_size: Option<String>,
    pub property_size: Option<String>,
    pub square_footage: Option<f64>,

    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub location: Option<Location>,

    pub timeline_horizon_id: Option<TimelineHorizon>,
    pub timeline_start: Option<NaiveDate>,
    pub timeline_end: Option<NaiveDate>,
    pub bid_deadline: Option<Timestamp>,

    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,

    pub group_bidding_enabled: bool,
    pub terms_accepted: bool,
    pub marketing_consent: Option<bool>,

    pub owner_id: EntityId,
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// A file blob handed to the service for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lower-cased extension of the original filename, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.filename.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Metadata for media that has been stored and is ready to be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedia {
    pub media_type: String,
    pub filename: String,
    pub size: i64,
    pub url: String,
}

/// A stored file attached to a bid card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachment {
    pub id: EntityId,
    pub media_type: String,
    pub filename: String,
    pub size: i64,
    pub url: String,
    /// Zero-based order within the bid card.
    pub position: i32,
}

// ---------------------------------------------------------------------------
// Persisted record
// ---------------------------------------------------------------------------

/// A bid card as returned by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidCard {
    pub id: EntityId,
    #[serde(flatten)]
    pub details: BidCardDetails,
    pub media: Vec<MediaAttachment>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BidCard {
    /// Turn a stored card back into form input for the edit flow.
    pub fn to_form(&self) -> BidCardForm {
        let d = &self.details;
        BidCardForm {
            title: Some(d.title.clone()),
            description: Some(d.description.clone()),
            job_type_id: d.job_type_id.clone(),
            job_category_id: d.job_category_id.clone(),
            property_type: d.property_type.clone(),
            service_type: d.service_type.clone(),
            status: Some(d.status.as_str().to_string()),
            bid_status: Some(d.bid_status.as_str().to_string()),
            job_size: d.job_size.clone(),
            property_size: d.property_size.clone(),
            square_footage: d.square_footage.map(NumericInput::Number),
            zip_code: d.zip_code.clone(),
            city: d.city.clone(),
            state: d.state.clone(),
            location: d.location.clone(),
            timeline_horizon_id: d.timeline_horizon_id.map(|h| h.as_str().to_string()),
            timeline_start: d.timeline_start.map(|date| date.to_string()),
            timeline_end: d.timeline_end.map(|date| date.to_string()),
            bid_deadline: d.bid_deadline.map(|ts| ts.to_rfc3339()),
            budget_min: d.budget_min.map(NumericInput::Number),
            budget_max: d.budget_max.map(NumericInput::Number),
            group_bidding_enabled: Some(d.group_bidding_enabled),
            terms_accepted: Some(d.terms_accepted),
            marketing_consent: d.marketing_consent,
            owner_id: Some(d.owner_id.to_string()),
        }
    }
}
