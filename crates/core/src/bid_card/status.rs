//! Enumerations attached to a bid card.
//!
//! `ListingStatus` and `BidStatus` are deliberately separate types: the
//! listing lifecycle and the bidding progress move independently and are
//! stored in separate columns.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Listing status
// ---------------------------------------------------------------------------

/// Lifecycle of the listing itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Draft,
    Published,
    AcceptingBids,
    Awarded,
    Closed,
}

impl ListingStatus {
    pub const ALL: [ListingStatus; 5] = [
        Self::Draft,
        Self::Published,
        Self::AcceptingBids,
        Self::Awarded,
        Self::Closed,
    ];

    /// Parse a status string from the database or a form.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "accepting_bids" => Ok(Self::AcceptingBids),
            "awarded" => Ok(Self::Awarded),
            "closed" => Ok(Self::Closed),
            _ => Err(CoreError::Validation(format!(
                "Invalid listing status '{s}'. Must be one of: draft, published, accepting_bids, awarded, closed"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::AcceptingBids => "accepting_bids",
            Self::Awarded => "awarded",
            Self::Closed => "closed",
        }
    }

    /// Whether an edit may move a listing from `self` to `next`.
    ///
    /// Staying on the same status is always allowed. `closed` is terminal.
    pub fn can_transition_to(self, next: ListingStatus) -> bool {
        use ListingStatus::*;
        self == next
            || matches!(
                (self, next),
                (Draft, Published)
                    | (Draft, Closed)
                    | (Published, AcceptingBids)
                    | (Published, Closed)
                    | (AcceptingBids, Awarded)
                    | (AcceptingBids, Closed)
                    | (Awarded, Closed)
            )
    }
}

// ---------------------------------------------------------------------------
// Bid status
// ---------------------------------------------------------------------------

/// Progress of the bidding on a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    #[default]
    NotOpen,
    AcceptingBids,
    Reviewing,
    Awarded,
    Closed,
}

impl BidStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "not_open" => Ok(Self::NotOpen),
            "accepting_bids" => Ok(Self::AcceptingBids),
            "reviewing" => Ok(Self::Reviewing),
            "awarded" => Ok(Self::Awarded),
            "closed" => Ok(Self::Closed),
            _ => Err(CoreError::Validation(format!(
                "Invalid bid status '{s}'. Must be one of: not_open, accepting_bids, reviewing, awarded, closed"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotOpen => "not_open",
            Self::AcceptingBids => "accepting_bids",
            Self::Reviewing => "reviewing",
            Self::Awarded => "awarded",
            Self::Closed => "closed",
        }
    }
}

// ---------------------------------------------------------------------------
// Timeline horizon
// ---------------------------------------------------------------------------

/// Coarse "when do you need this done" bucket chosen in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineHorizon {
    Urgent,
    #[serde(rename = "within_1_week")]
    WithinOneWeek,
    #[serde(rename = "within_1_month")]
    WithinOneMonth,
    #[serde(rename = "within_3_months")]
    WithinThreeMonths,
    #[serde(rename = "within_6_months")]
    WithinSixMonths,
    Flexible,
}

impl TimelineHorizon {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "urgent" => Ok(Self::Urgent),
            "within_1_week" => Ok(Self::WithinOneWeek),
            "within_1_month" => Ok(Self::WithinOneMonth),
            "within_3_months" => Ok(Self::WithinThreeMonths),
            "within_6_months" => Ok(Self::WithinSixMonths),
            "flexible" => Ok(Self::Flexible),
            _ => Err(CoreError::Validation(format!(
                "Invalid timeline horizon '{s}'. Must be one of: urgent, within_1_week, \
                 within_1_month, within_3_months, within_6_months, flexible"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::WithinOneWeek => "within_1_week",
            Self::WithinOneMonth => "within_1_month",
            Self::WithinThreeMonths => "within_3_months",
            Self::WithinSixMonths => "within_6_months",
            Self::Flexible => "flexible",
        }
    }
}

// ---------------------------------------------------------------------------
// Contractor bid status
// ---------------------------------------------------------------------------

/// Status of a contractor's bid on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractorBidStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ContractorBidStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(CoreError::Validation(format!(
                "Invalid contractor bid status '{s}'. Must be one of: pending, accepted, rejected"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}
