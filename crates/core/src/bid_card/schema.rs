//! Bid card schema validation.
//!
//! [`validate`] checks a [`BidCardForm`] against every rule a bid card must
//! satisfy and either produces a [`BidCardDetails`] or the full list of
//! field violations. [`validate_media`] applies the attachment limits.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use uuid::Uuid;

use crate::bid_card::model::{BidCardDetails, BidCardForm, MediaUpload, NumericInput};
use crate::bid_card::status::{BidStatus, ListingStatus, TimelineHorizon};
use crate::types::Timestamp;
use crate::validation::{FieldViolation, Violations};

// ---------------------------------------------------------------------------
// Field names (wire form)
// ---------------------------------------------------------------------------

pub mod fields {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const JOB_TYPE_ID: &str = "jobTypeId";
    pub const JOB_CATEGORY_ID: &str = "jobCategoryId";
    pub const PROPERTY_TYPE: &str = "propertyType";
    pub const SERVICE_TYPE: &str = "serviceType";
    pub const STATUS: &str = "status";
    pub const BID_STATUS: &str = "bidStatus";
    pub const JOB_SIZE: &str = "jobSize";
    pub const PROPERTY_SIZE: &str = "propertySize";
    pub const SQUARE_FOOTAGE: &str = "squareFootage";
    pub const ZIP_CODE: &str = "zipCode";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const LOCATION: &str = "location";
    pub const TIMELINE_HORIZON_ID: &str = "timelineHorizonId";
    pub const TIMELINE_START: &str = "timelineStart";
    pub const TIMELINE_END: &str = "timelineEnd";
    pub const BID_DEADLINE: &str = "bidDeadline";
    pub const BUDGET_MIN: &str = "budgetMin";
    pub const BUDGET_MAX: &str = "budgetMax";
    pub const GROUP_BIDDING_ENABLED: &str = "groupBiddingEnabled";
    pub const TERMS_ACCEPTED: &str = "termsAccepted";
    pub const MARKETING_CONSENT: &str = "marketingConsent";
    pub const OWNER_ID: &str = "ownerId";
    pub const MEDIA: &str = "media";
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 10_000;

/// Maximum number of files attached to one bid card.
pub const MAX_MEDIA_FILES: usize = 20;

/// Maximum size of a single attached file (50 MiB).
pub const MAX_MEDIA_BYTES: u64 = 50 * 1024 * 1024;

/// Content-type prefixes accepted for attachments.
const ALLOWED_MEDIA_PREFIXES: &[&str] = &["image/", "video/", "application/pdf"];

static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Whether the candidate is being submitted for real or saved as a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    Submit,
    Draft,
}

/// Inputs to validation that do not come from the form itself.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub mode: SubmissionMode,
    /// Reference time for the "deadline in the future" rule.
    pub now: Timestamp,
    /// The future-deadline rule only applies when a card is first created.
    pub creating: bool,
}

impl ValidationContext {
    pub fn submit(now: Timestamp) -> Self {
        Self {
            mode: SubmissionMode::Submit,
            now,
            creating: true,
        }
    }

    pub fn draft(now: Timestamp) -> Self {
        Self {
            mode: SubmissionMode::Draft,
            now,
            creating: true,
        }
    }

    /// Same rules, minus the creation-only ones.
    pub fn for_update(self) -> Self {
        Self {
            creating: false,
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a candidate bid card.
///
/// All rules run; the error lists every violation, not just the first.
pub fn validate(
    form: &BidCardForm,
    ctx: &ValidationContext,
) -> Result<BidCardDetails, Vec<FieldViolation>> {
    let mut v = Violations::default();

    let title = required_text(&mut v, fields::TITLE, form.title.as_deref(), MAX_TITLE_LEN);
    let description = required_text(
        &mut v,
        fields::DESCRIPTION,
        form.description.as_deref(),
        MAX_DESCRIPTION_LEN,
    );

    let status = match non_blank(form.status.as_deref()) {
        None => {
            v.push(fields::STATUS, "required", "status is required");
            None
        }
        Some(s) => match ListingStatus::from_str_db(s) {
            Ok(status) => Some(status),
            Err(e) => {
                v.push(fields::STATUS, "invalid_value", e.to_string());
                None
            }
        },
    };

    let bid_status = match non_blank(form.bid_status.as_deref()) {
        None => BidStatus::default(),
        Some(s) => BidStatus::from_str_db(s).unwrap_or_else(|e| {
            v.push(fields::BID_STATUS, "invalid_value", e.to_string());
            BidStatus::default()
        }),
    };

    let owner_id = match non_blank(form.owner_id.as_deref()) {
        None => {
            v.push(fields::OWNER_ID, "required", "ownerId is required");
            None
        }
        Some(s) => match Uuid::parse_str(s) {
            Ok(id) => Some(id),
            Err(_) => {
                v.push(fields::OWNER_ID, "invalid_id", "ownerId must be a valid user id");
                None
            }
        },
    };

    // -- Sizing --
    let square_footage = non_negative(&mut v, fields::SQUARE_FOOTAGE, form.square_footage.as_ref());

    // -- Location --
    let zip_code = non_blank(form.zip_code.as_deref()).map(str::to_string);
    if let Some(zip) = &zip_code {
        if !ZIP_RE.is_match(zip) {
            v.push(
                fields::ZIP_CODE,
                "invalid_format",
                "zipCode must be a 5-digit ZIP or ZIP+4",
            );
        }
    }
    if let Some(loc) = &form.location {
        let lat_ok = loc.latitude.map_or(true, |lat| (-90.0..=90.0).contains(&lat));
        let lng_ok = loc.longitude.map_or(true, |lng| (-180.0..=180.0).contains(&lng));
        if !lat_ok || !lng_ok {
            v.push(
                fields::LOCATION,
                "out_of_range",
                "location coordinates are out of range",
            );
        }
    }

    // -- Timeline --
    let timeline_horizon_id = non_blank(form.timeline_horizon_id.as_deref()).and_then(|s| {
        TimelineHorizon::from_str_db(s)
            .map_err(|e| v.push(fields::TIMELINE_HORIZON_ID, "invalid_value", e.to_string()))
            .ok()
    });
    let timeline_start = date_field(&mut v, fields::TIMELINE_START, form.timeline_start.as_deref());
    let timeline_end = date_field(&mut v, fields::TIMELINE_END, form.timeline_end.as_deref());
    if let (Some(start), Some(end)) = (timeline_start, timeline_end) {
        if end < start {
            v.push(
                fields::TIMELINE_END,
                "before_start",
                "timelineEnd must not be before timelineStart",
            );
        }
    }

    let bid_deadline = match non_blank(form.bid_deadline.as_deref()) {
        None => None,
        Some(s) => match parse_deadline(s) {
            Some(deadline) => {
                if ctx.creating && deadline <= ctx.now {
                    v.push(
                        fields::BID_DEADLINE,
                        "not_in_future",
                        "bidDeadline must be in the future",
                    );
                }
                Some(deadline)
            }
            None => {
                v.push(
                    fields::BID_DEADLINE,
                    "invalid_date",
                    "bidDeadline must be a valid date",
                );
                None
            }
        },
    };

    // -- Budget --
    let budget_min = non_negative(&mut v, fields::BUDGET_MIN, form.budget_min.as_ref());
    let budget_max = non_negative(&mut v, fields::BUDGET_MAX, form.budget_max.as_ref());
    if let (Some(min), Some(max)) = (budget_min, budget_max) {
        if max < min {
            v.push(
                fields::BUDGET_MAX,
                "below_min",
                "budgetMax must be greater than or equal to budgetMin",
            );
        }
    }

    // -- Consent --
    let terms_accepted = form.terms_accepted.unwrap_or(false);
    if ctx.mode == SubmissionMode::Submit && !terms_accepted {
        v.push(
            fields::TERMS_ACCEPTED,
            "must_accept",
            "termsAccepted must be true to submit",
        );
    }

    let (Some(title), Some(description), Some(status), Some(owner_id)) =
        (title, description, status, owner_id)
    else {
        return Err(v.into_inner());
    };
    v.finish()?;

    Ok(BidCardDetails {
        title,
        description,
        job_type_id: trimmed(form.job_type_id.as_deref()),
        job_category_id: trimmed(form.job_category_id.as_deref()),
        property_type: trimmed(form.property_type.as_deref()),
        service_type: trimmed(form.service_type.as_deref()),
        status,
        bid_status,
        job_size: trimmed(form.job_size.as_deref()),
        property_size: trimmed(form.property_size.as_deref()),
        square_footage,
        zip_code,
        city: trimmed(form.city.as_deref()),
        state: trimmed(form.state.as_deref()),
        location: form.location.clone(),
        timeline_horizon_id,
        timeline_start,
        timeline_end,
        bid_deadline,
        budget_min,
        budget_max,
        group_bidding_enabled: form.group_bidding_enabled.unwrap_or(false),
        terms_accepted,
        marketing_consent: form.marketing_consent,
        owner_id,
    })
}

/// Check attachment limits for a set of new uploads.
///
/// `already_attached` counts media that stays on the card, so the total
/// limit covers both.
pub fn validate_media(uploads: &[MediaUpload], already_attached: usize) -> Vec<FieldViolation> {
    let mut v = Violations::default();

    if uploads.len() + already_attached > MAX_MEDIA_FILES {
        v.push(
            fields::MEDIA,
            "too_many_files",
            format!("A bid card can have at most {MAX_MEDIA_FILES} attachments"),
        );
    }

    for upload in uploads {
        if upload.bytes.is_empty() {
            v.push(
                fields::MEDIA,
                "empty_file",
                format!("'{}' is empty", upload.filename),
            );
        } else if upload.size() > MAX_MEDIA_BYTES {
            v.push(
                fields::MEDIA,
                "file_too_large",
                format!("'{}' exceeds the 50 MiB limit", upload.filename),
            );
        }
        let content_type = upload.content_type.to_ascii_lowercase();
        if !ALLOWED_MEDIA_PREFIXES
            .iter()
            .any(|prefix| content_type.starts_with(prefix))
        {
            v.push(
                fields::MEDIA,
                "unsupported_type",
                format!(
                    "'{}' has unsupported type '{}'. Images, videos and PDFs are accepted",
                    upload.filename, upload.content_type
                ),
            );
        }
    }

    v.into_inner()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn trimmed(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

fn required_text(v: &mut Violations, field: &str, value: Option<&str>, max: usize) -> Option<String> {
    match non_blank(value) {
        None => {
            v.push(field, "required", format!("{field} is required"));
            None
        }
        Some(s) if s.chars().count() > max => {
            v.push(
                field,
                "too_long",
                format!("{field} must be at most {max} characters"),
            );
            None
        }
        Some(s) => Some(s.to_string()),
    }
}

fn non_negative(v: &mut Violations, field: &str, value: Option<&NumericInput>) -> Option<f64> {
    match value.map(NumericInput::coerce) {
        None | Some(Ok(None)) => None,
        Some(Ok(Some(n))) if n < 0.0 => {
            v.push(field, "negative", format!("{field} must not be negative"));
            None
        }
        Some(Ok(Some(n))) => Some(n),
        Some(Err(())) => {
            v.push(field, "not_a_number", format!("{field} must be a number"));
            None
        }
    }
}

fn date_field(v: &mut Violations, field: &str, value: Option<&str>) -> Option<NaiveDate> {
    let s = non_blank(value)?;
    match parse_date(s) {
        Some(date) => Some(date),
        None => {
            v.push(field, "invalid_date", format!("{field} must be a valid date"));
            None
        }
    }
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp (date part).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Parse a deadline. A bare date means the end of that day in UTC.
pub fn parse_deadline(s: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)?;
    Some(date.and_time(end_of_day).and_utc())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
