//! Multi-step bid card wizard.
//!
//! The wizard holds the in-progress [`BidCardForm`] and the current step.
//! Each step owns a fixed set of form fields and is valid when bid card
//! validation reports nothing for those fields. Submitting and saving drafts
//! are delegated to a [`SubmissionHandler`]; the wizard itself does no I/O.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bid_card::schema::fields;
use crate::bid_card::{
    validate, validate_media, BidCard, BidCardDetails, BidCardForm, ListingStatus, MediaAttachment,
    MediaUpload, SubmissionMode, ValidationContext,
};
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::FieldViolation;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    ProjectType,
    ProjectDetails,
    TimelineBudget,
    Location,
    MediaUpload,
    ReviewSubmit,
}

/// Number of steps in the wizard.
pub const TOTAL_STEPS: usize = 6;

impl WizardStep {
    pub const ALL: [WizardStep; TOTAL_STEPS] = [
        Self::ProjectType,
        Self::ProjectDetails,
        Self::TimelineBudget,
        Self::Location,
        Self::MediaUpload,
        Self::ReviewSubmit,
    ];

    /// Convert a 0-based index to a step.
    pub fn from_index(index: usize) -> Result<Self, WizardError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(WizardError::UnknownStep { index })
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ProjectType => "Project Type",
            Self::ProjectDetails => "Project Details",
            Self::TimelineBudget => "Timeline & Budget",
            Self::Location => "Location",
            Self::MediaUpload => "Media Upload",
            Self::ReviewSubmit => "Review & Submit",
        }
    }

    /// Form fields collected on this step.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::ProjectType => &[
                fields::JOB_TYPE_ID,
                fields::JOB_CATEGORY_ID,
                fields::PROPERTY_TYPE,
                fields::SERVICE_TYPE,
            ],
            Self::ProjectDetails => &[
                fields::TITLE,
                fields::DESCRIPTION,
                fields::JOB_SIZE,
                fields::PROPERTY_SIZE,
                fields::SQUARE_FOOTAGE,
            ],
            Self::TimelineBudget => &[
                fields::TIMELINE_HORIZON_ID,
                fields::TIMELINE_START,
                fields::TIMELINE_END,
                fields::BID_DEADLINE,
                fields::BUDGET_MIN,
                fields::BUDGET_MAX,
                fields::GROUP_BIDDING_ENABLED,
            ],
            Self::Location => &[fields::ZIP_CODE, fields::CITY, fields::STATE, fields::LOCATION],
            Self::MediaUpload => &[fields::MEDIA],
            Self::ReviewSubmit => &[
                fields::TERMS_ACCEPTED,
                fields::MARKETING_CONSENT,
                fields::STATUS,
                fields::BID_STATUS,
                fields::OWNER_ID,
            ],
        }
    }

    /// The step that owns `field`. Unknown fields belong to the review step.
    pub fn for_field(field: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|step| step.fields().contains(&field))
            .unwrap_or(Self::ReviewSubmit)
    }

    fn is_final(self) -> bool {
        self == Self::ReviewSubmit
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Step {index} does not exist. Steps are numbered 0 to {}", TOTAL_STEPS - 1)]
    UnknownStep { index: usize },

    #[error("Already at the final step")]
    AtFinalStep,

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Cannot jump ahead from step {from} to step {to}")]
    JumpAhead { from: usize, to: usize },

    #[error("Step '{}' has {} invalid field(s)", .step.label(), .violations.len())]
    StepIncomplete {
        step: WizardStep,
        violations: Vec<FieldViolation>,
    },

    #[error("Submission has {} invalid field(s)", .violations.len())]
    InvalidSubmission {
        violations: Vec<FieldViolation>,
        first_invalid_step: WizardStep,
    },

    #[error(transparent)]
    Handler(#[from] CoreError),
}

// ---------------------------------------------------------------------------
// Submission handler
// ---------------------------------------------------------------------------

/// Receives validated cards from the wizard.
#[async_trait]
pub trait SubmissionHandler: Send + Sync {
    async fn create(&self, details: BidCardDetails, files: Vec<MediaUpload>) -> Result<BidCard, CoreError>;

    async fn update(
        &self,
        id: EntityId,
        details: BidCardDetails,
        files: Vec<MediaUpload>,
        removed_media: Vec<EntityId>,
    ) -> Result<BidCard, CoreError>;
}

// ---------------------------------------------------------------------------
// Step validation
// ---------------------------------------------------------------------------

/// Fill in the status a submission gets when the user never picked one.
pub fn with_default_status(form: &BidCardForm, mode: SubmissionMode) -> BidCardForm {
    let mut form = form.clone();
    let unset = form.status.as_deref().map_or(true, |s| s.trim().is_empty());
    if unset {
        let status = match mode {
            SubmissionMode::Submit => ListingStatus::Published,
            SubmissionMode::Draft => ListingStatus::Draft,
        };
        form.status = Some(status.as_str().to_string());
    }
    form
}

/// Violations of `form` that belong to `step`.
///
/// Steps before the review are checked in draft mode; the review step also
/// requires `termsAccepted`. Media limits are checked separately.
pub fn step_violations(
    form: &BidCardForm,
    step: WizardStep,
    now: Timestamp,
    creating: bool,
) -> Vec<FieldViolation> {
    let mode = if step.is_final() {
        SubmissionMode::Submit
    } else {
        SubmissionMode::Draft
    };
    let ctx = ValidationContext {
        mode,
        now,
        creating,
    };
    match validate(&with_default_status(form, mode), &ctx) {
        Ok(_) => Vec::new(),
        Err(violations) => violations
            .into_iter()
            .filter(|v| WizardStep::for_field(&v.field) == step)
            .collect(),
    }
}

/// Earliest step owning any of `violations`.
pub fn first_invalid_step(violations: &[FieldViolation]) -> Option<WizardStep> {
    violations
        .iter()
        .map(|v| WizardStep::for_field(&v.field))
        .min()
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BidCardWizard {
    step: WizardStep,
    form: BidCardForm,
    pending_files: Vec<MediaUpload>,
    existing_media: Vec<MediaAttachment>,
    removed_media: Vec<EntityId>,
    editing: Option<EntityId>,
}

impl BidCardWizard {
    /// Start a new card for `owner`.
    pub fn new(owner: EntityId) -> Self {
        Self {
            step: WizardStep::ProjectType,
            form: BidCardForm {
                owner_id: Some(owner.to_string()),
                ..Default::default()
            },
            pending_files: Vec::new(),
            existing_media: Vec::new(),
            removed_media: Vec::new(),
            editing: None,
        }
    }

    /// Re-open a stored card for editing.
    pub fn edit(card: &BidCard) -> Self {
        Self {
            step: WizardStep::ProjectType,
            form: card.to_form(),
            pending_files: Vec::new(),
            existing_media: card.media.clone(),
            removed_media: Vec::new(),
            editing: Some(card.id),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &BidCardForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut BidCardForm {
        &mut self.form
    }

    /// Id of the card being edited, once there is one.
    pub fn editing(&self) -> Option<EntityId> {
        self.editing
    }

    pub fn pending_files(&self) -> &[MediaUpload] {
        &self.pending_files
    }

    pub fn add_file(&mut self, upload: MediaUpload) {
        self.pending_files.push(upload);
    }

    pub fn remove_pending_file(&mut self, index: usize) -> Option<MediaUpload> {
        (index < self.pending_files.len()).then(|| self.pending_files.remove(index))
    }

    /// Media attached to the card being edited that the user still keeps.
    pub fn kept_media(&self) -> impl Iterator<Item = &MediaAttachment> {
        self.existing_media
            .iter()
            .filter(|m| !self.removed_media.contains(&m.id))
    }

    /// Mark stored media for removal. Returns false for unknown ids.
    pub fn remove_existing_media(&mut self, media_id: EntityId) -> bool {
        let known = self.existing_media.iter().any(|m| m.id == media_id);
        if known && !self.removed_media.contains(&media_id) {
            self.removed_media.push(media_id);
        }
        known
    }

    // -- Validation --

    /// Violations on `step` for the current form and files.
    pub fn violations_for(&self, step: WizardStep, now: Timestamp) -> Vec<FieldViolation> {
        if step == WizardStep::MediaUpload {
            return validate_media(&self.pending_files, self.kept_media().count());
        }
        step_violations(&self.form, step, now, self.editing.is_none())
    }

    /// Validity of every step, in order.
    pub fn step_validity(&self, now: Timestamp) -> [bool; TOTAL_STEPS] {
        WizardStep::ALL.map(|step| self.violations_for(step, now).is_empty())
    }

    // -- Navigation --

    /// Advance one step if the current step validates.
    pub fn next(&mut self, now: Timestamp) -> Result<WizardStep, WizardError> {
        if self.step.is_final() {
            return Err(WizardError::AtFinalStep);
        }
        let violations = self.violations_for(self.step, now);
        if !violations.is_empty() {
            return Err(WizardError::StepIncomplete {
                step: self.step,
                violations,
            });
        }
        self.step = WizardStep::from_index(self.step.index() + 1)?;
        Ok(self.step)
    }

    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        if self.step.index() == 0 {
            return Err(WizardError::AtFirstStep);
        }
        self.step = WizardStep::from_index(self.step.index() - 1)?;
        Ok(self.step)
    }

    /// Return to an earlier step (or stay). Skipping ahead is rejected.
    pub fn jump_to(&mut self, index: usize) -> Result<WizardStep, WizardError> {
        let target = WizardStep::from_index(index)?;
        if target > self.step {
            return Err(WizardError::JumpAhead {
                from: self.step.index(),
                to: index,
            });
        }
        self.step = target;
        Ok(self.step)
    }

    // -- Terminal actions --

    /// Validate everything, including `termsAccepted`, and hand the card to
    /// `handler`. On validation failure the wizard moves back to the first
    /// step with an error.
    pub async fn submit(
        &mut self,
        handler: &dyn SubmissionHandler,
        now: Timestamp,
    ) -> Result<BidCard, WizardError> {
        self.finish(handler, SubmissionMode::Submit, now).await
    }

    /// Save the form as a draft from any step. `termsAccepted` is not
    /// required.
    pub async fn save_draft(
        &mut self,
        handler: &dyn SubmissionHandler,
        now: Timestamp,
    ) -> Result<BidCard, WizardError> {
        self.finish(handler, SubmissionMode::Draft, now).await
    }

    async fn finish(
        &mut self,
        handler: &dyn SubmissionHandler,
        mode: SubmissionMode,
        now: Timestamp,
    ) -> Result<BidCard, WizardError> {
        let form = with_default_status(&self.form, mode);
        let ctx = ValidationContext {
            mode,
            now,
            creating: self.editing.is_none(),
        };

        let mut violations = validate_media(&self.pending_files, self.kept_media().count());
        let details = match validate(&form, &ctx) {
            Ok(details) if violations.is_empty() => details,
            Ok(_) => return Err(self.reject(violations)),
            Err(errs) => {
                violations.extend(errs);
                return Err(self.reject(violations));
            }
        };

        let files = self.pending_files.clone();
        let card = match self.editing {
            None => handler.create(details, files).await?,
            Some(id) => {
                handler
                    .update(id, details, files, self.removed_media.clone())
                    .await?
            }
        };

        // Later saves update the stored card instead of creating another.
        self.form = card.to_form();
        self.editing = Some(card.id);
        self.existing_media = card.media.clone();
        self.pending_files.clear();
        self.removed_media.clear();
        Ok(card)
    }

    fn reject(&mut self, violations: Vec<FieldViolation>) -> WizardError {
        let first = first_invalid_step(&violations).unwrap_or(WizardStep::ReviewSubmit);
        if first < self.step {
            self.step = first;
        }
        WizardError::InvalidSubmission {
            violations,
            first_invalid_step: first,
        }
    }
}

/// Parse and validate a step index from a query string.
pub fn parse_step(raw: usize) -> Result<WizardStep, CoreError> {
    WizardStep::from_index(raw).map_err(|e| CoreError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::bid_card::NumericInput;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn owner() -> EntityId {
        EntityId::from_u128(42)
    }

    /// Records what the wizard handed over and echoes it back as a card.
    #[derive(Default)]
    struct RecordingHandler {
        created: Mutex<Vec<(BidCardDetails, usize)>>,
        updated: Mutex<Vec<(EntityId, Vec<EntityId>)>>,
    }

    fn card_from(id: EntityId, details: BidCardDetails) -> BidCard {
        BidCard {
            id,
            details,
            media: vec![],
            created_at: now(),
            updated_at: now(),
        }
    }

    #[async_trait]
    impl SubmissionHandler for RecordingHandler {
        async fn create(&self, details: BidCardDetails, files: Vec<MediaUpload>) -> Result<BidCard, CoreError> {
            self.created.lock().unwrap().push((details.clone(), files.len()));
            Ok(card_from(EntityId::from_u128(7), details))
        }

        async fn update(
            &self,
            id: EntityId,
            details: BidCardDetails,
            _files: Vec<MediaUpload>,
            removed_media: Vec<EntityId>,
        ) -> Result<BidCard, CoreError> {
            self.updated.lock().unwrap().push((id, removed_media));
            Ok(card_from(id, details))
        }
    }

    fn filled_wizard() -> BidCardWizard {
        let mut w = BidCardWizard::new(owner());
        let f = w.form_mut();
        f.job_type_id = Some("roofing".into());
        f.title = Some("Replace roof".into());
        f.description = Some("Asphalt shingles, two stories".into());
        f.budget_min = Some(NumericInput::Number(8000.0));
        f.budget_max = Some(NumericInput::Number(12000.0));
        f.zip_code = Some("90210".into());
        w
    }

    fn advance_to_review(w: &mut BidCardWizard) {
        while w.step() != WizardStep::ReviewSubmit {
            w.next(now()).unwrap();
        }
    }

    // -- Steps --

    #[test]
    fn every_field_belongs_to_exactly_one_step() {
        let mut seen = std::collections::HashSet::new();
        for step in WizardStep::ALL {
            for field in step.fields() {
                assert!(seen.insert(*field), "{field} appears twice");
            }
        }
        assert_eq!(WizardStep::for_field("budgetMax"), WizardStep::TimelineBudget);
        assert_eq!(WizardStep::for_field("ownerId"), WizardStep::ReviewSubmit);
    }

    #[test]
    fn step_indices_round_trip() {
        for (i, step) in WizardStep::ALL.iter().enumerate() {
            assert_eq!(step.index(), i);
        }
        assert_matches!(WizardStep::from_index(6), Err(WizardError::UnknownStep { index: 6 }));
    }

    // -- next --

    #[test]
    fn next_rejects_invalid_step_and_keeps_position() {
        let mut w = BidCardWizard::new(owner());
        w.next(now()).unwrap(); // project type has no required fields
        assert_eq!(w.step(), WizardStep::ProjectDetails);

        let err = w.next(now()).unwrap_err();
        assert_matches!(err, WizardError::StepIncomplete { step: WizardStep::ProjectDetails, ref violations } => {
            let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
            assert_eq!(fields, vec!["title", "description"]);
        });
        assert_eq!(w.step(), WizardStep::ProjectDetails);
    }

    #[test]
    fn next_advances_exactly_one_when_valid() {
        let mut w = filled_wizard();
        for expected in 1..TOTAL_STEPS {
            let step = w.next(now()).unwrap();
            assert_eq!(step.index(), expected);
        }
        assert_matches!(w.next(now()), Err(WizardError::AtFinalStep));
    }

    #[test]
    fn later_step_errors_do_not_block_earlier_steps() {
        let mut w = filled_wizard();
        w.form_mut().budget_max = Some(NumericInput::Number(10.0));
        w.next(now()).unwrap();
        w.next(now()).unwrap();
        assert_eq!(w.step(), WizardStep::TimelineBudget);
        assert_matches!(w.next(now()), Err(WizardError::StepIncomplete { step: WizardStep::TimelineBudget, .. }));
    }

    #[test]
    fn media_step_checks_attachment_limits() {
        let mut w = filled_wizard();
        w.add_file(MediaUpload {
            filename: "setup.exe".into(),
            content_type: "application/x-msdownload".into(),
            bytes: vec![1],
        });
        let validity = w.step_validity(now());
        assert!(!validity[WizardStep::MediaUpload.index()]);
        assert!(validity[WizardStep::Location.index()]);
        w.remove_pending_file(0);
        assert!(w.step_validity(now())[WizardStep::MediaUpload.index()]);
    }

    // -- back / jump_to --

    #[test]
    fn back_is_unvalidated_and_stops_at_first_step() {
        let mut w = filled_wizard();
        w.next(now()).unwrap();
        w.next(now()).unwrap();
        w.form_mut().title = None;
        assert_eq!(w.back().unwrap(), WizardStep::ProjectDetails);
        assert_eq!(w.back().unwrap(), WizardStep::ProjectType);
        assert_matches!(w.back(), Err(WizardError::AtFirstStep));
    }

    #[test]
    fn jump_to_allows_current_and_earlier_only() {
        let mut w = filled_wizard();
        w.next(now()).unwrap();
        w.next(now()).unwrap();
        w.next(now()).unwrap();
        assert_eq!(w.step().index(), 3);

        assert_matches!(w.jump_to(4), Err(WizardError::JumpAhead { from: 3, to: 4 }));
        assert_eq!(w.step().index(), 3);

        // Earlier steps are reachable even when they no longer validate.
        w.form_mut().title = None;
        for k in (0..=3).rev() {
            let mut candidate = w.clone();
            assert_eq!(candidate.jump_to(k).unwrap().index(), k);
        }
        assert_matches!(w.jump_to(99), Err(WizardError::UnknownStep { index: 99 }));
    }

    // -- submit / save_draft --

    #[tokio::test]
    async fn submit_without_terms_fails_but_draft_succeeds() {
        let handler = RecordingHandler::default();
        let mut w = filled_wizard();
        advance_to_review(&mut w);
        w.form_mut().terms_accepted = Some(false);

        let err = w.submit(&handler, now()).await.unwrap_err();
        assert_matches!(err, WizardError::InvalidSubmission { ref violations, first_invalid_step: WizardStep::ReviewSubmit } => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].field, "termsAccepted");
        });
        assert!(handler.created.lock().unwrap().is_empty());

        let card = w.save_draft(&handler, now()).await.unwrap();
        assert_eq!(card.details.status, ListingStatus::Draft);
        assert_eq!(handler.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn submit_defaults_status_to_published() {
        let handler = RecordingHandler::default();
        let mut w = filled_wizard();
        w.form_mut().terms_accepted = Some(true);
        w.add_file(MediaUpload {
            filename: "roof.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![1, 2, 3],
        });

        let card = w.submit(&handler, now()).await.unwrap();
        assert_eq!(card.details.status, ListingStatus::Published);
        assert_eq!(card.details.owner_id, owner());
        assert_eq!(handler.created.lock().unwrap()[0].1, 1);
        assert!(w.pending_files().is_empty());
        assert_eq!(w.editing(), Some(card.id));
    }

    #[tokio::test]
    async fn invalid_submission_routes_back_to_first_bad_step() {
        let handler = RecordingHandler::default();
        let mut w = filled_wizard();
        advance_to_review(&mut w);
        w.form_mut().title = None;
        w.form_mut().terms_accepted = Some(true);

        let err = w.submit(&handler, now()).await.unwrap_err();
        assert_matches!(err, WizardError::InvalidSubmission { first_invalid_step: WizardStep::ProjectDetails, .. });
        assert_eq!(w.step(), WizardStep::ProjectDetails);
    }

    #[tokio::test]
    async fn save_after_draft_updates_the_same_card() {
        let handler = RecordingHandler::default();
        let mut w = filled_wizard();
        let draft = w.save_draft(&handler, now()).await.unwrap();

        w.form_mut().terms_accepted = Some(true);
        w.form_mut().status = Some("published".into());
        let published = w.submit(&handler, now()).await.unwrap();

        assert_eq!(published.id, draft.id);
        assert_eq!(handler.created.lock().unwrap().len(), 1);
        assert_eq!(handler.updated.lock().unwrap()[0].0, draft.id);
    }

    #[tokio::test]
    async fn edit_mode_passes_removed_media() {
        let media_id = EntityId::from_u128(900);
        let details = validate(
            &BidCardForm {
                title: Some("Fence".into()),
                description: Some("Cedar fence".into()),
                status: Some("published".into()),
                owner_id: Some(owner().to_string()),
                terms_accepted: Some(true),
                ..Default::default()
            },
            &ValidationContext::submit(now()),
        )
        .unwrap();
        let mut card = card_from(EntityId::from_u128(5), details);
        card.media.push(MediaAttachment {
            id: media_id,
            media_type: "image/png".into(),
            filename: "fence.png".into(),
            size: 10,
            url: "http://media/fence.png".into(),
            position: 0,
        });

        let handler = RecordingHandler::default();
        let mut w = BidCardWizard::edit(&card);
        assert!(w.remove_existing_media(media_id));
        assert!(!w.remove_existing_media(EntityId::from_u128(1)));
        assert_eq!(w.kept_media().count(), 0);

        w.submit(&handler, now()).await.unwrap();
        let updated = handler.updated.lock().unwrap();
        assert_eq!(updated[0], (card.id, vec![media_id]));
    }
}
