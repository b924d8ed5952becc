use crate::persistence::StoreError;
use crate::validation::FieldViolation;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// One or more fields failed validation. Each violation names the
    /// offending field so the caller can route the user back to it.
    #[error("Validation failed on {} field(s)", .0.len())]
    InvalidFields(Vec<FieldViolation>),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl CoreError {
    /// Build a `NotFound` error for any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Field violations carried by an `InvalidFields` error.
    pub fn field_violations(&self) -> Option<&[FieldViolation]> {
        match self {
            Self::InvalidFields(v) => Some(v),
            _ => None,
        }
    }

    /// Map a collaborator failure on a read path.
    pub fn from_store(entity: &'static str, id: impl ToString, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::not_found(entity, id),
            StoreError::Backend(msg) => Self::Persistence(PersistenceError::Unavailable(msg)),
        }
    }
}

/// Failures of the persistence collaborator, split by the stage that failed
/// so the caller can offer the right retry.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// A media upload failed. `orphaned_media` lists the URLs of files that
    /// were stored before the failure; no record was written.
    #[error("Upload of '{filename}' failed after {} file(s) were stored: {reason}", .orphaned_media.len())]
    UploadFailed {
        filename: String,
        orphaned_media: Vec<String>,
        reason: String,
    },

    /// Every media upload succeeded but the record write did not. The
    /// uploaded files stay orphaned in storage.
    #[error("Record write failed after {} media file(s) were uploaded: {reason}", .orphaned_media.len())]
    RecordWriteFailed {
        orphaned_media: Vec<String>,
        reason: String,
    },

    /// The collaborator could not be reached or returned an error on a
    /// plain read or write.
    #[error("Persistence collaborator unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    /// Short stage name reported to clients: `upload`, `record` or `backend`.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::UploadFailed { .. } => "upload",
            Self::RecordWriteFailed { .. } => "record",
            Self::Unavailable(_) => "backend",
        }
    }

    /// URLs of media stored before the failure.
    pub fn orphaned_media(&self) -> &[String] {
        match self {
            Self::UploadFailed { orphaned_media, .. }
            | Self::RecordWriteFailed { orphaned_media, .. } => orphaned_media,
            Self::Unavailable(_) => &[],
        }
    }

    /// True when some media reached storage but the record was never
    /// written.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::RecordWriteFailed { orphaned_media, .. } if !orphaned_media.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_not_found() {
        let err = CoreError::from_store("BidCard", "abc", StoreError::NotFound);
        assert!(matches!(err, CoreError::NotFound { entity: "BidCard", ref id } if id == "abc"));
    }

    #[test]
    fn store_backend_maps_to_unavailable() {
        let err = CoreError::from_store("BidCard", "abc", StoreError::Backend("timeout".into()));
        assert!(matches!(
            err,
            CoreError::Persistence(PersistenceError::Unavailable(ref msg)) if msg == "timeout"
        ));
    }

    #[test]
    fn partial_only_when_media_was_stored() {
        let partial = PersistenceError::RecordWriteFailed {
            orphaned_media: vec!["https://cdn/a.png".into()],
            reason: "boom".into(),
        };
        let clean = PersistenceError::RecordWriteFailed {
            orphaned_media: vec![],
            reason: "boom".into(),
        };
        assert!(partial.is_partial());
        assert!(!clean.is_partial());
        assert_eq!(partial.stage(), "record");
    }
}
