//! Field-scoped validation results.
//!
//! Every validation failure in the system is reported as a list of
//! [`FieldViolation`]s rather than a single opaque message.

use serde::{Deserialize, Serialize};

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Wire (camelCase) name of the offending field.
    pub field: String,
    /// Short machine-readable rule id, e.g. `required` or `not_a_number`.
    pub rule: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, rule: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Accumulates violations while a candidate is checked field by field.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn push(&mut self, field: &str, rule: &str, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, rule, message));
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = FieldViolation>) {
        self.0.extend(other);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<FieldViolation> {
        self.0
    }

    /// `Ok(())` when nothing was recorded, the collected violations otherwise.
    pub fn finish(self) -> Result<(), Vec<FieldViolation>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}

/// Convert `validator` derive output into field violations.
///
/// Used for request DTOs whose rules are simple enough to declare with
/// `#[validate(...)]` attributes. Nested errors are flattened into dotted
/// paths such as `attachments[0].url`.
pub fn from_validator(errors: &validator::ValidationErrors) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    collect_validator_errors(errors, "", &mut out);
    // HashMap iteration order is unspecified.
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect_validator_errors(
    errors: &validator::ValidationErrors,
    prefix: &str,
    out: &mut Vec<FieldViolation>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{path} is invalid"));
                    out.push(FieldViolation::new(&path, &e.code, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_validator_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validator_errors(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}
