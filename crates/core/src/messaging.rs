//! Message threads and the contractor sender-labeling heuristic.
//!
//! Homeowners see contractors as "Contractor A", "Contractor B", ... rather
//! than by identity. Which senders count as contractors is decided by
//! [`classify`], an ordered list of content and flag signals. It is a
//! heuristic, not an identity check: signal 1 fires whenever the text
//! mentions the word "contractor", including in the viewer's own messages.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::bid_card::status::ContractorBidStatus;
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Metadata key set by the sending client for contractor messages.
pub const META_IS_FROM_CONTRACTOR: &str = "isFromContractor";

/// Metadata key that forces contractor display regardless of sender.
pub const META_FORCE_CONTRACTOR_DISPLAY: &str = "forceContractorDisplay";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MessageAttachment {
    #[validate(length(min = 1, max = 255, message = "attachment filename is required"))]
    pub filename: String,
    #[validate(url(message = "attachment url must be a valid URL"))]
    pub url: String,
    #[serde(default)]
    pub media_type: Option<String>,
}

/// An immutable message in a (project, contractor) thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: EntityId,
    pub project_id: EntityId,
    pub contractor_id: EntityId,
    pub sender_id: EntityId,
    pub content: String,
    pub timestamp: Timestamp,
    pub attachments: Vec<MessageAttachment>,
    /// Free-form client metadata; may carry the contractor display flags.
    pub metadata: serde_json::Value,
}

/// Input for sending a message.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewMessage {
    pub project_id: EntityId,
    pub contractor_id: EntityId,
    pub sender_id: EntityId,
    #[validate(length(min = 1, max = 5000, message = "content must be 1-5000 characters"))]
    pub content: String,
    #[validate(nested)]
    pub attachments: Vec<MessageAttachment>,
    pub metadata: serde_json::Value,
}

/// A message as shown to one viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMessage {
    #[serde(flatten)]
    pub message: Message,
    pub is_own: bool,
    /// Sequential label ("1", "2", ...) of a contractor sender.
    pub sender_label: Option<String>,
    /// Display name derived from the label, e.g. "Contractor A".
    pub sender_alias: Option<String>,
}

/// Contractor summary projection for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorSummary {
    pub id: EntityId,
    pub name: String,
    pub company: Option<String>,
    pub bid_amount: Option<f64>,
    pub status: ContractorBidStatus,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The parts of a message the classifier looks at.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyInput<'a> {
    pub sender_id: EntityId,
    pub content: &'a str,
    pub metadata: &'a serde_json::Value,
    /// `None` when the viewer is unknown.
    pub is_own: Option<bool>,
}

impl Message {
    /// Classification view of this message for `viewer`.
    pub fn classify_input(&self, viewer: Option<EntityId>) -> ClassifyInput<'_> {
        ClassifyInput {
            sender_id: self.sender_id,
            content: &self.content,
            metadata: &self.metadata,
            is_own: viewer.map(|v| v == self.sender_id),
        }
    }
}

/// A named predicate contributing to contractor classification.
pub struct ContractorSignal {
    pub name: &'static str,
    pub matches: fn(&ClassifyInput<'_>) -> bool,
}

/// Signals in evaluation order. The first match wins.
pub const CONTRACTOR_SIGNALS: [ContractorSignal; 4] = [
    ContractorSignal {
        name: "mentions_contractor",
        matches: mentions_contractor,
    },
    ContractorSignal {
        name: "is_from_contractor_flag",
        matches: is_from_contractor_flag,
    },
    ContractorSignal {
        name: "force_contractor_display_flag",
        matches: force_contractor_display_flag,
    },
    ContractorSignal {
        name: "not_own_message",
        matches: not_own_message,
    },
];

fn mentions_contractor(m: &ClassifyInput<'_>) -> bool {
    m.content.to_lowercase().contains("contractor")
}

fn metadata_flag(m: &ClassifyInput<'_>, key: &str) -> bool {
    m.metadata
        .get(key)
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}

fn is_from_contractor_flag(m: &ClassifyInput<'_>) -> bool {
    metadata_flag(m, META_IS_FROM_CONTRACTOR)
}

fn force_contractor_display_flag(m: &ClassifyInput<'_>) -> bool {
    metadata_flag(m, META_FORCE_CONTRACTOR_DISPLAY)
}

fn not_own_message(m: &ClassifyInput<'_>) -> bool {
    m.is_own == Some(false)
}

/// Name of the first signal that classifies `m` as a contractor message.
pub fn matching_signal(m: &ClassifyInput<'_>) -> Option<&'static str> {
    CONTRACTOR_SIGNALS
        .iter()
        .find(|signal| (signal.matches)(m))
        .map(|signal| signal.name)
}

/// Whether `m` is treated as sent by a contractor.
pub fn classify(m: &ClassifyInput<'_>) -> bool {
    matching_signal(m).is_some()
}

// ---------------------------------------------------------------------------
// Labeling
// ---------------------------------------------------------------------------

/// Assign sequential labels to contractor senders in thread order.
///
/// The first sender classified as a contractor gets "1", the next new one
/// "2", and so on. Repeat senders keep their first label, so running this
/// twice over the same sequence gives the same map.
pub fn assign_labels(messages: &[ClassifyInput<'_>]) -> HashMap<EntityId, String> {
    let mut labels = HashMap::new();
    for m in messages {
        if labels.contains_key(&m.sender_id) || !classify(m) {
            continue;
        }
        let next = (labels.len() + 1).to_string();
        labels.insert(m.sender_id, next);
    }
    labels
}

/// Display alias for a label: "1" -> "Contractor A", "27" -> "Contractor AA".
pub fn alias_for_label(label: &str) -> Option<String> {
    let n: usize = label.parse().ok().filter(|n| *n > 0)?;
    Some(format!("Contractor {}", column_letters(n)))
}

/// Bijective base-26: 1 -> A, 26 -> Z, 27 -> AA.
fn column_letters(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Order a thread by timestamp and decorate each message for `viewer`.
pub fn decorate_thread(mut messages: Vec<Message>, viewer: EntityId) -> Vec<ThreadMessage> {
    messages.sort_by_key(|m| m.timestamp);

    let labels = {
        let inputs: Vec<ClassifyInput<'_>> = messages
            .iter()
            .map(|m| m.classify_input(Some(viewer)))
            .collect();
        assign_labels(&inputs)
    };

    messages
        .into_iter()
        .map(|message| {
            let is_own = message.sender_id == viewer;
            let sender_label = if is_own {
                None
            } else {
                labels.get(&message.sender_id).cloned()
            };
            let sender_alias = sender_label.as_deref().and_then(alias_for_label);
            ThreadMessage {
                message,
                is_own,
                sender_label,
                sender_alias,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn id(n: u128) -> EntityId {
        EntityId::from_u128(n)
    }

    fn input<'a>(sender: u128, content: &'a str, meta: &'a serde_json::Value, is_own: Option<bool>) -> ClassifyInput<'a> {
        ClassifyInput {
            sender_id: id(sender),
            content,
            metadata: meta,
            is_own,
        }
    }

    fn message(n: u128, sender: u128, content: &str, minutes: i64) -> Message {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        Message {
            id: id(1000 + n),
            project_id: id(500),
            contractor_id: id(600),
            sender_id: id(sender),
            content: content.to_string(),
            timestamp: base + Duration::minutes(minutes),
            attachments: vec![],
            metadata: json!({}),
        }
    }

    // -- classify --

    #[test]
    fn mention_of_contractor_classifies_even_own_message() {
        let meta = json!({});
        let m = input(1, "ok, contractor, sounds good", &meta, Some(true));
        assert!(classify(&m));
        assert_eq!(matching_signal(&m), Some("mentions_contractor"));
    }

    #[test]
    fn mention_is_case_insensitive() {
        let meta = json!({});
        assert!(classify(&input(1, "Our CONTRACTOR is late", &meta, Some(true))));
    }

    #[test]
    fn metadata_flags_classify() {
        let from = json!({ "isFromContractor": true });
        let m = input(1, "hello", &from, Some(true));
        assert_eq!(matching_signal(&m), Some("is_from_contractor_flag"));

        let forced = json!({ "forceContractorDisplay": true });
        let m = input(1, "hello", &forced, Some(true));
        assert_eq!(matching_signal(&m), Some("force_contractor_display_flag"));
    }

    #[test]
    fn non_boolean_flags_are_ignored() {
        let meta = json!({ "isFromContractor": "yes" });
        assert!(!classify(&input(1, "hello", &meta, Some(true))));
    }

    #[test]
    fn explicit_not_own_classifies() {
        let meta = json!({});
        let m = input(1, "hello", &meta, Some(false));
        assert_eq!(matching_signal(&m), Some("not_own_message"));
    }

    #[test]
    fn own_plain_message_is_not_contractor() {
        let meta = json!({});
        assert!(!classify(&input(1, "hello", &meta, Some(true))));
        assert!(!classify(&input(1, "hello", &meta, None)));
    }

    // -- assign_labels --

    #[test]
    fn labels_follow_encounter_order() {
        let meta = json!({ "isFromContractor": true });
        let msgs = [
            input(10, "a", &meta, None),
            input(20, "b", &meta, None),
            input(10, "c", &meta, None),
        ];
        let labels = assign_labels(&msgs);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[&id(10)], "1");
        assert_eq!(labels[&id(20)], "2");
        assert_eq!(assign_labels(&msgs), labels);
    }

    #[test]
    fn non_contractor_senders_are_not_labeled() {
        let plain = json!({});
        let flagged = json!({ "isFromContractor": true });
        let msgs = [
            input(1, "hi there", &plain, Some(true)),
            input(2, "quote attached", &flagged, None),
        ];
        let labels = assign_labels(&msgs);
        assert!(!labels.contains_key(&id(1)));
        assert_eq!(labels[&id(2)], "1");
    }

    #[test]
    fn sender_first_seen_as_plain_can_be_labeled_later() {
        let plain = json!({});
        let msgs = [
            input(1, "hello", &plain, None),
            input(2, "hello", &plain, Some(false)),
            input(1, "as your contractor I suggest", &plain, None),
        ];
        let labels = assign_labels(&msgs);
        assert_eq!(labels[&id(2)], "1");
        assert_eq!(labels[&id(1)], "2");
    }

    // -- aliases --

    #[test]
    fn aliases_are_letters() {
        assert_eq!(alias_for_label("1").as_deref(), Some("Contractor A"));
        assert_eq!(alias_for_label("2").as_deref(), Some("Contractor B"));
        assert_eq!(alias_for_label("26").as_deref(), Some("Contractor Z"));
        assert_eq!(alias_for_label("27").as_deref(), Some("Contractor AA"));
        assert_eq!(alias_for_label("0"), None);
        assert_eq!(alias_for_label("x"), None);
    }

    // -- decorate_thread --

    #[test]
    fn thread_is_sorted_and_decorated_for_viewer() {
        let homeowner = 1;
        let msgs = vec![
            message(2, 7, "I can start Monday", 10),
            message(1, homeowner, "Can you quote this?", 0),
            message(3, 8, "Here is my bid", 20),
        ];
        let thread = decorate_thread(msgs, id(homeowner));

        assert_eq!(thread[0].message.sender_id, id(homeowner));
        assert!(thread[0].is_own);
        assert_eq!(thread[0].sender_alias, None);

        assert_eq!(thread[1].sender_alias.as_deref(), Some("Contractor A"));
        assert_eq!(thread[2].sender_alias.as_deref(), Some("Contractor B"));
        assert!(!thread[2].is_own);
    }

    #[test]
    fn own_message_mentioning_contractor_consumes_a_label_but_shows_no_alias() {
        let homeowner = 1;
        let msgs = vec![
            message(1, homeowner, "Thanks contractor", 0),
            message(2, 7, "You're welcome", 5),
        ];
        let thread = decorate_thread(msgs, id(homeowner));
        assert_eq!(thread[0].sender_alias, None);
        // The homeowner took label "1" through the content heuristic.
        assert_eq!(thread[1].sender_label.as_deref(), Some("2"));
        assert_eq!(thread[1].sender_alias.as_deref(), Some("Contractor B"));
    }

    #[test]
    fn new_message_validation() {
        let msg = NewMessage {
            project_id: id(1),
            contractor_id: id(2),
            sender_id: id(3),
            content: String::new(),
            attachments: vec![MessageAttachment {
                filename: "plan.pdf".into(),
                url: "not a url".into(),
                media_type: None,
            }],
            metadata: json!({}),
        };
        let errs = msg.validate().unwrap_err();
        let violations = crate::validation::from_validator(&errs);
        assert!(violations.iter().any(|v| v.field == "content"));
        assert!(violations.iter().any(|v| v.field == "attachments[0].url"));
    }
}
