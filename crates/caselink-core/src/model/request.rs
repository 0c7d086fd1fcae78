//! Caller-supplied attachment requests.
//!
//! Requests arrive as JSON shaped like
//!
//! ```text
//! { "type": "user",  "comment": "...", "owner": "..." }
//! { "type": "alert", "alertId": "a1" | ["a1", ...], "index": "i1" | ["i1", ...],
//!   "owner": "...", "rule": { "id": "...", "name": "..." } }
//! ```
//!
//! Scalar `alertId`/`index` values are normalized to single-element sequences
//! by [`AlertReference::pairs`].

use crate::error::AttachError;
use serde::{Deserialize, Serialize};

/// One value or a list of values, as accepted on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// View as an ordered slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany {
    fn from(values: [&str; N]) -> Self {
        Self::Many(values.iter().map(|v| (*v).to_string()).collect())
    }
}

/// Detection rule that raised the referenced alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
}

/// Free-text comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserComment {
    #[serde(alias = "text")]
    pub comment: String,
    pub owner: String,
}

/// One or more alerts, each paired with the index it was sourced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertReference {
    #[serde(rename = "alertId")]
    pub alert_id: OneOrMany,
    pub index: OneOrMany,
    pub owner: String,
    pub rule: AlertRule,
}

impl AlertReference {
    /// Position-aligned `(alert id, index)` pairs in request order.
    ///
    /// # Errors
    ///
    /// Returns [`AttachError::MalformedRequest`] when the normalized `alertId`
    /// and `index` sequences differ in length. Nothing is truncated.
    pub fn pairs<'a>(
        &'a self,
        attachment_id: &str,
    ) -> Result<impl Iterator<Item = (&'a str, &'a str)> + use<'a>, AttachError> {
        let ids = self.alert_id.as_slice();
        let indices = self.index.as_slice();
        if ids.len() != indices.len() {
            return Err(AttachError::MalformedRequest {
                attachment_id: attachment_id.to_string(),
                alert_ids: ids.len(),
                indices: indices.len(),
            });
        }
        Ok(ids
            .iter()
            .map(String::as_str)
            .zip(indices.iter().map(String::as_str)))
    }
}

/// Attachment request, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttachmentRequest {
    User(UserComment),
    Alert(AlertReference),
}

impl AttachmentRequest {
    #[must_use]
    pub fn owner(&self) -> &str {
        match self {
            Self::User(c) => c.owner.as_str(),
            Self::Alert(a) => a.owner.as_str(),
        }
    }

    /// Fail fast on a request that can never be persisted as-is.
    ///
    /// # Errors
    ///
    /// Returns [`AttachError::MalformedRequest`] for misaligned alert pairs.
    pub fn validate(&self, attachment_id: &str) -> Result<(), AttachError> {
        match self {
            Self::User(_) => Ok(()),
            Self::Alert(alert) => alert.pairs(attachment_id).map(|_| ()),
        }
    }
}

/// A request paired with the id its persisted record will carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttachment {
    pub id: String,
    #[serde(flatten)]
    pub request: AttachmentRequest,
}

impl NewAttachment {
    pub fn new(id: impl Into<String>, request: AttachmentRequest) -> Self {
        Self {
            id: id.into(),
            request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(ids: OneOrMany, indices: OneOrMany) -> AlertReference {
        AlertReference {
            alert_id: ids,
            index: indices,
            owner: "securitySolution".to_string(),
            rule: AlertRule {
                id: "rule-id-1".to_string(),
                name: "rule-name-1".to_string(),
            },
        }
    }

    #[test]
    fn scalar_alert_id_parses_as_one() {
        let json = r#"{
            "type": "alert",
            "alertId": "test-id-1",
            "index": "test-index-1",
            "owner": "securitySolution",
            "rule": { "id": "rule-id-1", "name": "rule-name-1" }
        }"#;
        let req: AttachmentRequest = serde_json::from_str(json).expect("parse alert");
        let AttachmentRequest::Alert(alert) = req else {
            panic!("expected alert request");
        };
        assert_eq!(alert.alert_id, OneOrMany::from("test-id-1"));
        let pairs: Vec<_> = alert.pairs("c1").expect("aligned").collect();
        assert_eq!(pairs, vec![("test-id-1", "test-index-1")]);
    }

    #[test]
    fn array_alert_id_keeps_order() {
        let json = r#"{
            "type": "alert",
            "alertId": ["a3", "a1", "a2"],
            "index": ["i3", "i1", "i2"],
            "owner": "o",
            "rule": { "id": "r", "name": "n" }
        }"#;
        let AttachmentRequest::Alert(alert) = serde_json::from_str(json).expect("parse") else {
            panic!("expected alert request");
        };
        let pairs: Vec<_> = alert.pairs("c1").expect("aligned").collect();
        assert_eq!(pairs, vec![("a3", "i3"), ("a1", "i1"), ("a2", "i2")]);
    }

    #[test]
    fn user_comment_accepts_text_alias() {
        let json = r#"{ "type": "user", "text": "hello", "owner": "cases" }"#;
        let req: AttachmentRequest = serde_json::from_str(json).expect("parse user");
        assert_eq!(
            req,
            AttachmentRequest::User(UserComment {
                comment: "hello".to_string(),
                owner: "cases".to_string(),
            })
        );
        assert_eq!(req.owner(), "cases");
    }

    #[test]
    fn unknown_type_is_rejected() {
        let json = r#"{ "type": "file", "owner": "cases" }"#;
        assert!(serde_json::from_str::<AttachmentRequest>(json).is_err());
    }

    #[test]
    fn mismatched_lengths_are_malformed() {
        let req = alert(OneOrMany::from(["a1", "a2"]), OneOrMany::from("i1"));
        let err = req.pairs("att-7").err().expect("should be malformed");
        match err {
            AttachError::MalformedRequest {
                attachment_id,
                alert_ids,
                indices,
            } => {
                assert_eq!(attachment_id, "att-7");
                assert_eq!(alert_ids, 2);
                assert_eq!(indices, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn user_requests_always_validate() {
        let req = AttachmentRequest::User(UserComment {
            comment: String::new(),
            owner: "o".to_string(),
        });
        assert!(req.validate("x").is_ok());
    }

    #[test]
    fn new_attachment_flattens_request() {
        let json = r#"{ "id": "comment-1", "type": "user", "comment": "hi", "owner": "o" }"#;
        let att: NewAttachment = serde_json::from_str(json).expect("parse");
        assert_eq!(att.id, "comment-1");
        assert!(matches!(att.request, AttachmentRequest::User(_)));
    }
}
