//! Persistable attachment records.
//!
//! Serialized shape (alert kind shown):
//!
//! ```text
//! { "id": "comment-1",
//!   "attributes": { "type": "alert", "alertId": [...], "index": [...], "rule": {...},
//!                   "owner": "...", "created_at": "...", "created_by": {...},
//!                   "pushed_at": null, "pushed_by": null,
//!                   "updated_at": null, "updated_by": null },
//!   "references": [ { "id": "<case id>", "name": "associated-cases", "type": "cases" } ] }
//! ```

use super::request::AlertRule;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference name linking an attachment to its case.
pub const CASE_REFERENCE_NAME: &str = "associated-cases";

/// Reference type for case associations.
pub const CASE_REFERENCE_TYPE: &str = "cases";

/// Attachment kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    User,
    Alert,
}

impl AttachmentKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Alert => "alert",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_uid: Option<String>,
}

impl UserProfile {
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            full_name: None,
            email: None,
            profile_uid: None,
        }
    }
}

/// Kind-specific attribute payload, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttachmentBody {
    User {
        comment: String,
    },
    Alert {
        #[serde(rename = "alertId")]
        alert_id: Vec<String>,
        index: Vec<String>,
        rule: AlertRule,
    },
}

impl AttachmentBody {
    #[must_use]
    pub const fn kind(&self) -> AttachmentKind {
        match self {
            Self::User { .. } => AttachmentKind::User,
            Self::Alert { .. } => AttachmentKind::Alert,
        }
    }
}

/// Stored attributes of an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentAttributes {
    #[serde(flatten)]
    pub body: AttachmentBody,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub created_by: UserProfile,
    pub pushed_at: Option<DateTime<Utc>>,
    pub pushed_by: Option<UserProfile>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserProfile>,
}

/// Association entry linking a record to another object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ref_type: String,
}

impl Reference {
    /// The fixed entry tying an attachment to `case_id`.
    pub fn case(case_id: impl Into<String>) -> Self {
        Self {
            id: case_id.into(),
            name: CASE_REFERENCE_NAME.to_string(),
            ref_type: CASE_REFERENCE_TYPE.to_string(),
        }
    }
}

/// A record ready to hand to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistableAttachment {
    pub id: String,
    pub attributes: AttachmentAttributes,
    pub references: Vec<Reference>,
}

impl PersistableAttachment {
    #[must_use]
    pub const fn kind(&self) -> AttachmentKind {
        self.attributes.body.kind()
    }

    /// Case id from the case-association reference, if present.
    #[must_use]
    pub fn case_id(&self) -> Option<&str> {
        self.references
            .iter()
            .find(|r| r.name == CASE_REFERENCE_NAME && r.ref_type == CASE_REFERENCE_TYPE)
            .map(|r| r.id.as_str())
    }

    /// Alert ids carried by this record; empty for user comments.
    #[must_use]
    pub fn alert_ids(&self) -> &[String] {
        match &self.attributes.body {
            AttachmentBody::Alert { alert_id, .. } => alert_id.as_slice(),
            AttachmentBody::User { .. } => &[],
        }
    }
}

/// Derive a short stable attachment id from the case, a timestamp, the
/// position within its batch, and the request payload.
#[must_use]
pub fn derive_attachment_id(
    case_id: &str,
    created_at: DateTime<Utc>,
    position: usize,
    payload: &str,
) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(case_id.as_bytes());
    hasher.update(&created_at.timestamp_micros().to_le_bytes());
    hasher.update(&(position as u64).to_le_bytes());
    hasher.update(payload.as_bytes());
    let hex = hasher.finalize().to_hex();
    format!("att-{}", &hex[..12])
}
