//! Turn dedup results into persistable records.

use crate::dedup::Deduped;
use crate::model::{
    AttachmentAttributes, AttachmentBody, PersistableAttachment, Reference, UserProfile,
};
use chrono::{DateTime, Utc};

/// Call-level metadata stamped onto every record built in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteContext {
    pub created_at: DateTime<Utc>,
    pub created_by: UserProfile,
}

impl WriteContext {
    #[must_use]
    pub const fn new(created_at: DateTime<Utc>, created_by: UserProfile) -> Self {
        Self {
            created_at,
            created_by,
        }
    }

    /// Context stamped with the current wall clock.
    #[must_use]
    pub fn now(created_by: UserProfile) -> Self {
        Self::new(Utc::now(), created_by)
    }
}

/// Outcome of [`build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Built {
    Record(PersistableAttachment),
    /// Alert item with no surviving pairs; contributes nothing.
    Drop,
}

impl Built {
    #[must_use]
    pub fn into_record(self) -> Option<PersistableAttachment> {
        match self {
            Self::Record(record) => Some(record),
            Self::Drop => None,
        }
    }
}

/// Build the record for `attachment_id` on `case_id`.
///
/// Alert records carry only the surviving pairs, never the request's full
/// arrays. Comments are always built.
#[must_use]
pub fn build(
    attachment_id: &str,
    case_id: &str,
    deduped: Deduped<'_>,
    ctx: &WriteContext,
) -> Built {
    let (body, owner) = match deduped {
        Deduped::Comment(comment) => (
            AttachmentBody::User {
                comment: comment.comment.clone(),
            },
            comment.owner.clone(),
        ),
        Deduped::Alerts { surviving, .. } if surviving.is_empty() => return Built::Drop,
        Deduped::Alerts { request, surviving } => (
            AttachmentBody::Alert {
                alert_id: surviving.alert_ids,
                index: surviving.indices,
                rule: request.rule.clone(),
            },
            request.owner.clone(),
        ),
    };

    Built::Record(PersistableAttachment {
        id: attachment_id.to_string(),
        attributes: AttachmentAttributes {
            body,
            owner,
            created_at: ctx.created_at,
            created_by: ctx.created_by.clone(),
            pushed_at: None,
            pushed_by: None,
            updated_at: None,
            updated_by: None,
        },
        references: vec![Reference::case(case_id)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::SurvivingAlerts;
    use crate::model::{AlertReference, AlertRule, AttachmentKind, OneOrMany, UserComment};
    use chrono::TimeZone;

    fn ctx() -> WriteContext {
        WriteContext::new(
            Utc.with_ymd_and_hms(2023, 4, 7, 12, 18, 36)
                .single()
                .expect("valid timestamp"),
            UserProfile::named("damaged_raccoon"),
        )
    }

    fn alert_request() -> AlertReference {
        AlertReference {
            alert_id: OneOrMany::from(["a1", "a2", "a3"]),
            index: OneOrMany::from(["i1", "i2", "i3"]),
            owner: "securitySolution".to_string(),
            rule: AlertRule {
                id: "rule-id-1".to_string(),
                name: "rule-name-1".to_string(),
            },
        }
    }

    #[test]
    fn comment_builds_unmodified() {
        let comment = UserComment {
            comment: "Wow, good luck catching that bad meanie!".to_string(),
            owner: "securitySolution".to_string(),
        };
        let built = build("comment-1", "case-1", Deduped::Comment(&comment), &ctx());
        let record = built.into_record().expect("comment always builds");

        assert_eq!(record.id, "comment-1");
        assert_eq!(record.kind(), AttachmentKind::User);
        assert_eq!(
            record.attributes.body,
            AttachmentBody::User {
                comment: comment.comment.clone()
            }
        );
        assert_eq!(record.attributes.owner, "securitySolution");
        assert_eq!(record.attributes.created_by.username, "damaged_raccoon");
        assert!(record.attributes.pushed_at.is_none());
        assert!(record.attributes.updated_by.is_none());
        assert_eq!(record.references, vec![Reference::case("case-1")]);
    }

    #[test]
    fn alert_record_carries_only_survivors() {
        let request = alert_request();
        let surviving = SurvivingAlerts {
            alert_ids: vec!["a1".to_string(), "a3".to_string()],
            indices: vec!["i1".to_string(), "i3".to_string()],
        };
        let built = build(
            "comment-2",
            "case-1",
            Deduped::Alerts {
                request: &request,
                surviving,
            },
            &ctx(),
        );
        let record = built.into_record().expect("survivors build a record");

        match record.attributes.body {
            AttachmentBody::Alert {
                alert_id,
                index,
                rule,
            } => {
                assert_eq!(alert_id, vec!["a1", "a3"]);
                assert_eq!(index, vec!["i1", "i3"]);
                assert_eq!(rule, request.rule);
            }
            AttachmentBody::User { .. } => panic!("expected alert body"),
        }
        assert_eq!(record.references[0].id, "case-1");
    }

    #[test]
    fn empty_survivors_drop() {
        let request = alert_request();
        let built = build(
            "comment-3",
            "case-1",
            Deduped::Alerts {
                request: &request,
                surviving: SurvivingAlerts::default(),
            },
            &ctx(),
        );
        assert_eq!(built, Built::Drop);
        assert!(built.into_record().is_none());
    }
}
