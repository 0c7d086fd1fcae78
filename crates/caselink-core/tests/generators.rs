use caselink_core::model::{
    AlertReference, AlertRule, AttachmentRequest, NewAttachment, OneOrMany, UserComment,
};
use proptest::prelude::*;

/// Alert ids drawn from a small alphabet so batches collide often.
pub fn arb_alert_id() -> impl Strategy<Value = String> + Clone {
    (0u8..10).prop_map(|n| format!("a{n}"))
}

pub fn arb_request() -> impl Strategy<Value = AttachmentRequest> {
    prop_oneof![
        1 => "[a-z ]{0,16}".prop_map(|comment| AttachmentRequest::User(UserComment {
            comment,
            owner: "cases".to_string(),
        })),
        3 => prop::collection::vec(arb_alert_id(), 0..6).prop_map(|ids| {
            let indices = (0..ids.len()).map(|pos| format!("index-{pos}")).collect();
            AttachmentRequest::Alert(AlertReference {
                alert_id: OneOrMany::Many(ids),
                index: OneOrMany::Many(indices),
                owner: "securitySolution".to_string(),
                rule: AlertRule {
                    id: "rule-id".to_string(),
                    name: "rule-name".to_string(),
                },
            })
        }),
    ]
}

/// A batch whose attachment ids are `item-<position>`.
pub fn arb_batch() -> impl Strategy<Value = Vec<NewAttachment>> {
    prop::collection::vec(arb_request(), 0..8).prop_map(|requests| {
        requests
            .into_iter()
            .enumerate()
            .map(|(pos, request)| NewAttachment::new(format!("item-{pos}"), request))
            .collect()
    })
}

pub fn arb_attached() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_alert_id(), 0..6)
}
