use caselink_core::memory::MemoryStore;
use caselink_core::model::{
    AttachmentBody, AttachmentRequest, NewAttachment, PersistableAttachment, UserProfile,
};
use caselink_core::{CaseAttachments, WriteContext};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

#[path = "generators.rs"]
mod generators;
use generators::*;

const CASE_ID: &str = "case-prop";

fn run_batch(attached: &[String], batch: &[NewAttachment]) -> (MemoryStore, Vec<PersistableAttachment>) {
    let store = MemoryStore::new();
    store.seed_attached(CASE_ID, attached.iter().cloned());
    let cases = CaseAttachments::new(CASE_ID, &store, &store);
    let outcome = cases
        .bulk_create(batch, &WriteContext::now(UserProfile::named("prop")))
        .expect("generated batches are well formed");
    (store, outcome.attachments)
}

fn request_of<'a>(batch: &'a [NewAttachment], id: &str) -> &'a AttachmentRequest {
    &batch
        .iter()
        .find(|a| a.id == id)
        .expect("record id comes from the batch")
        .request
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(2000))]

    #[test]
    fn attached_ids_never_persist(attached in arb_attached(), batch in arb_batch()) {
        let (_, records) = run_batch(&attached, &batch);
        for record in &records {
            for id in record.alert_ids() {
                prop_assert!(!attached.contains(id), "{id} was already attached");
            }
        }
    }

    #[test]
    fn surviving_pairs_keep_input_order(attached in arb_attached(), batch in arb_batch()) {
        let (_, records) = run_batch(&attached, &batch);
        for record in &records {
            let AttachmentBody::Alert { alert_id, index, .. } = &record.attributes.body else {
                continue;
            };
            let AttachmentRequest::Alert(request) = request_of(&batch, &record.id) else {
                panic!("alert record built from a non-alert request");
            };
            let input: Vec<(&String, &String)> = request
                .alert_id
                .as_slice()
                .iter()
                .zip(request.index.as_slice())
                .collect();

            // Each surviving pair must appear in the input strictly after the previous one.
            let mut cursor = 0;
            for pair in alert_id.iter().zip(index) {
                let offset = input[cursor..]
                    .iter()
                    .position(|candidate| *candidate == pair);
                prop_assert!(offset.is_some(), "pair {:?} out of order", pair);
                cursor += offset.unwrap_or_default() + 1;
            }
        }
    }

    #[test]
    fn each_new_id_lands_in_its_earliest_item(attached in arb_attached(), batch in arb_batch()) {
        let (_, records) = run_batch(&attached, &batch);

        let mut expected: HashMap<&str, &str> = HashMap::new();
        for item in &batch {
            if let AttachmentRequest::Alert(alert) = &item.request {
                for id in alert.alert_id.as_slice() {
                    if !attached.contains(id) {
                        expected.entry(id.as_str()).or_insert(item.id.as_str());
                    }
                }
            }
        }

        let mut seen: HashMap<&str, &str> = HashMap::new();
        for record in &records {
            for id in record.alert_ids() {
                prop_assert!(
                    seen.insert(id.as_str(), record.id.as_str()).is_none(),
                    "{id} persisted twice"
                );
            }
        }
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn dropped_items_leave_no_placeholder(attached in arb_attached(), batch in arb_batch()) {
        let (_, records) = run_batch(&attached, &batch);

        let record_ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        let input_order: Vec<&str> = batch
            .iter()
            .map(|a| a.id.as_str())
            .filter(|id| record_ids.contains(id))
            .collect();
        prop_assert_eq!(&record_ids, &input_order);

        for record in &records {
            if matches!(record.attributes.body, AttachmentBody::Alert { .. }) {
                prop_assert!(!record.alert_ids().is_empty());
            }
        }
    }

    #[test]
    fn persistence_runs_iff_something_survives(attached in arb_attached(), batch in arb_batch()) {
        let (store, records) = run_batch(&attached, &batch);
        let calls = store.calls();
        prop_assert_eq!(calls.fetches.len(), 1);
        prop_assert_eq!(calls.bulk_creates.len(), usize::from(!records.is_empty()));
    }

    #[test]
    fn user_comments_pass_through(attached in arb_attached(), batch in arb_batch()) {
        let (_, records) = run_batch(&attached, &batch);
        let persisted: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();

        for item in &batch {
            if let AttachmentRequest::User(comment) = &item.request {
                prop_assert!(persisted.contains(item.id.as_str()));
                let record = records
                    .iter()
                    .find(|r| r.id == item.id)
                    .expect("comment persisted");
                prop_assert_eq!(
                    &record.attributes.body,
                    &AttachmentBody::User { comment: comment.comment.clone() }
                );
            }
        }
    }
}
