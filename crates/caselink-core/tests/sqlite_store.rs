//! Orchestrator flows against the SQLite store on disk.

use caselink_core::db::{self, SqliteStore};
use caselink_core::model::{
    AlertReference, AlertRule, AttachmentRequest, NewAttachment, OneOrMany, UserComment,
    UserProfile,
};
use caselink_core::store::AttachedAlertIndex;
use caselink_core::{AttachError, CaseAttachments, CreateOutcome, WriteContext};

fn ctx() -> WriteContext {
    WriteContext::now(UserProfile::named("analyst"))
}

fn alerts(id: &str, ids: &[&str]) -> NewAttachment {
    NewAttachment::new(
        id,
        AttachmentRequest::Alert(AlertReference {
            alert_id: OneOrMany::Many(ids.iter().map(|s| (*s).to_string()).collect()),
            index: OneOrMany::Many(ids.iter().map(|s| format!(".alerts-{s}")).collect()),
            owner: "securitySolution".to_string(),
            rule: AlertRule {
                id: "rule-1".to_string(),
                name: "Suspicious login".to_string(),
            },
        }),
    )
}

fn comment(id: &str, text: &str) -> NewAttachment {
    NewAttachment::new(
        id,
        AttachmentRequest::User(UserComment {
            comment: text.to_string(),
            owner: "securitySolution".to_string(),
        }),
    )
}

fn open(dir: &tempfile::TempDir) -> SqliteStore {
    db::open_store(&dir.path().join(".caselink/caselink.db")).expect("open store")
}

#[test]
fn batches_dedup_against_previous_calls() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = open(&dir);
    let cases = CaseAttachments::new("case-42", &store, &store);

    let first = cases
        .bulk_create(
            &[comment("c1", "triage started"), alerts("c2", &["a1", "a2"])],
            &ctx(),
        )
        .expect("first batch");
    assert_eq!(first.attachments.len(), 2);

    let second = cases
        .bulk_create(
            &[alerts("c3", &["a2", "a3"]), alerts("c4", &["a1"])],
            &ctx(),
        )
        .expect("second batch");
    assert_eq!(second.attachments.len(), 1);
    assert_eq!(second.attachments[0].id, "c3");
    assert_eq!(second.attachments[0].alert_ids(), ["a3".to_string()]);

    let listed = store.list_for_case("case-42").expect("list");
    let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
    assert_eq!(
        store.get_all_alert_ids("case-42").expect("fetch").sorted(),
        vec!["a1", "a2", "a3"]
    );
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    {
        let store = open(&dir);
        let cases = CaseAttachments::new("case-42", &store, &store);
        cases
            .create(&alerts("c1", &["a1"]), &ctx())
            .expect("create");
    }

    let store = open(&dir);
    let cases = CaseAttachments::new("case-42", &store, &store);
    let outcome = cases
        .create(&alerts("c2", &["a1"]), &ctx())
        .expect("create");
    assert_eq!(outcome, CreateOutcome::NotCreated);
}

#[test]
fn other_cases_do_not_dedup_each_other() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = open(&dir);

    CaseAttachments::new("case-a", &store, &store)
        .create(&alerts("c1", &["a1"]), &ctx())
        .expect("create in case-a");
    let outcome = CaseAttachments::new("case-b", &store, &store)
        .create(&alerts("c2", &["a1"]), &ctx())
        .expect("create in case-b");

    assert!(matches!(outcome, CreateOutcome::Created(_)));
}

#[test]
fn failed_batch_leaves_store_untouched() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = open(&dir);
    let cases = CaseAttachments::new("case-42", &store, &store);
    cases
        .create(&comment("c1", "existing"), &ctx())
        .expect("seed");

    // Reusing an attachment id violates the store's uniqueness constraint.
    let err = cases
        .bulk_create(&[alerts("c2", &["a1"]), comment("c1", "again")], &ctx())
        .expect_err("duplicate id");
    assert!(matches!(err, AttachError::PersistFailed { .. }));

    assert_eq!(store.list_for_case("case-42").expect("list").len(), 1);
    assert!(store.get_all_alert_ids("case-42").expect("fetch").is_empty());
}
