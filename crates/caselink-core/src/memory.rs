//! In-memory attachment store that records every collaborator call.
//!
//! Useful for tests and dry runs: callers can seed alert ids as already
//! attached, inject a failure on a chosen operation, and afterwards inspect
//! exactly which persistence calls happened.

use crate::dedup::AttachedAlertSet;
use crate::error::StoreError;
use crate::model::PersistableAttachment;
use crate::store::{AttachedAlertIndex, AttachmentPersistence};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

/// Operation to fail on the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Fetch,
    Create,
    BulkCreate,
}

/// Log of collaborator calls seen by a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    pub fetches: Vec<String>,
    pub creates: Vec<PersistableAttachment>,
    pub bulk_creates: Vec<Vec<PersistableAttachment>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    seeded: RefCell<HashMap<String, HashSet<String>>>,
    records: RefCell<Vec<PersistableAttachment>>,
    calls: RefCell<CallLog>,
    fail_on: Cell<Option<FailOn>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `alert_ids` as already attached to `case_id`.
    pub fn seed_attached<I, S>(&self, case_id: &str, alert_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seeded
            .borrow_mut()
            .entry(case_id.to_string())
            .or_default()
            .extend(alert_ids.into_iter().map(Into::into));
    }

    /// Fail the next call of `op`, once.
    pub fn fail_next(&self, op: FailOn) {
        self.fail_on.set(Some(op));
    }

    /// Snapshot of calls made so far.
    #[must_use]
    pub fn calls(&self) -> CallLog {
        self.calls.borrow().clone()
    }

    /// Forget recorded calls, keeping stored records.
    pub fn clear_calls(&self) {
        *self.calls.borrow_mut() = CallLog::default();
    }

    /// Records stored for `case_id`, in write order.
    #[must_use]
    pub fn records_for(&self, case_id: &str) -> Vec<PersistableAttachment> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.case_id() == Some(case_id))
            .cloned()
            .collect()
    }

    fn take_failure(&self, op: FailOn) -> Result<(), StoreError> {
        if self.fail_on.get() == Some(op) {
            self.fail_on.set(None);
            return Err(StoreError::Unavailable(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

impl AttachedAlertIndex for MemoryStore {
    fn get_all_alert_ids(&self, case_id: &str) -> Result<AttachedAlertSet, StoreError> {
        self.calls.borrow_mut().fetches.push(case_id.to_string());
        self.take_failure(FailOn::Fetch)?;

        let mut ids: HashSet<String> = self
            .seeded
            .borrow()
            .get(case_id)
            .cloned()
            .unwrap_or_default();
        for record in self.records.borrow().iter() {
            if record.case_id() == Some(case_id) {
                ids.extend(record.alert_ids().iter().cloned());
            }
        }
        Ok(AttachedAlertSet::new(ids))
    }
}

impl AttachmentPersistence for MemoryStore {
    fn create(&self, record: &PersistableAttachment) -> Result<PersistableAttachment, StoreError> {
        self.calls.borrow_mut().creates.push(record.clone());
        self.take_failure(FailOn::Create)?;

        self.records.borrow_mut().push(record.clone());
        Ok(record.clone())
    }

    fn bulk_create(
        &self,
        records: &[PersistableAttachment],
    ) -> Result<Vec<PersistableAttachment>, StoreError> {
        self.calls.borrow_mut().bulk_creates.push(records.to_vec());
        self.take_failure(FailOn::BulkCreate)?;

        self.records.borrow_mut().extend_from_slice(records);
        Ok(records.to_vec())
    }
}
