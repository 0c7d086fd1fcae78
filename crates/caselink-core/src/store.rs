//! Storage collaborator contracts consumed by the orchestrator.
//!
//! Implementations: [`crate::memory::MemoryStore`] and
//! [`crate::db::SqliteStore`].

use crate::dedup::AttachedAlertSet;
use crate::error::StoreError;
use crate::model::PersistableAttachment;

/// Lookup of alert ids already attached to a case.
pub trait AttachedAlertIndex {
    /// All alert ids currently attached to `case_id`. No side effects.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the lookup fails.
    fn get_all_alert_ids(&self, case_id: &str) -> Result<AttachedAlertSet, StoreError>;
}

/// Write side of the attachment store.
pub trait AttachmentPersistence {
    /// Persist one record.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the write fails.
    fn create(&self, record: &PersistableAttachment) -> Result<PersistableAttachment, StoreError>;

    /// Persist an ordered batch. Either every record is written or none is.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the write fails.
    fn bulk_create(
        &self,
        records: &[PersistableAttachment],
    ) -> Result<Vec<PersistableAttachment>, StoreError>;
}
