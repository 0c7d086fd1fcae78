//! [`SqliteStore`]: attachment persistence and attached-alert lookup.

use crate::dedup::AttachedAlertSet;
use crate::error::StoreError;
use crate::model::{AttachmentBody, PersistableAttachment};
use crate::store::{AttachedAlertIndex, AttachmentPersistence};
use rusqlite::{Connection, params};
use std::collections::HashSet;
use tracing::debug;

/// Attachment store over a single SQLite connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap an already configured and migrated connection.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Fresh migrated in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot open or migrate the database.
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        super::migrations::migrate(&mut conn)?;
        Ok(Self::new(conn))
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// All records attached to `case_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the query fails or a stored record does
    /// not parse.
    pub fn list_for_case(&self, case_id: &str) -> Result<Vec<PersistableAttachment>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT record_json FROM case_attachments WHERE case_id = ?1 ORDER BY seq ASC",
        )?;
        let rows = stmt.query_map(params![case_id], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str(&row?)?);
        }
        Ok(records)
    }

    fn insert(conn: &Connection, record: &PersistableAttachment) -> Result<(), StoreError> {
        let case_id = record.case_id().ok_or_else(|| StoreError::InvalidRecord {
            id: record.id.clone(),
            reason: "missing case reference",
        })?;
        let record_json = serde_json::to_string(record)?;

        conn.execute(
            "INSERT INTO case_attachments
                (attachment_id, case_id, kind, owner, created_at_us, record_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                case_id,
                record.kind().as_str(),
                record.attributes.owner,
                record.attributes.created_at.timestamp_micros(),
                record_json,
            ],
        )?;

        if let AttachmentBody::Alert {
            alert_id, index, ..
        } = &record.attributes.body
        {
            let mut stmt = conn.prepare_cached(
                "INSERT INTO case_attachment_alerts
                    (attachment_id, position, case_id, alert_id, alert_index)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, (alert, idx)) in alert_id.iter().zip(index).enumerate() {
                let position = i64::try_from(position).map_err(|_| StoreError::InvalidRecord {
                    id: record.id.clone(),
                    reason: "too many alerts",
                })?;
                stmt.execute(params![record.id, position, case_id, alert, idx])?;
            }
        }
        Ok(())
    }
}

impl AttachedAlertIndex for SqliteStore {
    fn get_all_alert_ids(&self, case_id: &str) -> Result<AttachedAlertSet, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT DISTINCT alert_id FROM case_attachment_alerts WHERE case_id = ?1")?;
        let ids = stmt
            .query_map(params![case_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()?;
        debug!(case_id, attached = ids.len(), "loaded attached alert ids");
        Ok(AttachedAlertSet::new(ids))
    }
}

impl AttachmentPersistence for SqliteStore {
    fn create(&self, record: &PersistableAttachment) -> Result<PersistableAttachment, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        Self::insert(&tx, record)?;
        tx.commit()?;
        Ok(record.clone())
    }

    fn bulk_create(
        &self,
        records: &[PersistableAttachment],
    ) -> Result<Vec<PersistableAttachment>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        for record in records {
            Self::insert(&tx, record)?;
        }
        tx.commit()?;
        Ok(records.to_vec())
    }
}
