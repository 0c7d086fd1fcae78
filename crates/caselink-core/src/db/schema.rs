//! SQLite schema for the attachment store.
//!
//! - `case_attachments` holds one row per persisted record, with the full
//!   record as JSON and the columns needed for listing
//! - `case_attachment_alerts` holds one row per alert id carried by an alert
//!   record, so the attached-id snapshot for a case is a single indexed query
//! - `store_meta` tracks the applied schema version

/// Migration v1: attachment tables plus store metadata.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS case_attachments (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    attachment_id TEXT NOT NULL UNIQUE CHECK (length(trim(attachment_id)) > 0),
    case_id TEXT NOT NULL CHECK (length(trim(case_id)) > 0),
    kind TEXT NOT NULL CHECK (kind IN ('user', 'alert')),
    owner TEXT NOT NULL,
    created_at_us INTEGER NOT NULL,
    record_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS case_attachment_alerts (
    attachment_id TEXT NOT NULL REFERENCES case_attachments(attachment_id) ON DELETE CASCADE,
    position INTEGER NOT NULL CHECK (position >= 0),
    case_id TEXT NOT NULL,
    alert_id TEXT NOT NULL,
    alert_index TEXT NOT NULL,
    PRIMARY KEY (attachment_id, position)
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 0);

CREATE INDEX IF NOT EXISTS idx_case_attachments_case_seq
    ON case_attachments(case_id, seq);

CREATE INDEX IF NOT EXISTS idx_case_attachment_alerts_case_alert
    ON case_attachment_alerts(case_id, alert_id);
"#;

/// Indexes every migrated store must have.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_case_attachments_case_seq",
    "idx_case_attachment_alerts_case_alert",
];
