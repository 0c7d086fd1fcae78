use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    MalformedRequest,
    InvalidInput,
    FetchAttachedIdsFailed,
    PersistFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::MalformedRequest => "E2001",
            Self::InvalidInput => "E2002",
            Self::FetchAttachedIdsFailed => "E3001",
            Self::PersistFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Attachment store not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::MalformedRequest => "Malformed attachment request",
            Self::InvalidInput => "Request body could not be parsed",
            Self::FetchAttachedIdsFailed => "Could not read alerts attached to the case",
            Self::PersistFailed => "Attachment write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `caselink attach` once to create the store."),
            Self::ConfigParseError => Some("Fix syntax in .caselink/config.toml and retry."),
            Self::MalformedRequest => {
                Some("Give `alertId` and `index` the same number of entries.")
            }
            Self::InvalidInput => Some(
                "Pass a JSON object or array of objects tagged with `\"type\": \"user\"` or `\"alert\"`.",
            ),
            Self::FetchAttachedIdsFailed | Self::PersistFailed => {
                Some("Retry the whole request; nothing was partially written.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure reported by a storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored attachment is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Record cannot be stored as given.
    #[error("invalid attachment record {id}: {reason}")]
    InvalidRecord { id: String, reason: &'static str },

    /// Backend refused or could not serve the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by [`crate::orchestrator::CaseAttachments`].
///
/// Collaborator failures are wrapped, never retried or recovered.
#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    #[error("failed to fetch alert ids attached to case {case_id}: {source}")]
    FetchAttachedIdsFailed {
        case_id: String,
        #[source]
        source: StoreError,
    },

    #[error(
        "attachment {attachment_id}: alertId has {alert_ids} entries but index has {indices}"
    )]
    MalformedRequest {
        attachment_id: String,
        alert_ids: usize,
        indices: usize,
    },

    #[error("failed to persist attachments for case {case_id}: {source}")]
    PersistFailed {
        case_id: String,
        #[source]
        source: StoreError,
    },
}

impl AttachError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::FetchAttachedIdsFailed { .. } => ErrorCode::FetchAttachedIdsFailed,
            Self::MalformedRequest { .. } => ErrorCode::MalformedRequest,
            Self::PersistFailed { .. } => ErrorCode::PersistFailed,
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
