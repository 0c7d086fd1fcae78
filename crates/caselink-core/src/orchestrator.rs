//! Single and batch attachment flows for one case.
//!
//! Each call snapshots the case's attached alert ids exactly once, threads a
//! fresh [`BatchConsumedSet`] through the items in input order, and then makes
//! at most one persistence call. If nothing survives dedup the persistence
//! collaborator is not called at all. Collaborator failures propagate as-is;
//! there is no retry and no partial commit.

use crate::builder::{self, Built, WriteContext};
use crate::dedup::{self, AttachedAlertSet, BatchConsumedSet};
use crate::error::AttachError;
use crate::model::{NewAttachment, PersistableAttachment};
use crate::store::{AttachedAlertIndex, AttachmentPersistence};
use tracing::{debug, info, warn};

/// Result of [`CaseAttachments::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(PersistableAttachment),
    /// Every alert in the request was already attached; nothing was written.
    NotCreated,
}

/// Result of [`CaseAttachments::bulk_create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkCreateOutcome {
    /// Persisted records, in input order with dropped items omitted.
    pub attachments: Vec<PersistableAttachment>,
    /// Whether the persistence collaborator was called.
    pub persisted: bool,
}

/// Attachment operations bound to one case.
pub struct CaseAttachments<'a> {
    case_id: String,
    index: &'a dyn AttachedAlertIndex,
    persistence: &'a dyn AttachmentPersistence,
}

impl<'a> CaseAttachments<'a> {
    pub fn new(
        case_id: impl Into<String>,
        index: &'a dyn AttachedAlertIndex,
        persistence: &'a dyn AttachmentPersistence,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            index,
            persistence,
        }
    }

    #[must_use]
    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    /// Attach a single item.
    ///
    /// # Errors
    ///
    /// - [`AttachError::MalformedRequest`] for misaligned alert pairs
    /// - [`AttachError::FetchAttachedIdsFailed`] if the snapshot lookup fails
    /// - [`AttachError::PersistFailed`] if the single `create` call fails
    pub fn create(
        &self,
        attachment: &NewAttachment,
        ctx: &WriteContext,
    ) -> Result<CreateOutcome, AttachError> {
        attachment.request.validate(&attachment.id)?;
        let attached = self.snapshot()?;

        let (deduped, _) = dedup::dedupe(attachment, &attached, BatchConsumedSet::new())?;
        let Built::Record(record) = builder::build(&attachment.id, &self.case_id, deduped, ctx)
        else {
            debug!(
                case_id = %self.case_id,
                attachment_id = %attachment.id,
                "all alerts already attached; skipping create"
            );
            return Ok(CreateOutcome::NotCreated);
        };

        let created = self.persistence.create(&record).map_err(|source| {
            warn!(case_id = %self.case_id, error = %source, "attachment create failed");
            AttachError::PersistFailed {
                case_id: self.case_id.clone(),
                source,
            }
        })?;
        info!(case_id = %self.case_id, attachment_id = %created.id, "attachment created");
        Ok(CreateOutcome::Created(created))
    }

    /// Attach an ordered batch with a single persistence round trip.
    ///
    /// # Errors
    ///
    /// - [`AttachError::MalformedRequest`] for the first misaligned item
    /// - [`AttachError::FetchAttachedIdsFailed`] if the snapshot lookup fails
    /// - [`AttachError::PersistFailed`] if the `bulk_create` call fails
    pub fn bulk_create(
        &self,
        attachments: &[NewAttachment],
        ctx: &WriteContext,
    ) -> Result<BulkCreateOutcome, AttachError> {
        for attachment in attachments {
            attachment.request.validate(&attachment.id)?;
        }
        let attached = self.snapshot()?;

        let (records, consumed) = attachments.iter().try_fold(
            (Vec::with_capacity(attachments.len()), BatchConsumedSet::new()),
            |(mut records, consumed), attachment| {
                let (deduped, consumed) = dedup::dedupe(attachment, &attached, consumed)?;
                match builder::build(&attachment.id, &self.case_id, deduped, ctx) {
                    Built::Record(record) => records.push(record),
                    Built::Drop => debug!(
                        case_id = %self.case_id,
                        attachment_id = %attachment.id,
                        "dropping alert attachment with no new alerts"
                    ),
                }
                Ok::<_, AttachError>((records, consumed))
            },
        )?;

        debug!(
            case_id = %self.case_id,
            requested = attachments.len(),
            surviving = records.len(),
            new_alerts = consumed.len(),
            "batch dedup complete"
        );

        if records.is_empty() {
            return Ok(BulkCreateOutcome::default());
        }

        let persisted = self.persistence.bulk_create(&records).map_err(|source| {
            warn!(case_id = %self.case_id, error = %source, "attachment bulk create failed");
            AttachError::PersistFailed {
                case_id: self.case_id.clone(),
                source,
            }
        })?;
        info!(
            case_id = %self.case_id,
            count = persisted.len(),
            "attachments created"
        );
        Ok(BulkCreateOutcome {
            attachments: persisted,
            persisted: true,
        })
    }

    fn snapshot(&self) -> Result<AttachedAlertSet, AttachError> {
        self.index
            .get_all_alert_ids(&self.case_id)
            .map_err(|source| {
                warn!(case_id = %self.case_id, error = %source, "attached alert lookup failed");
                AttachError::FetchAttachedIdsFailed {
                    case_id: self.case_id.clone(),
                    source,
                }
            })
    }
}
