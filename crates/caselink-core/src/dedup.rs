//! Order-preserving alert dedup.
//!
//! An alert id survives iff it is neither in the case's [`AttachedAlertSet`]
//! snapshot nor in the [`BatchConsumedSet`] accumulated so far in the current
//! call. Every surviving id is added to the consumed set immediately, so a
//! repeat later in the same item, or in any later item of the batch, is
//! dropped. The consumed set is threaded by value from item to item and never
//! outlives the call that created it.
//!
//! User comments pass through untouched and leave the consumed set as-is.

use crate::error::AttachError;
use crate::model::{AlertReference, AttachmentRequest, NewAttachment, UserComment};
use std::collections::HashSet;

/// Alert ids already attached to a case, captured once per call.
///
/// Read-only after construction: nothing in a call can refresh it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachedAlertSet {
    ids: HashSet<String>,
}

impl AttachedAlertSet {
    #[must_use]
    pub fn new(ids: HashSet<String>) -> Self {
        Self { ids }
    }

    #[must_use]
    pub fn contains(&self, alert_id: &str) -> bool {
        self.ids.contains(alert_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in ascending order, for display.
    #[must_use]
    pub fn sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl<S: Into<String>> FromIterator<S> for AttachedAlertSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Alert ids claimed by earlier items of the batch in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchConsumedSet {
    ids: HashSet<String>,
}

impl BatchConsumedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, alert_id: &str) -> bool {
        self.ids.contains(alert_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns `true` if the id was not yet consumed.
    fn claim(&mut self, alert_id: &str) -> bool {
        self.ids.insert(alert_id.to_string())
    }
}

/// Alert id/index pairs left after dedup, still position-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurvivingAlerts {
    pub alert_ids: Vec<String>,
    pub indices: Vec<String>,
}

impl SurvivingAlerts {
    #[must_use]
    pub fn len(&self) -> usize {
        self.alert_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alert_ids.is_empty()
    }
}

/// Per-item result of [`dedupe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deduped<'a> {
    /// A user comment, passed through unchanged.
    Comment(&'a UserComment),
    /// An alert reference with its surviving pairs (possibly none).
    Alerts {
        request: &'a AlertReference,
        surviving: SurvivingAlerts,
    },
}

/// Filter one request against the attached snapshot and the batch
/// accumulator, returning the per-item result and the updated accumulator.
///
/// # Errors
///
/// Returns [`AttachError::MalformedRequest`] when an alert request's
/// `alertId` and `index` lengths differ.
pub fn dedupe<'a>(
    item: &'a NewAttachment,
    attached: &AttachedAlertSet,
    mut consumed: BatchConsumedSet,
) -> Result<(Deduped<'a>, BatchConsumedSet), AttachError> {
    let alert = match &item.request {
        AttachmentRequest::User(comment) => return Ok((Deduped::Comment(comment), consumed)),
        AttachmentRequest::Alert(alert) => alert,
    };

    let mut surviving = SurvivingAlerts::default();
    for (alert_id, index) in alert.pairs(&item.id)? {
        if attached.contains(alert_id) {
            continue;
        }
        if !consumed.claim(alert_id) {
            continue;
        }
        surviving.alert_ids.push(alert_id.to_string());
        surviving.indices.push(index.to_string());
    }

    Ok((
        Deduped::Alerts {
            request: alert,
            surviving,
        },
        consumed,
    ))
}
