//! Draft events
//!
//! Raised by the draft aggregate as it changes; drained by the controller
//! and logged.

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{FieldName, FormType};

#[derive(Clone, Debug, PartialEq)]
pub enum DraftEvent {
    FieldChanged {
        field: FieldName,
        index: Option<usize>,
    },

    EntryAdded {
        field: FieldName,
        count: usize,
    },

    EntryRemoved {
        field: FieldName,
        index: usize,
        count: usize,
    },

    ImageStaged {
        file_name: String,
        size: u64,
    },

    ImageRejected {
        reason: String,
    },

    AsyncCheckCompleted {
        field: FieldName,
        available: bool,
    },

    UploadCompleted {
        url: String,
    },

    UploadFailed {
        reason: String,
    },

    Submitted {
        form_type: FormType,
        submitted_at: DateTime<Utc>,
    },

    SubmitFailed {
        form_type: FormType,
        reason: String,
    },
}

impl DraftEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::FieldChanged { .. } => "draft.field_changed",
            Self::EntryAdded { .. } => "draft.entry_added",
            Self::EntryRemoved { .. } => "draft.entry_removed",
            Self::ImageStaged { .. } => "draft.image_staged",
            Self::ImageRejected { .. } => "draft.image_rejected",
            Self::AsyncCheckCompleted { .. } => "draft.async_check_completed",
            Self::UploadCompleted { .. } => "draft.upload_completed",
            Self::UploadFailed { .. } => "draft.upload_failed",
            Self::Submitted { .. } => "draft.submitted",
            Self::SubmitFailed { .. } => "draft.submit_failed",
        }
    }
}
