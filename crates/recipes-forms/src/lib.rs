//! More Recipes Form Engine
//!
//! Client-side drafts for the five forms of the More Recipes application:
//! login, signup, review, add recipe and edit recipe.
//!
//! ## Architecture
//!
//! - **Domain Layer**: field schema, validation rules, submission mapping and
//!   the [`FormDraft`] aggregate
//! - **Ports Layer**: availability checks, image storage, submission dispatch
//!   and session tokens
//! - **Application Layer**: [`FormController`], which debounces async checks
//!   and sequences upload and dispatch on submit
//! - **Infrastructure Layer**: in-memory port implementations
//!
//! ## Flow
//!
//! ```text
//! user event ─► FormController ─► FormDraft ─► sync validation ─► validity
//!                     │                                              │
//!                     └─ blur ─► debounce ─► AvailabilityChecker      │
//!                                                                     ▼
//!        submit ─► ImageStorage::upload ─► submission::build ─► SubmissionSink
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{FormController, FormPorts};
pub use config::FormsConfig;
pub use domain::aggregates::{AsyncCheckTicket, DraftSnapshot, FormDraft, FormPhase, SubmitPlan, UploadJob, UploadTicket};
pub use domain::events::DraftEvent;
pub use domain::submission::{Credentials, HttpMethod, NewReview, NewUser, RecipePayload, Route, Submission};
pub use domain::value_objects::{
    Entry, ExistingRecipe, FieldErrors, FieldMap, FieldName, FieldValue, FormType, FormValues, ImageFile,
    ImagePolicy, ImagePreview, ImageRejection,
};
pub use ports::inbound::FormUseCases;
pub use ports::outbound::{
    Availability, AvailabilityChecker, CheckError, ImageStorage, SubmissionError, SubmissionSink, TokenStore,
    TokenStoreError, UploadError,
};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormsError {
    #[error("unknown form type: {0}")]
    UnknownFormType(String),

    #[error("unknown field: {0}")]
    UnknownFieldName(String),

    #[error("field {field} is not part of the {form_type} form")]
    FieldNotInForm { form_type: FormType, field: FieldName },

    #[error("field {0} is not repeatable")]
    NotRepeatable(FieldName),

    #[error("field {0} needs an entry index")]
    IndexRequired(FieldName),

    #[error("index {index} is out of bounds for {field} ({len} entries)")]
    IndexOutOfBounds { field: FieldName, index: usize, len: usize },

    #[error("form cannot be submitted: {0}")]
    SubmitNotAllowed(&'static str),

    #[error("{0} form needs an entity id")]
    MissingEntityId(FormType),

    #[error("{0}")]
    ImageRejected(ImageRejection),

    #[error("image upload failed: {0}")]
    Upload(String),

    #[error("image upload superseded by a newer selection")]
    UploadSuperseded,

    #[error("{0}")]
    Submission(SubmissionError),

    #[error("payload encoding failed: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, FormsError>;
