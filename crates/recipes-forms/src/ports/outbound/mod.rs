//! Outbound ports
//!
//! Hexagonal architecture: the services a draft talks to while it is being
//! filled in and submitted. HTTP adapters live in `recipes-client`; the
//! in-memory ones in [`crate::infrastructure::memory`].

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::submission::Submission;
use crate::domain::value_objects::{FieldName, ImageFile};

/// Answer of an availability check
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Availability {
    Available,
    /// Already in use; `message` is the server's wording, if it sent one
    Taken { message: Option<String> },
}

/// Server-side uniqueness checks for signup fields
#[async_trait]
pub trait AvailabilityChecker: Send + Sync {
    async fn check(&self, field: FieldName, value: &str) -> Result<Availability, CheckError>;
}

/// Persistent storage for recipe images
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store `file` under `path` and return its public URL
    async fn upload(&self, file: &ImageFile, path: &str) -> Result<String, UploadError>;

    /// Remove a previously uploaded image
    async fn delete(&self, url: &str) -> Result<(), UploadError>;
}

/// Dispatch boundary for built submissions
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Send `submission` and return the response body
    async fn dispatch(&self, submission: Submission) -> Result<serde_json::Value, SubmissionError>;
}

/// Session token persistence, passed explicitly to whoever needs it
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Result<Option<String>, TokenStoreError>;

    fn store(&self, token: &str) -> Result<(), TokenStoreError>;

    fn clear(&self) -> Result<(), TokenStoreError>;
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("availability service unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected availability response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("{0}")]
    Rejected(String),

    #[error("storage unreachable: {0}")]
    Unreachable(String),

    #[error("storage returned no URL")]
    MissingUrl,
}

/// Failed dispatch. `message` is already user-facing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmissionError {
    pub status: Option<u16>,
    pub message: String,
}

impl SubmissionError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenStoreError {
    #[error("token store io error: {0}")]
    Io(String),
}
