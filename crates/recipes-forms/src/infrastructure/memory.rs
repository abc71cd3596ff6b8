//! In-memory port implementations for testing

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::domain::submission::Submission;
use crate::domain::value_objects::{FieldName, ImageFile};
use crate::ports::outbound::{
    Availability, AvailabilityChecker, CheckError, ImageStorage, SubmissionError, SubmissionSink, TokenStore,
    TokenStoreError, UploadError,
};

/// Availability checker backed by a set of taken values
#[derive(Default)]
pub struct InMemoryAvailabilityChecker {
    taken: RwLock<HashSet<(FieldName, String)>>,
    calls: AtomicUsize,
    unreachable: AtomicBool,
    latency: Option<Duration>,
}

impl InMemoryAvailabilityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_taken(self, field: FieldName, value: &str) -> Self {
        self.taken.write().insert((field, value.to_string()));
        self
    }

    /// Delay every answer, to keep a check in flight under a paused clock
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AvailabilityChecker for InMemoryAvailabilityChecker {
    async fn check(&self, field: FieldName, value: &str) -> Result<Availability, CheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(CheckError::Unreachable("connection refused".to_string()));
        }

        if self.taken.read().contains(&(field, value.to_string())) {
            Ok(Availability::Taken { message: None })
        } else {
            Ok(Availability::Available)
        }
    }
}

/// Image storage that records uploads and deletions
#[derive(Default)]
pub struct InMemoryImageStorage {
    uploads: Mutex<Vec<(String, String)>>,
    deleted: Mutex<Vec<String>>,
    failing: AtomicBool,
    latency: Option<Duration>,
}

impl InMemoryImageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every upload, to keep it in flight under a paused clock
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// `(path, file name)` of every stored upload
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }
}

#[async_trait]
impl ImageStorage for InMemoryImageStorage {
    async fn upload(&self, file: &ImageFile, path: &str) -> Result<String, UploadError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(UploadError::Rejected("storage quota exceeded".to_string()));
        }
        self.uploads.lock().push((path.to_string(), file.file_name.clone()));
        Ok(format!("memory://{}/{}", path, file.file_name))
    }

    async fn delete(&self, url: &str) -> Result<(), UploadError> {
        self.deleted.lock().push(url.to_string());
        Ok(())
    }
}

/// Submission sink that records what it was sent
#[derive(Default)]
pub struct RecordingSubmissionSink {
    submissions: Mutex<Vec<Submission>>,
    failure: Mutex<Option<SubmissionError>>,
}

impl RecordingSubmissionSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every dispatch fail with `error`; `None` restores success
    pub fn fail_with(&self, error: Option<SubmissionError>) {
        *self.failure.lock() = error;
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().clone()
    }
}

#[async_trait]
impl SubmissionSink for RecordingSubmissionSink {
    async fn dispatch(&self, submission: Submission) -> Result<serde_json::Value, SubmissionError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        let body = submission
            .body()
            .map_err(|e| SubmissionError::new(None, e.to_string()))?;
        self.submissions.lock().push(submission);
        Ok(serde_json::json!({ "status": "success", "data": body }))
    }
}

#[derive(Default)]
pub struct InMemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.token.read().clone())
    }

    fn store(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.token.write() = None;
        Ok(())
    }
}
