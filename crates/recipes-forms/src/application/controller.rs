//! Form controller
//!
//! Owns one [`FormDraft`] and runs the work the draft hands out: debounced
//! availability checks, the image upload and the final dispatch. The draft
//! lock is only held for synchronous updates, never across an await.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::FormsConfig;
use crate::domain::aggregates::{AsyncCheckTicket, DraftSnapshot, FormDraft, UploadTicket};
use crate::domain::validation;
use crate::domain::value_objects::{FieldName, FieldValue, ImageFile, ImagePreview};
use crate::ports::inbound::FormUseCases;
use crate::ports::outbound::{AvailabilityChecker, ImageStorage, SubmissionSink};
use crate::{FormsError, Result};

/// Outbound services a controller needs
#[derive(Clone)]
pub struct FormPorts {
    pub checker: Arc<dyn AvailabilityChecker>,
    pub storage: Arc<dyn ImageStorage>,
    pub sink: Arc<dyn SubmissionSink>,
}

/// Async driver for one form
#[derive(Clone)]
pub struct FormController {
    inner: Arc<Inner>,
}

struct Inner {
    draft: Mutex<FormDraft>,
    ports: FormPorts,
    config: FormsConfig,
    snapshot_tx: watch::Sender<DraftSnapshot>,
    checks: Mutex<Vec<JoinHandle<()>>>,
}

impl FormController {
    pub fn new(draft: FormDraft, ports: FormPorts, config: FormsConfig) -> Self {
        let draft = draft.with_image_policy(config.image_policy());
        let (snapshot_tx, _) = watch::channel(draft.snapshot());

        Self {
            inner: Arc::new(Inner {
                draft: Mutex::new(draft),
                ports,
                config,
                snapshot_tx,
                checks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Receive a snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<DraftSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn is_required(&self, field: FieldName) -> bool {
        self.inner.draft.lock().is_required(field)
    }

    /// Wait for every scheduled availability check to finish
    pub async fn settle(&self) -> DraftSnapshot {
        loop {
            let handles = std::mem::take(&mut *self.inner.checks.lock());
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    warn!(error = %err, "availability check task failed");
                }
            }
        }
        self.snapshot()
    }

    /// Apply `f` to the draft, log its events and publish a snapshot
    fn update<T>(&self, f: impl FnOnce(&mut FormDraft) -> T) -> T {
        let (result, snapshot, events) = {
            let mut draft = self.inner.draft.lock();
            let result = f(&mut draft);
            (result, draft.snapshot(), draft.take_events())
        };

        for event in &events {
            debug!(event = event.event_type(), ?event, "draft event");
        }
        self.inner.snapshot_tx.send_replace(snapshot);
        result
    }

    fn schedule_check(&self, ticket: AsyncCheckTicket) {
        let controller = self.clone();
        let handle = tokio::spawn(async move { controller.run_check(ticket).await });

        let mut checks = self.inner.checks.lock();
        checks.retain(|h| !h.is_finished());
        checks.push(handle);
    }

    async fn run_check(&self, ticket: AsyncCheckTicket) {
        tokio::time::sleep(self.inner.config.debounce()).await;

        let form_type = self.inner.draft.lock().form_type();
        let mut next = self.update(|draft| draft.begin_async_check(ticket));
        while let Some(ticket) = next {
            debug!(field = %ticket.field, "checking availability");
            let result =
                validation::async_validate(self.inner.ports.checker.as_ref(), form_type, ticket.field, &ticket.value)
                    .await;
            next = self.update(|draft| draft.complete_async_check(&ticket, result));
        }
    }

    async fn upload_staged(&self, file: ImageFile, ticket: UploadTicket) -> Result<()> {
        let path = self.inner.config.upload_path(Utc::now());
        debug!(%path, file = %file.file_name, size = file.size(), "uploading image");

        let result = self.inner.ports.storage.upload(&file, &path).await;
        if let Err(err) = &result {
            warn!(error = %err, "image upload failed");
        }
        let (outcome, orphaned) = self.update(|draft| {
            let outcome = draft.complete_upload(ticket, result);
            (outcome, draft.take_orphaned_uploads())
        });
        for url in orphaned {
            self.delete_unreferenced(&url).await;
        }
        outcome
    }

    /// Best-effort removal of a stored image nothing points to anymore
    async fn delete_unreferenced(&self, url: &str) {
        match self.inner.ports.storage.delete(url).await {
            Ok(()) => debug!(%url, "deleted unreferenced image"),
            Err(err) => warn!(%url, error = %err, "failed to delete unreferenced image"),
        }
    }
}

#[async_trait]
impl FormUseCases for FormController {
    fn change_field(&self, field: FieldName, value: FieldValue, index: Option<usize>) -> Result<()> {
        self.update(|draft| draft.change_field(field, value, index))
    }

    fn change_rating(&self, rating: u8) -> Result<()> {
        self.update(|draft| draft.change_rating(rating))
    }

    fn change_image(&self, file: ImageFile, preview: Box<dyn FnOnce(ImagePreview) + Send>) -> Result<()> {
        self.update(|draft| draft.change_image(file, preview))
    }

    fn add_repeatable_field(&self, field: FieldName) -> Result<usize> {
        self.update(|draft| draft.add_repeatable_field(field))
    }

    fn remove_repeatable_field(&self, field: FieldName, index: usize) -> Result<usize> {
        self.update(|draft| draft.remove_repeatable_field(field, index))
    }

    fn focus_field(&self) {
        self.update(FormDraft::focus_field)
    }

    fn blur_field(&self, field: FieldName, index: Option<usize>) -> Result<()> {
        if let Some(ticket) = self.update(|draft| draft.blur_field(field, index))? {
            self.schedule_check(ticket);
        }
        Ok(())
    }

    async fn submit(&self) -> Result<serde_json::Value> {
        let plan = self.update(FormDraft::begin_submit)?;

        if let Some(job) = plan.upload {
            self.upload_staged(job.file, job.ticket).await?;
        }

        let built = self.inner.draft.lock().build_submission();
        let submission = match built {
            Ok(submission) => submission,
            Err(err) => {
                self.update(|draft| draft.abort_submit(err.to_string()));
                return Err(err);
            }
        };

        let route = submission.route();
        info!(%route, form_type = %submission.form_type(), "dispatching submission");

        match self.inner.ports.sink.dispatch(submission).await {
            Ok(body) => {
                info!(%route, "submission accepted");
                if let Some(url) = self.update(|draft| draft.finish_submit(Ok(()))) {
                    self.delete_unreferenced(&url).await;
                }
                Ok(body)
            }
            Err(err) => {
                warn!(%route, status = ?err.status, error = %err, "submission failed");
                self.update(|draft| draft.finish_submit(Err(err.clone())));
                Err(FormsError::Submission(err))
            }
        }
    }

    fn snapshot(&self) -> DraftSnapshot {
        self.inner.draft.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::submission::Submission;
    use crate::domain::value_objects::{Entry, ExistingRecipe, FormType};
    use crate::infrastructure::memory::{InMemoryAvailabilityChecker, InMemoryImageStorage, RecordingSubmissionSink};
    use crate::ports::outbound::SubmissionError;
    use std::time::Duration;

    struct Harness {
        controller: FormController,
        checker: Arc<InMemoryAvailabilityChecker>,
        storage: Arc<InMemoryImageStorage>,
        sink: Arc<RecordingSubmissionSink>,
    }

    fn harness_with(draft: FormDraft, checker: InMemoryAvailabilityChecker) -> Harness {
        harness_with_storage(draft, checker, InMemoryImageStorage::new())
    }

    fn harness_with_storage(
        draft: FormDraft,
        checker: InMemoryAvailabilityChecker,
        storage: InMemoryImageStorage,
    ) -> Harness {
        let checker = Arc::new(checker);
        let storage = Arc::new(storage);
        let sink = Arc::new(RecordingSubmissionSink::new());
        let ports = FormPorts {
            checker: checker.clone(),
            storage: storage.clone(),
            sink: sink.clone(),
        };
        Harness {
            controller: FormController::new(draft, ports, FormsConfig::default()),
            checker,
            storage,
            sink,
        }
    }

    fn harness(form_type: FormType) -> Harness {
        harness_with(FormDraft::initialize(form_type, None), InMemoryAvailabilityChecker::new())
    }

    fn fill(controller: &FormController, fields: &[(FieldName, &str)]) {
        for (field, value) in fields {
            controller.change_field(*field, FieldValue::from(*value), None).unwrap();
        }
    }

    fn fill_signup(controller: &FormController, username: &str) {
        fill(
            controller,
            &[
                (FieldName::Firstname, "Iveren"),
                (FieldName::Lastname, "Shaguy"),
                (FieldName::Username, username),
                (FieldName::Email, "iveren@example.com"),
                (FieldName::Password, "longenough"),
                (FieldName::PasswordConfirm, "longenough"),
            ],
        );
    }

    fn fill_recipe(controller: &FormController) {
        fill(
            controller,
            &[
                (FieldName::RecipeName, "Jollof Rice"),
                (FieldName::TotalTime, "45 mins"),
                (FieldName::Difficulty, "Normal"),
            ],
        );
        controller
            .change_field(FieldName::Ingredients, "Rice".into(), Some(0))
            .unwrap();
        controller
            .change_field(FieldName::Directions, "Cook".into(), Some(0))
            .unwrap();
    }

    fn no_preview() -> Box<dyn FnOnce(ImagePreview) + Send> {
        Box::new(|_| {})
    }

    #[tokio::test(start_paused = true)]
    async fn test_taken_username_after_debounce() {
        let h = harness_with(
            FormDraft::initialize(FormType::Signup, None),
            InMemoryAvailabilityChecker::new().with_taken(FieldName::Username, "taken"),
        );
        fill_signup(&h.controller, "taken");
        h.controller.blur_field(FieldName::Username, None).unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.checker.calls(), 0);

        let snapshot = h.controller.settle().await;
        assert_eq!(h.checker.calls(), 1);
        assert_eq!(
            snapshot.field_errors.get(FieldName::Username),
            Some(&Entry::One(Some("Username already exists".to_string())))
        );
        assert!(!snapshot.is_valid);
        assert!(!snapshot.async_check_pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_debounce_drops_check() {
        let h = harness(FormType::Signup);
        fill_signup(&h.controller, "first");
        h.controller.blur_field(FieldName::Username, None).unwrap();
        h.controller
            .change_field(FieldName::Username, "second".into(), None)
            .unwrap();

        let snapshot = h.controller.settle().await;
        assert_eq!(h.checker.calls(), 0);
        assert!(snapshot.is_valid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checks_run_one_at_a_time() {
        let h = harness_with(
            FormDraft::initialize(FormType::Signup, None),
            InMemoryAvailabilityChecker::new()
                .with_taken(FieldName::Email, "iveren@example.com")
                .with_latency(Duration::from_millis(300)),
        );
        fill_signup(&h.controller, "iveren_s");
        h.controller.blur_field(FieldName::Username, None).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.controller.blur_field(FieldName::Email, None).unwrap();

        tokio::time::sleep(Duration::from_millis(550)).await;
        // username check in flight, email check deferred behind it
        assert_eq!(h.checker.calls(), 1);
        assert!(h.controller.snapshot().async_check_pending);

        let snapshot = h.controller.settle().await;
        assert_eq!(h.checker.calls(), 2);
        assert_eq!(
            snapshot.field_errors.get(FieldName::Email),
            Some(&Entry::One(Some("Email already exists".to_string())))
        );
        assert_eq!(snapshot.field_errors.get(FieldName::Username), Some(&Entry::One(None)));
    }

    #[tokio::test]
    async fn test_login_submit_dispatches_payload() {
        let h = harness(FormType::Login);
        fill(&h.controller, &[(FieldName::Email, "a@b.com"), (FieldName::Password, "secret")]);
        h.controller.blur_field(FieldName::Email, None).unwrap();
        h.controller.blur_field(FieldName::Password, None).unwrap();
        assert!(h.controller.snapshot().can_submit);

        let body = h.controller.submit().await.unwrap();
        assert_eq!(body["data"], serde_json::json!({ "email": "a@b.com", "password": "secret" }));
        assert!(matches!(h.sink.submissions().as_slice(), [Submission::Login(_)]));
        assert!(!h.controller.snapshot().can_submit);
    }

    #[tokio::test]
    async fn test_recipe_submit_uploads_image_first() {
        let h = harness(FormType::AddRecipe);
        fill_recipe(&h.controller);
        h.controller
            .change_image(ImageFile::new("jollof.png", "image/png", vec![0u8; 64]), no_preview())
            .unwrap();

        h.controller.submit().await.unwrap();
        let uploads = h.storage.uploads();
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].0.starts_with("recipes/"));

        match h.sink.submissions().as_slice() {
            [Submission::AddRecipe(recipe)] => {
                assert!(recipe.recipe_image.as_deref().is_some_and(|url| url.ends_with("/jollof.png")));
                assert_eq!(recipe.ingredients, vec!["Rice"]);
            }
            other => panic!("unexpected submissions: {other:?}"),
        }
        assert!(h.storage.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_failed_upload_skips_dispatch() {
        let h = harness(FormType::AddRecipe);
        fill_recipe(&h.controller);
        h.controller
            .change_image(ImageFile::new("jollof.png", "image/png", vec![0u8; 64]), no_preview())
            .unwrap();
        h.storage.set_failing(true);

        assert!(matches!(h.controller.submit().await, Err(FormsError::Upload(_))));
        assert!(h.sink.submissions().is_empty());

        let snapshot = h.controller.snapshot();
        assert!(!snapshot.is_valid);
        assert!(!snapshot.uploading);
        assert_eq!(
            snapshot.field_errors.get(FieldName::RecipeImage),
            Some(&Entry::One(Some("storage quota exceeded".to_string())))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_upload_is_deleted() {
        let h = harness_with_storage(
            FormDraft::initialize(FormType::AddRecipe, None),
            InMemoryAvailabilityChecker::new(),
            InMemoryImageStorage::new().with_latency(Duration::from_secs(2)),
        );
        fill_recipe(&h.controller);
        h.controller
            .change_image(ImageFile::new("first.png", "image/png", vec![0u8; 8]), no_preview())
            .unwrap();

        let controller = h.controller.clone();
        let submit = tokio::spawn(async move { controller.submit().await });
        while !h.controller.snapshot().uploading {
            tokio::task::yield_now().await;
        }
        h.controller
            .change_image(ImageFile::new("second.png", "image/png", vec![1u8; 8]), no_preview())
            .unwrap();

        assert_eq!(submit.await.unwrap(), Err(FormsError::UploadSuperseded));
        let deleted = h.storage.deleted();
        assert_eq!(deleted.len(), 1);
        assert!(deleted[0].ends_with("/first.png"));
        assert!(h.sink.submissions().is_empty());

        let snapshot = h.controller.snapshot();
        assert!(snapshot.has_pending_image);
        assert!(!snapshot.uploading);
    }

    #[tokio::test]
    async fn test_edit_deletes_replaced_image() {
        let recipe = ExistingRecipe {
            id: 12,
            recipe_name: "Egusi Soup".into(),
            recipe_image: Some("memory://recipes/1/egusi.png".into()),
            total_time: "1 hour".into(),
            difficulty: "Difficult".into(),
            ingredients: vec!["Melon seeds".into()],
            directions: vec!["Stir".into()],
            ..Default::default()
        };
        let h = harness_with(
            FormDraft::initialize(FormType::EditRecipe, Some(&recipe)),
            InMemoryAvailabilityChecker::new(),
        );
        h.controller
            .change_image(ImageFile::new("new.png", "image/png", vec![1u8; 8]), no_preview())
            .unwrap();

        h.controller.submit().await.unwrap();
        assert_eq!(h.storage.deleted(), vec!["memory://recipes/1/egusi.png".to_string()]);
        assert!(matches!(
            h.sink.submissions().as_slice(),
            [Submission::EditRecipe { recipe_id: 12, .. }]
        ));
    }

    #[tokio::test]
    async fn test_rejected_dispatch_sets_submit_error() {
        let h = harness(FormType::Login);
        fill(&h.controller, &[(FieldName::Email, "a@b.com"), (FieldName::Password, "wrong")]);
        h.sink.fail_with(Some(SubmissionError::new(Some(401), "Invalid credentials")));

        let err = h.controller.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.submit_error.as_deref(), Some("Invalid credentials"));
        assert!(snapshot.can_submit);

        h.controller.focus_field();
        assert_eq!(h.controller.snapshot().submit_error, None);
    }

    #[tokio::test]
    async fn test_review_without_recipe_is_aborted() {
        let h = harness(FormType::Review);
        h.controller.change_rating(5).unwrap();
        fill(&h.controller, &[(FieldName::Comment, "Lovely")]);

        assert_eq!(
            h.controller.submit().await,
            Err(FormsError::MissingEntityId(FormType::Review))
        );
        assert!(h.controller.snapshot().submit_error.is_some());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let h = harness(FormType::AddRecipe);
        let mut rx = h.controller.subscribe();
        assert!(rx.borrow().pristine);

        assert_eq!(h.controller.add_repeatable_field(FieldName::Ingredients).unwrap(), 2);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().field_counts[&FieldName::Ingredients], 2);

        h.controller.remove_repeatable_field(FieldName::Ingredients, 0).unwrap();
        assert_eq!(rx.borrow_and_update().field_counts[&FieldName::Ingredients], 1);
    }

    #[tokio::test]
    async fn test_preview_is_delivered() {
        let h = harness(FormType::AddRecipe);
        let (tx, rx) = std::sync::mpsc::channel();
        h.controller
            .change_image(
                ImageFile::new("a.gif", "image/gif", b"GIF".to_vec()),
                Box::new(move |preview| {
                    let _ = tx.send(preview.data_url);
                }),
            )
            .unwrap();
        assert_eq!(rx.recv().unwrap(), "data:image/gif;base64,R0lG");
        assert!(h.controller.is_required(FieldName::RecipeName));
    }
}
