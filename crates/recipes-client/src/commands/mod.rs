//! CLI Commands

pub mod auth;
pub mod config;
pub mod recipes;
pub mod review;

use recipes_client::{
    ApiClient, ClientConfig, FileTokenStore, HttpAvailabilityChecker, HttpImageStorage, HttpSubmissionSink, Result,
};
use recipes_forms::{FieldName, FieldValue, FormController, FormDraft, FormPorts, FormType, FormUseCases, FormsError};
use std::sync::Arc;

use crate::output::{self, OutputFormat};

/// Everything a command needs to talk to the API
pub struct Context {
    pub config: ClientConfig,
    pub api: ApiClient,
    pub tokens: Arc<FileTokenStore>,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(config: ClientConfig, format: OutputFormat) -> Result<Self> {
        let tokens = Arc::new(FileTokenStore::new(config.token_file()?));
        let api = ApiClient::new(&config.api_url, tokens.clone());
        Ok(Self {
            config,
            api,
            tokens,
            format,
        })
    }

    /// Controller for `draft` wired to the HTTP adapters
    pub fn controller(&self, draft: FormDraft) -> FormController {
        let ports = FormPorts {
            checker: Arc::new(HttpAvailabilityChecker::new(self.api.clone())),
            storage: Arc::new(HttpImageStorage::new(&self.config.upload_url)),
            sink: Arc::new(HttpSubmissionSink::new(self.api.clone())),
        };
        FormController::new(draft, ports, self.config.forms.clone())
    }
}

pub fn fill(controller: &FormController, values: Vec<(FieldName, FieldValue)>) -> Result<()> {
    for (field, value) in values {
        controller.change_field(field, value, None)?;
    }
    Ok(())
}

/// Replace the entries of a repeatable field; an empty slice keeps the
/// current entries
pub fn fill_list(controller: &FormController, field: FieldName, entries: &[String]) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }

    let current = controller
        .snapshot()
        .field_counts
        .get(&field)
        .copied()
        .unwrap_or(0);
    for _ in current..entries.len() {
        controller.add_repeatable_field(field)?;
    }
    for index in (entries.len()..current).rev() {
        controller.remove_repeatable_field(field, index)?;
    }
    for (index, entry) in entries.iter().enumerate() {
        controller.change_field(field, FieldValue::from(entry.as_str()), Some(index))?;
    }
    Ok(())
}

/// Blur every field so missing required values report an error
pub fn touch_all(controller: &FormController, form_type: FormType) -> Result<()> {
    for &field in form_type.schema().fields {
        controller.blur_field(field, None)?;
    }
    Ok(())
}

/// Wait for availability checks, then submit when the draft is valid
pub async fn submit(controller: &FormController) -> Result<serde_json::Value> {
    let snapshot = controller.settle().await;
    if !snapshot.is_valid {
        output::print_field_errors(&snapshot);
        return Err(FormsError::SubmitNotAllowed("the form has errors or missing fields").into());
    }

    match controller.submit().await {
        Ok(body) => Ok(body),
        Err(err) => {
            output::print_field_errors(&controller.snapshot());
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipes_forms::infrastructure::memory::{
        InMemoryAvailabilityChecker, InMemoryImageStorage, RecordingSubmissionSink,
    };
    use recipes_forms::{Entry, FormsConfig};

    fn controller(form_type: FormType) -> FormController {
        let ports = FormPorts {
            checker: Arc::new(InMemoryAvailabilityChecker::new()),
            storage: Arc::new(InMemoryImageStorage::new()),
            sink: Arc::new(RecordingSubmissionSink::new()),
        };
        FormController::new(FormDraft::initialize(form_type, None), ports, FormsConfig::default())
    }

    #[test]
    fn test_fill_list_resizes_entries() {
        let controller = controller(FormType::AddRecipe);
        let entries = vec!["Rice".to_string(), "Tomatoes".to_string(), "Pepper".to_string()];
        fill_list(&controller, FieldName::Ingredients, &entries).unwrap();
        assert_eq!(controller.snapshot().field_counts[&FieldName::Ingredients], 3);

        fill_list(&controller, FieldName::Ingredients, &entries[..1]).unwrap();
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.field_counts[&FieldName::Ingredients], 1);
        assert_eq!(
            snapshot.values.get(FieldName::Ingredients),
            Some(&Entry::Many(vec![FieldValue::from("Rice")]))
        );
    }

    #[tokio::test]
    async fn test_missing_required_fields_block_submit() {
        let controller = controller(FormType::Login);
        fill(&controller, vec![(FieldName::Email, "a@b.com".into())]).unwrap();
        touch_all(&controller, FormType::Login).unwrap();

        let err = submit(&controller).await.unwrap_err();
        assert!(err.to_string().contains("missing fields"));
        assert_eq!(
            controller.snapshot().field_errors.get(FieldName::Password),
            Some(&Entry::One(Some("Password is required".to_string())))
        );
    }
}
