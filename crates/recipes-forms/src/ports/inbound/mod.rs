//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: what a renderer can ask of a form.

use async_trait::async_trait;

use crate::domain::aggregates::DraftSnapshot;
use crate::domain::value_objects::{FieldName, FieldValue, ImageFile, ImagePreview};
use crate::Result;

/// Form interaction use cases
#[async_trait]
pub trait FormUseCases: Send + Sync {
    /// Set a field (or entry `index` of a repeatable field)
    fn change_field(&self, field: FieldName, value: FieldValue, index: Option<usize>) -> Result<()>;

    /// Set the review rating
    fn change_rating(&self, rating: u8) -> Result<()>;

    /// Stage a recipe image; `preview` receives its local data URL
    fn change_image(&self, file: ImageFile, preview: Box<dyn FnOnce(ImagePreview) + Send>) -> Result<()>;

    /// Append an entry; returns the new count
    fn add_repeatable_field(&self, field: FieldName) -> Result<usize>;

    /// Remove an entry; returns the new count
    fn remove_repeatable_field(&self, field: FieldName, index: usize) -> Result<usize>;

    /// Clear the submit error
    fn focus_field(&self);

    /// Touch and validate; schedules a debounced availability check
    fn blur_field(&self, field: FieldName, index: Option<usize>) -> Result<()>;

    /// Upload the staged image, then dispatch the submission
    async fn submit(&self) -> Result<serde_json::Value>;

    /// Current state
    fn snapshot(&self) -> DraftSnapshot;
}
