//! Value Objects module
//!
//! Immutable, validated domain primitives.

pub mod field;
pub mod form_type;
pub mod image;
pub mod recipe;

pub use field::{Entry, FieldErrors, FieldMap, FieldName, FieldValue, FormValues};
pub use form_type::FormType;
pub use image::{ImageFile, ImagePolicy, ImagePreview, ImageRejection, ALLOWED_IMAGE_TYPES, MAX_IMAGE_BYTES};
pub use recipe::ExistingRecipe;
