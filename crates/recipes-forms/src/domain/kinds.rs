//! Per-form behavior table
//!
//! Each form type maps to one [`FormKind`] implementation that owns its
//! validation rules and its submission mapping.

use crate::domain::submission::{self, Submission};
use crate::domain::validation as rules;
use crate::domain::value_objects::{FieldName, FormType, FormValues};
use crate::{FormsError, Result};

pub trait FormKind: Send + Sync {
    fn form_type(&self) -> FormType;

    /// Synchronous error for a field, or for entry `index` of a list field
    fn validate(&self, field: FieldName, values: &FormValues, index: Option<usize>) -> Option<String>;

    /// Fields that also need a server-side availability check
    fn async_fields(&self) -> &'static [FieldName] {
        &[]
    }

    fn build(&self, values: &FormValues, entity_id: Option<u64>) -> Result<Submission>;
}

pub struct LoginForm;
pub struct SignupForm;
pub struct ReviewForm;
pub struct RecipeForm {
    editing: bool,
}

static LOGIN: LoginForm = LoginForm;
static SIGNUP: SignupForm = SignupForm;
static REVIEW: ReviewForm = ReviewForm;
static ADD_RECIPE: RecipeForm = RecipeForm { editing: false };
static EDIT_RECIPE: RecipeForm = RecipeForm { editing: true };

impl FormType {
    pub fn kind(&self) -> &'static dyn FormKind {
        match self {
            Self::Login => &LOGIN,
            Self::Signup => &SIGNUP,
            Self::Review => &REVIEW,
            Self::AddRecipe => &ADD_RECIPE,
            Self::EditRecipe => &EDIT_RECIPE,
        }
    }
}

impl FormKind for LoginForm {
    fn form_type(&self) -> FormType {
        FormType::Login
    }

    fn validate(&self, field: FieldName, values: &FormValues, _index: Option<usize>) -> Option<String> {
        let value = values.text(field);
        match field {
            FieldName::Email => rules::required(value, field).or_else(|| rules::email(value)),
            FieldName::Password => rules::required(value, field),
            _ => None,
        }
    }

    fn build(&self, values: &FormValues, _entity_id: Option<u64>) -> Result<Submission> {
        Ok(Submission::Login(submission::credentials(values)))
    }
}

impl FormKind for SignupForm {
    fn form_type(&self) -> FormType {
        FormType::Signup
    }

    fn validate(&self, field: FieldName, values: &FormValues, _index: Option<usize>) -> Option<String> {
        let value = values.text(field);
        match field {
            FieldName::Firstname | FieldName::Lastname => {
                rules::required(value, field).or_else(|| rules::letters(value, field))
            }
            FieldName::Username => rules::required(value, field).or_else(|| rules::username(value)),
            FieldName::Email => rules::required(value, field).or_else(|| rules::email(value)),
            FieldName::Password => rules::required(value, field)
                .or_else(|| rules::min_length(value, field, rules::MIN_PASSWORD_LENGTH)),
            FieldName::PasswordConfirm => rules::required(value, field)
                .or_else(|| rules::matches(value, values.text(FieldName::Password))),
            FieldName::AboutMe => rules::max_length(value, field, rules::MAX_TEXT_LENGTH),
            FieldName::Occupation => rules::letters(value, field),
            _ => None,
        }
    }

    fn async_fields(&self) -> &'static [FieldName] {
        &[FieldName::Email, FieldName::Username]
    }

    fn build(&self, values: &FormValues, _entity_id: Option<u64>) -> Result<Submission> {
        Ok(Submission::Signup(submission::new_user(values)))
    }
}

impl FormKind for ReviewForm {
    fn form_type(&self) -> FormType {
        FormType::Review
    }

    fn validate(&self, field: FieldName, values: &FormValues, _index: Option<usize>) -> Option<String> {
        match field {
            FieldName::Rating => rules::rating(values.number(field)),
            FieldName::Comment => {
                let value = values.text(field);
                rules::required(value, field).or_else(|| rules::max_length(value, field, rules::MAX_TEXT_LENGTH))
            }
            _ => None,
        }
    }

    fn build(&self, values: &FormValues, entity_id: Option<u64>) -> Result<Submission> {
        let recipe_id = entity_id.ok_or(FormsError::MissingEntityId(FormType::Review))?;
        Ok(Submission::Review {
            recipe_id,
            review: submission::new_review(values),
        })
    }
}

impl FormKind for RecipeForm {
    fn form_type(&self) -> FormType {
        if self.editing {
            FormType::EditRecipe
        } else {
            FormType::AddRecipe
        }
    }

    fn validate(&self, field: FieldName, values: &FormValues, index: Option<usize>) -> Option<String> {
        match (field, index) {
            (FieldName::RecipeName, None) => {
                let value = values.text(field);
                rules::required(value, field).or_else(|| rules::letters(value, field))
            }
            (FieldName::TotalTime, None) => {
                let value = values.text(field);
                rules::required(value, field).or_else(|| rules::alphanumeric(value, field))
            }
            (FieldName::Difficulty, None) => rules::one_of(values.text(field), &rules::DIFFICULTIES),
            (FieldName::ExtraInfo, None) => rules::letters(values.text(field), field),
            (FieldName::Ingredients | FieldName::Directions, Some(i)) => {
                let value = values.entry_text(field, i);
                rules::required(value, field).or_else(|| rules::entry_text(value, field))
            }
            (FieldName::Preparations, Some(i)) => rules::entry_text(values.entry_text(field, i), field),
            _ => None,
        }
    }

    fn build(&self, values: &FormValues, entity_id: Option<u64>) -> Result<Submission> {
        let recipe = submission::recipe(values);
        if !self.editing {
            return Ok(Submission::AddRecipe(recipe));
        }
        let recipe_id = entity_id.ok_or(FormsError::MissingEntityId(FormType::EditRecipe))?;
        Ok(Submission::EditRecipe { recipe_id, recipe })
    }
}
