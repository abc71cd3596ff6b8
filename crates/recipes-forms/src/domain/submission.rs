//! Submission mapper
//!
//! Turns draft values into the payload the API expects. No validation
//! happens here; callers only build a submission from a valid draft.

use serde::Serialize;
use std::fmt;

use crate::domain::value_objects::{FieldName, FormType, FormValues};
use crate::{FormsError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub rating: u8,
    pub comment: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePayload {
    pub recipe_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_image: Option<String>,
    pub total_time: String,
    pub difficulty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<String>,
    pub vegetarian: bool,
    pub ingredients: Vec<String>,
    pub preparations: Vec<String>,
    pub directions: Vec<String>,
}

/// Payload handed to the dispatch boundary, one variant per form type
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Login(Credentials),
    Signup(NewUser),
    Review { recipe_id: u64, review: NewReview },
    AddRecipe(RecipePayload),
    EditRecipe { recipe_id: u64, recipe: RecipePayload },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

impl Submission {
    pub fn form_type(&self) -> FormType {
        match self {
            Self::Login(_) => FormType::Login,
            Self::Signup(_) => FormType::Signup,
            Self::Review { .. } => FormType::Review,
            Self::AddRecipe(_) => FormType::AddRecipe,
            Self::EditRecipe { .. } => FormType::EditRecipe,
        }
    }

    pub fn route(&self) -> Route {
        let (method, path) = match self {
            Self::Login(_) => (HttpMethod::Post, "/users/signin".to_string()),
            Self::Signup(_) => (HttpMethod::Post, "/users/signup".to_string()),
            Self::Review { recipe_id, .. } => (HttpMethod::Post, format!("/recipes/{recipe_id}/reviews")),
            Self::AddRecipe(_) => (HttpMethod::Post, "/recipes".to_string()),
            Self::EditRecipe { recipe_id, .. } => (HttpMethod::Put, format!("/recipes/{recipe_id}")),
        };
        Route { method, path }
    }

    /// JSON request body
    pub fn body(&self) -> Result<serde_json::Value> {
        let body = match self {
            Self::Login(payload) => serde_json::to_value(payload),
            Self::Signup(payload) => serde_json::to_value(payload),
            Self::Review { review, .. } => serde_json::to_value(review),
            Self::AddRecipe(payload) | Self::EditRecipe { recipe: payload, .. } => serde_json::to_value(payload),
        };
        body.map_err(|e| FormsError::Encoding(e.to_string()))
    }

    /// Login and signup responses carry a session token
    pub fn issues_token(&self) -> bool {
        self.form_type().is_auth()
    }
}

/// Map `values` to the submission for `form_type`
pub fn build(form_type: FormType, values: &FormValues, entity_id: Option<u64>) -> Result<Submission> {
    form_type.kind().build(values, entity_id)
}

// =============================================================================
// Per-form mappers
// =============================================================================

pub fn credentials(values: &FormValues) -> Credentials {
    Credentials {
        email: values.text(FieldName::Email).trim().to_string(),
        password: values.text(FieldName::Password).to_string(),
    }
}

pub fn new_user(values: &FormValues) -> NewUser {
    NewUser {
        firstname: trimmed(values, FieldName::Firstname),
        lastname: trimmed(values, FieldName::Lastname),
        username: trimmed(values, FieldName::Username),
        email: trimmed(values, FieldName::Email),
        password: values.text(FieldName::Password).to_string(),
        password_confirm: values.text(FieldName::PasswordConfirm).to_string(),
        about_me: optional(values, FieldName::AboutMe),
        occupation: optional(values, FieldName::Occupation),
    }
}

pub fn new_review(values: &FormValues) -> NewReview {
    let rating = values
        .number(FieldName::Rating)
        .and_then(|n| u8::try_from(n).ok())
        .unwrap_or(0);
    NewReview {
        rating,
        comment: trimmed(values, FieldName::Comment),
    }
}

pub fn recipe(values: &FormValues) -> RecipePayload {
    RecipePayload {
        recipe_name: trimmed(values, FieldName::RecipeName),
        recipe_image: optional(values, FieldName::RecipeImage),
        total_time: trimmed(values, FieldName::TotalTime),
        difficulty: trimmed(values, FieldName::Difficulty),
        extra_info: optional(values, FieldName::ExtraInfo),
        vegetarian: values.flag(FieldName::Vegetarian),
        ingredients: values.list(FieldName::Ingredients),
        preparations: values.list(FieldName::Preparations),
        directions: values.list(FieldName::Directions),
    }
}

fn trimmed(values: &FormValues, field: FieldName) -> String {
    values.text(field).trim().to_string()
}

fn optional(values: &FormValues, field: FieldName) -> Option<String> {
    Some(trimmed(values, field)).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Entry, FieldValue};

    fn recipe_values() -> FormValues {
        let mut v = FormValues::new();
        v.insert(FieldName::RecipeName, Entry::One("Jollof Rice".into()));
        v.insert(FieldName::RecipeImage, Entry::One("".into()));
        v.insert(FieldName::TotalTime, Entry::One("45 mins".into()));
        v.insert(FieldName::Difficulty, Entry::One("Normal".into()));
        v.insert(FieldName::ExtraInfo, Entry::One("".into()));
        v.insert(FieldName::Vegetarian, Entry::One(FieldValue::Flag(true)));
        v.insert(FieldName::Ingredients, Entry::Many(vec!["Rice".into(), "".into()]));
        v.insert(FieldName::Preparations, Entry::Many(vec!["".into()]));
        v.insert(FieldName::Directions, Entry::Many(vec!["Cook".into()]));
        v
    }

    #[test]
    fn test_login_payload() {
        let mut v = FormValues::new();
        v.insert(FieldName::Email, Entry::One("a@b.com".into()));
        v.insert(FieldName::Password, Entry::One("secret".into()));
        let submission = build(FormType::Login, &v, None).unwrap();
        assert_eq!(
            submission.body().unwrap(),
            serde_json::json!({ "email": "a@b.com", "password": "secret" })
        );
        assert_eq!(submission.route().to_string(), "POST /users/signin");
        assert!(submission.issues_token());
    }

    #[test]
    fn test_recipe_payload_drops_blank_entries() {
        let submission = build(FormType::AddRecipe, &recipe_values(), None).unwrap();
        let body = submission.body().unwrap();
        assert_eq!(body["ingredients"], serde_json::json!(["Rice"]));
        assert_eq!(body["preparations"], serde_json::json!([]));
        assert_eq!(body["vegetarian"], serde_json::json!(true));
        assert!(body.get("recipeImage").is_none());
        assert!(body.get("extraInfo").is_none());
    }

    #[test]
    fn test_edit_route_uses_entity_id() {
        let submission = build(FormType::EditRecipe, &recipe_values(), Some(9)).unwrap();
        assert_eq!(submission.route().to_string(), "PUT /recipes/9");
    }

    #[test]
    fn test_review_needs_entity_id() {
        let mut v = FormValues::new();
        v.insert(FieldName::Rating, Entry::One(FieldValue::Number(4)));
        v.insert(FieldName::Comment, Entry::One("Lovely".into()));
        assert_eq!(
            build(FormType::Review, &v, None),
            Err(FormsError::MissingEntityId(FormType::Review))
        );
        let submission = build(FormType::Review, &v, Some(3)).unwrap();
        assert_eq!(submission.route().path, "/recipes/3/reviews");
        assert_eq!(submission.body().unwrap(), serde_json::json!({ "rating": 4, "comment": "Lovely" }));
    }
}
