//! API error mapping
//!
//! Turns a failed HTTP exchange into the message a form shows to the user.

use recipes_forms::{FieldErrors, FieldName, SubmissionError};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub const SERVER_ERROR_MESSAGE: &str = "Something happened, please check your connection and try again";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 422: request rejected by server-side validation
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },

    /// 401 and 403
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    #[error("{message}")]
    Status { status: u16, message: String },

    /// No response was received
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    /// Map a non-success response. `body` is `Value::Null` when the
    /// response carried no JSON.
    pub fn from_status(status: StatusCode, body: &Value) -> Self {
        match status.as_u16() {
            422 => {
                let (message, errors) = validation_errors(body.get("errors"));
                Self::Validation { message, errors }
            }
            code @ (401 | 403) => Self::Unauthorized {
                status: code,
                message: body
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or_else(|| reason(status))
                    .to_string(),
            },
            500 => Self::Status {
                status: 500,
                message: SERVER_ERROR_MESSAGE.to_string(),
            },
            code => Self::Status {
                status: code,
                message: reason(status).to_string(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(422),
            Self::Unauthorized { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }

    /// Field-scoped messages from a 422 response
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            Self::Validation { errors, .. } => errors.clone(),
            _ => FieldErrors::new(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::from_status(status, &Value::Null),
            None => Self::Transport(err.to_string()),
        }
    }
}

impl From<ApiError> for SubmissionError {
    fn from(err: ApiError) -> Self {
        SubmissionError::new(err.status(), err.to_string())
    }
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Request failed")
}

/// `errors` is either a plain message or `{field: {msg}}` / `{field: msg}`
fn validation_errors(errors: Option<&Value>) -> (String, FieldErrors) {
    let mut fields = FieldErrors::new();
    match errors {
        Some(Value::String(message)) => return (message.clone(), fields),
        Some(Value::Object(map)) => {
            for (key, value) in map {
                let message = value
                    .get("msg")
                    .and_then(Value::as_str)
                    .or_else(|| value.as_str());
                if let (Ok(field), Some(message)) = (key.parse::<FieldName>(), message) {
                    fields.insert(field, message.to_string());
                }
            }
        }
        _ => {}
    }

    let message = fields
        .values()
        .next()
        .cloned()
        .unwrap_or_else(|| "Please correct the highlighted fields".to_string());
    (message, fields)
}
