//! Form type value object

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::FormsError;

/// The five forms the client renders
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormType {
    Login,
    Signup,
    Review,
    AddRecipe,
    EditRecipe,
}

impl FormType {
    pub const ALL: [FormType; 5] = [
        FormType::Login,
        FormType::Signup,
        FormType::Review,
        FormType::AddRecipe,
        FormType::EditRecipe,
    ];

    /// Wire name used by the client router and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
            Self::Review => "review",
            Self::AddRecipe => "addRecipe",
            Self::EditRecipe => "editRecipe",
        }
    }

    /// Add and edit share one field layout
    pub fn is_recipe(&self) -> bool {
        matches!(self, Self::AddRecipe | Self::EditRecipe)
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }

    /// Review and edit forms are bound to an existing recipe
    pub fn needs_entity(&self) -> bool {
        matches!(self, Self::Review | Self::EditRecipe)
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FormType {
    type Err = FormsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FormsError::UnknownFormType(s.to_string()))
    }
}
