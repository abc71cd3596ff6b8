//! Existing recipe used to seed edit forms

use serde::{Deserialize, Serialize};

/// A recipe as returned by `GET /recipes/:id`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExistingRecipe {
    pub id: u64,
    pub recipe_name: String,
    pub recipe_image: Option<String>,
    pub total_time: String,
    pub difficulty: String,
    pub extra_info: Option<String>,
    pub vegetarian: bool,
    pub ingredients: Vec<String>,
    pub preparations: Vec<String>,
    pub directions: Vec<String>,
}
