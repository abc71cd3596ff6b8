//! Field names, values and per-field maps

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::FormsError;

/// Every field any form can carry
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Email,
    Password,
    Firstname,
    Lastname,
    Username,
    PasswordConfirm,
    AboutMe,
    Occupation,
    Rating,
    Comment,
    RecipeName,
    RecipeImage,
    TotalTime,
    Difficulty,
    ExtraInfo,
    Vegetarian,
    Ingredients,
    Preparations,
    Directions,
}

impl FieldName {
    pub const ALL: [FieldName; 19] = [
        FieldName::Email,
        FieldName::Password,
        FieldName::Firstname,
        FieldName::Lastname,
        FieldName::Username,
        FieldName::PasswordConfirm,
        FieldName::AboutMe,
        FieldName::Occupation,
        FieldName::Rating,
        FieldName::Comment,
        FieldName::RecipeName,
        FieldName::RecipeImage,
        FieldName::TotalTime,
        FieldName::Difficulty,
        FieldName::ExtraInfo,
        FieldName::Vegetarian,
        FieldName::Ingredients,
        FieldName::Preparations,
        FieldName::Directions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::Firstname => "firstname",
            Self::Lastname => "lastname",
            Self::Username => "username",
            Self::PasswordConfirm => "passwordConfirm",
            Self::AboutMe => "aboutMe",
            Self::Occupation => "occupation",
            Self::Rating => "rating",
            Self::Comment => "comment",
            Self::RecipeName => "recipeName",
            Self::RecipeImage => "recipeImage",
            Self::TotalTime => "totalTime",
            Self::Difficulty => "difficulty",
            Self::ExtraInfo => "extraInfo",
            Self::Vegetarian => "vegetarian",
            Self::Ingredients => "ingredients",
            Self::Preparations => "preparations",
            Self::Directions => "directions",
        }
    }

    /// Human label used in validation messages. List fields use the
    /// singular because messages describe one entry.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Password => "Password",
            Self::Firstname => "First name",
            Self::Lastname => "Last name",
            Self::Username => "Username",
            Self::PasswordConfirm => "Password confirmation",
            Self::AboutMe => "About me",
            Self::Occupation => "Occupation",
            Self::Rating => "Rating",
            Self::Comment => "Comment",
            Self::RecipeName => "Recipe name",
            Self::RecipeImage => "Recipe image",
            Self::TotalTime => "Total time",
            Self::Difficulty => "Difficulty",
            Self::ExtraInfo => "Extra info",
            Self::Vegetarian => "Vegetarian",
            Self::Ingredients => "Ingredient",
            Self::Preparations => "Preparation",
            Self::Directions => "Direction",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = FormsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| FormsError::UnknownFieldName(s.to_string()))
    }
}

/// A scalar field value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl FieldValue {
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Text content, empty for non-text values
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            _ => "",
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Text(s) => s == "true",
            Self::Number(n) => *n != 0,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Flag(_) => false,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// One field's projection: a single item, or one item per list entry
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Entry<T> {
    pub fn as_one(&self) -> Option<&T> {
        match self {
            Self::One(v) => Some(v),
            Self::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[T]> {
        match self {
            Self::One(_) => None,
            Self::Many(v) => Some(v),
        }
    }

    /// Number of items (1 for scalar fields)
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Field-keyed projection of a draft (values, touched flags or errors)
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldMap<T>(BTreeMap<FieldName, Entry<T>>);

impl<T> Default for FieldMap<T> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<T> FieldMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FieldName, entry: Entry<T>) {
        self.0.insert(field, entry);
    }

    pub fn get(&self, field: FieldName) -> Option<&Entry<T>> {
        self.0.get(&field)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &Entry<T>)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Current values of a draft
pub type FormValues = FieldMap<FieldValue>;

impl FieldMap<FieldValue> {
    /// Text of a scalar field; empty when absent or not text
    pub fn text(&self, field: FieldName) -> &str {
        self.get(field)
            .and_then(Entry::as_one)
            .map(FieldValue::as_text)
            .unwrap_or("")
    }

    pub fn number(&self, field: FieldName) -> Option<i64> {
        self.get(field).and_then(Entry::as_one).and_then(FieldValue::as_number)
    }

    pub fn flag(&self, field: FieldName) -> bool {
        self.get(field)
            .and_then(Entry::as_one)
            .map(FieldValue::as_flag)
            .unwrap_or(false)
    }

    /// Text of one list entry; empty when absent
    pub fn entry_text(&self, field: FieldName, index: usize) -> &str {
        self.get(field)
            .and_then(Entry::as_many)
            .and_then(|entries| entries.get(index))
            .map(FieldValue::as_text)
            .unwrap_or("")
    }

    /// Non-blank list entries, trimmed
    pub fn list(&self, field: FieldName) -> Vec<String> {
        self.get(field)
            .and_then(Entry::as_many)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|v| !v.is_blank())
                    .map(|v| v.as_text().trim().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Field-scoped error messages, as produced by async validation
pub type FieldErrors = BTreeMap<FieldName, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_roundtrip() {
        for field in FieldName::ALL {
            assert_eq!(field.as_str().parse::<FieldName>().unwrap(), field);
        }
    }

    #[test]
    fn test_values_serialize_as_wire_object() {
        let mut values = FormValues::new();
        values.insert(FieldName::Email, Entry::One("a@b.com".into()));
        values.insert(
            FieldName::Ingredients,
            Entry::Many(vec!["Rice".into(), FieldValue::empty()]),
        );
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "email": "a@b.com", "ingredients": ["Rice", ""] })
        );
    }

    #[test]
    fn test_list_drops_blank_entries() {
        let mut values = FormValues::new();
        values.insert(
            FieldName::Directions,
            Entry::Many(vec![" Boil water ".into(), "   ".into(), "Serve".into()]),
        );
        assert_eq!(values.list(FieldName::Directions), vec!["Boil water", "Serve"]);
        assert_eq!(values.entry_text(FieldName::Directions, 2), "Serve");
        assert_eq!(values.entry_text(FieldName::Directions, 7), "");
    }

    #[test]
    fn test_rating_from_text() {
        assert_eq!(FieldValue::from("4").as_number(), Some(4));
        assert_eq!(FieldValue::Flag(true).as_number(), None);
    }
}
