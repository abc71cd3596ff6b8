//! Field registry
//!
//! Static field layout of every form type.

use crate::domain::value_objects::{FieldName, FieldValue, FormType};

use FieldName::*;

/// Ordered fields, required subset and repeatable subset of one form
#[derive(Debug, PartialEq, Eq)]
pub struct FormSchema {
    pub fields: &'static [FieldName],
    pub required: &'static [FieldName],
    pub repeatable: &'static [FieldName],
}

impl FormSchema {
    pub fn contains(&self, field: FieldName) -> bool {
        self.fields.contains(&field)
    }

    pub fn is_required(&self, field: FieldName) -> bool {
        self.required.contains(&field)
    }

    pub fn is_repeatable(&self, field: FieldName) -> bool {
        self.repeatable.contains(&field)
    }

    pub fn supports_repeatable(&self) -> bool {
        !self.repeatable.is_empty()
    }
}

pub static LOGIN: FormSchema = FormSchema {
    fields: &[Email, Password],
    required: &[Email, Password],
    repeatable: &[],
};

pub static SIGNUP: FormSchema = FormSchema {
    fields: &[Firstname, Lastname, Username, Email, Password, PasswordConfirm, AboutMe, Occupation],
    required: &[Firstname, Lastname, Username, Email, Password, PasswordConfirm],
    repeatable: &[],
};

pub static REVIEW: FormSchema = FormSchema {
    fields: &[Rating, Comment],
    required: &[Rating, Comment],
    repeatable: &[],
};

pub static RECIPE: FormSchema = FormSchema {
    fields: &[
        RecipeName,
        RecipeImage,
        TotalTime,
        Difficulty,
        ExtraInfo,
        Vegetarian,
        Ingredients,
        Preparations,
        Directions,
    ],
    required: &[RecipeName, TotalTime, Difficulty, Ingredients, Directions],
    repeatable: &[Ingredients, Preparations, Directions],
};

impl FormType {
    pub fn schema(&self) -> &'static FormSchema {
        match self {
            Self::Login => &LOGIN,
            Self::Signup => &SIGNUP,
            Self::Review => &REVIEW,
            Self::AddRecipe | Self::EditRecipe => &RECIPE,
        }
    }
}

/// Value a fresh draft starts with
pub fn initial_value(field: FieldName) -> FieldValue {
    match field {
        Vegetarian => FieldValue::Flag(false),
        Rating => FieldValue::Number(0),
        _ => FieldValue::empty(),
    }
}

/// Entries a repeatable field starts with
pub const INITIAL_ENTRIES: usize = 1;
