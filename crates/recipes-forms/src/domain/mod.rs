//! Domain module
//!
//! Form schema, validation rules, submission mapping and the draft aggregate.

pub mod aggregates;
pub mod events;
pub mod kinds;
pub mod schema;
pub mod submission;
pub mod validation;
pub mod value_objects;

pub use aggregates::*;
pub use events::*;
pub use value_objects::*;
