//! Aggregates module
//!
//! `FormSchema` is the consistency boundary; `Field` is an entity inside it.

pub mod field;
pub mod schema;

pub use field::{ConditionPatch, Field, FieldPatch, OptionPatch};
pub use schema::{FormMetaPatch, FormSchema, SchemaPayload, DEFAULT_TITLE};
