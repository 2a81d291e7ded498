//! Form domain model
//!
//! - **Value Objects**: ids, type tags, validation rules, conditions, input values
//! - **Catalog**: static metadata per field type
//! - **Aggregates**: `FormSchema` (consistency boundary) and its `Field` entities
//! - **Events**: what each mutation did, drained by the host
//! - **Services**: conditional-logic evaluation and validation

pub mod value_objects;
pub mod catalog;
pub mod aggregates;
pub mod events;
pub mod services;

pub use value_objects::*;
pub use aggregates::*;
pub use events::*;
