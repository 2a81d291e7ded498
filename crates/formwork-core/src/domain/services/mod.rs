//! Domain services
//!
//! Stateless, read-only consumers of a schema snapshot.

pub mod logic;
pub mod validation;

pub use logic::{
    describe_condition, evaluate_condition, evaluate_conditions, evaluate_field_disabled,
    evaluate_field_visibility, field_states, visible_fields, FieldState,
};
pub use validation::{
    is_valid_email, validate_all_fields, validate_field, validate_field_with, validate_submission,
    FieldValidation, FormValidation, PatternCache,
};
