//! Formwork form schema engine
//!
//! The pure core behind a form builder: an ordered list of typed fields,
//! conditional show/hide/enable/disable rules between them, validation of
//! respondent input, and two encodings for sharing and saving schemas.
//!
//! ## Architecture
//!
//! - **Domain Layer**: field catalog, `FormSchema` aggregate, logic and validation services
//! - **Codec**: link-share and durable encodings of `SchemaPayload`
//! - **Ports Layer**: persistence, export and notification interfaces
//! - **Infrastructure Layer**: file, directory and in-memory adapters
//! - **Application Layer**: `FormService` flows over a hot-swappable `SchemaHandle`
//!
//! ## Example
//!
//! ```
//! use formwork_core::{FieldType, FormSchema, FormValues};
//! use formwork_core::domain::services::{evaluate_field_visibility, validate_submission};
//!
//! let mut schema = FormSchema::with_title("Signup");
//! let email = schema.add_field(FieldType::Email);
//! let values = FormValues::new().with(email.as_str(), "ada@example.com");
//!
//! assert!(evaluate_field_visibility(&schema.fields()[0], &values));
//! assert!(validate_submission(&schema, &values).is_valid);
//! ```

pub mod error;
pub mod config;
pub mod domain;
pub mod codec;
pub mod ports;
pub mod infrastructure;
pub mod application;

// Re-exports for convenience
pub use error::{FormsError, Result};
pub use config::FormsConfig;
pub use domain::aggregates::{ConditionPatch, Field, FieldPatch, FormMetaPatch, FormSchema, OptionPatch, SchemaPayload};
pub use domain::value_objects::{
    Condition, ConditionId, ConditionOperator, ConditionalAction, ConditionalLogic, FieldId,
    FieldOption, FieldType, FormValues, LogicType, OptionId, ValidationRule,
};
pub use domain::events::SchemaEvent;
pub use domain::services::{FieldState, FieldValidation, FormValidation};
pub use application::{FormService, SchemaHandle};
pub use ports::outbound::{FormExporter, FormRepository, Notifier, Severity, StoredForm};
