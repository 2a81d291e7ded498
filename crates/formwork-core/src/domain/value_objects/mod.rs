//! Forms value objects
//!
//! Identifiers, type tags and the small records that hang off a field.

pub mod values;

pub use values::FormValues;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random id
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().simple().to_string())
            }

            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

entity_id!(
    /// Field identifier, unique within a schema
    FieldId
);
entity_id!(
    /// Option identifier, unique within its field
    OptionId
);
entity_id!(
    /// Condition identifier, unique within its field
    ConditionId
);

/// The closed set of field types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Date,
    Checkbox,
    Radio,
    Dropdown,
}

impl FieldType {
    /// Every type, in palette order
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Number,
        FieldType::Date,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Dropdown,
    ];

    /// Wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Dropdown => "dropdown",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown field type: {}", s))
    }
}

/// Comparison applied by a condition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 7] = [
        ConditionOperator::Equals,
        ConditionOperator::NotEquals,
        ConditionOperator::Contains,
        ConditionOperator::GreaterThan,
        ConditionOperator::LessThan,
        ConditionOperator::IsEmpty,
        ConditionOperator::IsNotEmpty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "notEquals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::GreaterThan => "greaterThan",
            ConditionOperator::LessThan => "lessThan",
            ConditionOperator::IsEmpty => "isEmpty",
            ConditionOperator::IsNotEmpty => "isNotEmpty",
        }
    }

    /// Phrase used when describing a condition in prose
    pub fn phrase(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "does not equal",
            ConditionOperator::Contains => "contains",
            ConditionOperator::GreaterThan => "is greater than",
            ConditionOperator::LessThan => "is less than",
            ConditionOperator::IsEmpty => "is empty",
            ConditionOperator::IsNotEmpty => "is not empty",
        }
    }

    /// Operators that ignore the condition's literal
    pub fn is_unary(&self) -> bool {
        matches!(self, ConditionOperator::IsEmpty | ConditionOperator::IsNotEmpty)
    }
}

impl FromStr for ConditionOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConditionOperator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown operator: {}", s))
    }
}

/// What a met condition set does to its field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionalAction {
    #[default]
    Show,
    Hide,
    Enable,
    Disable,
}

impl ConditionalAction {
    pub fn label(&self) -> &'static str {
        match self {
            ConditionalAction::Show => "Show this field",
            ConditionalAction::Hide => "Hide this field",
            ConditionalAction::Enable => "Enable this field",
            ConditionalAction::Disable => "Disable this field",
        }
    }
}

impl FromStr for ConditionalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "show" => Ok(ConditionalAction::Show),
            "hide" => Ok(ConditionalAction::Hide),
            "enable" => Ok(ConditionalAction::Enable),
            "disable" => Ok(ConditionalAction::Disable),
            _ => Err(format!("unknown action: {}", s)),
        }
    }
}

/// How a condition set combines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicType {
    /// AND
    #[default]
    All,
    /// OR
    Any,
}

impl LogicType {
    pub fn label(&self) -> &'static str {
        match self {
            LogicType::All => "ALL conditions are met (AND)",
            LogicType::Any => "ANY condition is met (OR)",
        }
    }
}

impl FromStr for LogicType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "and" => Ok(LogicType::All),
            "any" | "or" => Ok(LogicType::Any),
            _ => Err(format!("unknown logic type: {}", s)),
        }
    }
}

/// Per-field validation settings
///
/// `min`/`max` are character counts for text fields and numeric bounds for
/// number fields. An empty `custom_error` means no custom message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationRule {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<String>,
    pub custom_error: String,
}

impl ValidationRule {
    /// Custom message if one is configured
    pub fn custom_message(&self) -> Option<&str> {
        if self.custom_error.is_empty() {
            None
        } else {
            Some(&self.custom_error)
        }
    }

    /// Configured pattern source, ignoring blanks
    pub fn pattern_source(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }
}

/// Choice offered by radio and dropdown fields
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: OptionId,
    pub label: String,
    pub value: String,
}

impl FieldOption {
    /// The `n`th default option (1-based)
    pub fn numbered(n: usize) -> Self {
        Self {
            id: OptionId::generate(),
            label: format!("Option {}", n),
            value: format!("option{}", n),
        }
    }
}

/// Comparison between another field's value and a literal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: ConditionId,
    pub field_id: FieldId,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: String,
}

impl Condition {
    pub fn new(field_id: FieldId, operator: ConditionOperator, value: impl Into<String>) -> Self {
        Self {
            id: ConditionId::generate(),
            field_id,
            operator,
            value: value.into(),
        }
    }
}

/// A field's conditional-logic configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionalLogic {
    pub enabled: bool,
    pub action: ConditionalAction,
    pub logic_type: LogicType,
    pub conditions: Vec<Condition>,
}

impl ConditionalLogic {
    /// True when evaluation can change anything about the field
    pub fn is_active(&self) -> bool {
        self.enabled && !self.conditions.is_empty()
    }
}
