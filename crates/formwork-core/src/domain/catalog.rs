//! Field catalog: static metadata per field type

use super::value_objects::{ConditionOperator, FieldType, ValidationRule};

/// Static description of one field type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldTypeInfo {
    pub field_type: FieldType,
    /// Palette label
    pub label: &'static str,
    /// Whether the type carries an option list
    pub has_options: bool,
    /// Meaning of `min`/`max` in the validation rule, if any
    pub bounds: Bounds,
}

/// What `ValidationRule::min`/`max` constrain for a type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bounds {
    None,
    Length,
    Numeric,
}

const BASE_OPERATORS: &[ConditionOperator] = &[
    ConditionOperator::Equals,
    ConditionOperator::NotEquals,
    ConditionOperator::IsEmpty,
    ConditionOperator::IsNotEmpty,
];

const TEXT_OPERATORS: &[ConditionOperator] = &[
    ConditionOperator::Equals,
    ConditionOperator::NotEquals,
    ConditionOperator::IsEmpty,
    ConditionOperator::IsNotEmpty,
    ConditionOperator::Contains,
];

const NUMBER_OPERATORS: &[ConditionOperator] = &[
    ConditionOperator::Equals,
    ConditionOperator::NotEquals,
    ConditionOperator::IsEmpty,
    ConditionOperator::IsNotEmpty,
    ConditionOperator::GreaterThan,
    ConditionOperator::LessThan,
];

/// Metadata for a field type
pub fn info(field_type: FieldType) -> FieldTypeInfo {
    let (label, has_options, bounds) = match field_type {
        FieldType::Text => ("Text", false, Bounds::Length),
        FieldType::Email => ("Email", false, Bounds::None),
        FieldType::Number => ("Number", false, Bounds::Numeric),
        FieldType::Date => ("Date", false, Bounds::None),
        FieldType::Checkbox => ("Checkbox", false, Bounds::None),
        FieldType::Radio => ("Radio", true, Bounds::None),
        FieldType::Dropdown => ("Dropdown", true, Bounds::None),
    };
    FieldTypeInfo { field_type, label, has_options, bounds }
}

/// Whole catalog in palette order
pub fn all() -> impl Iterator<Item = FieldTypeInfo> {
    FieldType::ALL.into_iter().map(info)
}

/// Validation shape a new field of this type starts with
pub fn default_validation(_field_type: FieldType) -> ValidationRule {
    ValidationRule::default()
}

/// Label a freshly added field gets, e.g. "New Number Field"
pub fn default_label(field_type: FieldType) -> String {
    format!("New {} Field", info(field_type).label)
}

/// Number of options a new field of this type starts with
pub fn default_option_count(field_type: FieldType) -> usize {
    if info(field_type).has_options {
        2
    } else {
        0
    }
}

/// Operators that make sense when a condition targets a field of this type
pub fn operators_for(field_type: FieldType) -> &'static [ConditionOperator] {
    match field_type {
        FieldType::Text | FieldType::Email => TEXT_OPERATORS,
        FieldType::Number => NUMBER_OPERATORS,
        FieldType::Date | FieldType::Checkbox | FieldType::Radio | FieldType::Dropdown => {
            BASE_OPERATORS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_bearing_types() {
        let with_options: Vec<_> = all().filter(|i| i.has_options).map(|i| i.field_type).collect();
        assert_eq!(with_options, vec![FieldType::Radio, FieldType::Dropdown]);
        assert_eq!(default_option_count(FieldType::Radio), 2);
        assert_eq!(default_option_count(FieldType::Text), 0);
    }

    #[test]
    fn test_default_label() {
        assert_eq!(default_label(FieldType::Checkbox), "New Checkbox Field");
    }

    #[test]
    fn test_operators_by_type() {
        assert!(operators_for(FieldType::Number).contains(&ConditionOperator::GreaterThan));
        assert!(!operators_for(FieldType::Number).contains(&ConditionOperator::Contains));
        assert!(operators_for(FieldType::Email).contains(&ConditionOperator::Contains));
        assert_eq!(operators_for(FieldType::Date).len(), 4);
    }

    #[test]
    fn test_catalog_is_complete() {
        assert_eq!(all().count(), 7);
        assert_eq!(info(FieldType::Text).bounds, Bounds::Length);
        assert_eq!(info(FieldType::Number).bounds, Bounds::Numeric);
    }
}
