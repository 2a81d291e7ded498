//! Field entity and the patches applied to it

use serde::{Deserialize, Serialize};

use crate::domain::catalog;
use crate::domain::value_objects::{
    Condition, ConditionOperator, ConditionalLogic, FieldId, FieldOption, FieldType, OptionId,
    ValidationRule,
};

/// One form input definition
///
/// Everything but `id` and `type` may be missing on the wire. Missing
/// properties take their empty value (a blank label, no options, no rules);
/// hydration then seeds the default options of option-bearing types.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub validation: ValidationRule,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub conditional_logic: ConditionalLogic,
}

impl Field {
    /// New field with the catalog defaults for its type
    pub fn new(field_type: FieldType) -> Self {
        Self {
            id: FieldId::generate(),
            field_type,
            label: catalog::default_label(field_type),
            placeholder: String::new(),
            required: false,
            validation: catalog::default_validation(field_type),
            options: default_options(field_type),
            conditional_logic: ConditionalLogic::default(),
        }
    }

    pub fn has_options(&self) -> bool {
        catalog::info(self.field_type).has_options
    }

    /// Whether any of this field's conditions targets `id`
    pub fn references(&self, id: &FieldId) -> bool {
        self.conditional_logic
            .conditions
            .iter()
            .any(|c| &c.field_id == id)
    }

    /// Copy placed after the original: fresh ids, "(Copy)" label, no conditions
    pub(crate) fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = FieldId::generate();
        copy.label = format!("{} (Copy)", self.label);
        for option in &mut copy.options {
            option.id = OptionId::generate();
        }
        copy.conditional_logic.conditions.clear();
        copy
    }
}

pub(crate) fn default_options(field_type: FieldType) -> Vec<FieldOption> {
    (1..=catalog::default_option_count(field_type))
        .map(FieldOption::numbered)
        .collect()
}

/// Partial update for a field; `None` leaves the property unchanged
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldPatch {
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    pub validation: Option<ValidationRule>,
    pub options: Option<Vec<FieldOption>>,
    pub conditional_logic: Option<ConditionalLogic>,
}

impl FieldPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Partial update for an option
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionPatch {
    pub label: Option<String>,
    pub value: Option<String>,
}

/// Partial update for a condition
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionPatch {
    pub field_id: Option<FieldId>,
    pub operator: Option<ConditionOperator>,
    pub value: Option<String>,
}

impl ConditionPatch {
    pub(crate) fn apply(&self, condition: &mut Condition) {
        if let Some(field_id) = &self.field_id {
            condition.field_id = field_id.clone();
        }
        if let Some(operator) = self.operator {
            condition.operator = operator;
        }
        if let Some(value) = &self.value {
            condition.value = value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ConditionalAction;

    #[test]
    fn test_new_field_defaults() {
        let field = Field::new(FieldType::Dropdown);
        assert_eq!(field.label, "New Dropdown Field");
        assert!(!field.required);
        assert_eq!(field.options.len(), 2);
        assert_eq!(field.options[0].label, "Option 1");
        assert_eq!(field.options[1].value, "option2");
        assert_eq!(field.validation, ValidationRule::default());
        assert!(!field.conditional_logic.enabled);
        assert_eq!(field.conditional_logic.action, ConditionalAction::Show);

        assert!(Field::new(FieldType::Email).options.is_empty());
    }

    #[test]
    fn test_minimal_wire_field() {
        let field: Field = serde_json::from_str(r#"{"id": "f1", "type": "number"}"#).unwrap();
        assert_eq!(field.id.as_str(), "f1");
        assert_eq!(field.field_type, FieldType::Number);
        assert!(field.conditional_logic.conditions.is_empty());
    }

    #[test]
    fn test_duplicate_refreshes_ids() {
        let mut field = Field::new(FieldType::Radio);
        field.conditional_logic.enabled = true;
        field.conditional_logic.action = ConditionalAction::Hide;
        field.conditional_logic.conditions.push(Condition::new(
            FieldId::from("other"),
            ConditionOperator::Equals,
            "x",
        ));

        let copy = field.duplicate();
        assert_ne!(copy.id, field.id);
        assert_eq!(copy.label, format!("{} (Copy)", field.label));
        for (a, b) in copy.options.iter().zip(&field.options) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.value, b.value);
        }
        assert!(copy.conditional_logic.conditions.is_empty());
        assert!(copy.conditional_logic.enabled);
        assert_eq!(copy.conditional_logic.action, ConditionalAction::Hide);
    }

    #[test]
    fn test_patch_from_json() {
        let patch: FieldPatch = serde_json::from_str(r#"{"label": "Age", "required": true}"#).unwrap();
        assert_eq!(patch.label.as_deref(), Some("Age"));
        assert_eq!(patch.required, Some(true));
        assert!(patch.options.is_none());
        assert!(FieldPatch::default().is_empty());
    }
}
