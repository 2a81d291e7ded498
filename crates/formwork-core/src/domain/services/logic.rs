//! Conditional-logic evaluation
//!
//! Visibility and disabled state are two independent projections of the same
//! "conditions met" boolean; which one moves is selected by the action.

use serde::Serialize;
use serde_json::Value;

use crate::domain::aggregates::{Field, FormSchema};
use crate::domain::value_objects::values::{stringify, to_number};
use crate::domain::value_objects::{
    Condition, ConditionOperator, ConditionalAction, FieldId, FormValues, LogicType,
};

/// Evaluate one condition against the current values
pub fn evaluate_condition(condition: &Condition, values: &FormValues) -> bool {
    let Some(field_value) = values.get(&condition.field_id) else {
        // An absent value never satisfies a comparison
        return condition.operator == ConditionOperator::IsEmpty;
    };

    match condition.operator {
        ConditionOperator::Equals => lowered(field_value) == condition.value.to_lowercase(),
        ConditionOperator::NotEquals => lowered(field_value) != condition.value.to_lowercase(),
        ConditionOperator::Contains => {
            lowered(field_value).contains(&condition.value.to_lowercase())
        }
        ConditionOperator::GreaterThan => {
            to_number(field_value) > to_number(&Value::String(condition.value.clone()))
        }
        ConditionOperator::LessThan => {
            to_number(field_value) < to_number(&Value::String(condition.value.clone()))
        }
        ConditionOperator::IsEmpty => is_empty_value(field_value),
        ConditionOperator::IsNotEmpty => !is_empty_value(field_value),
    }
}

/// Combine a condition set; an empty set is always met
pub fn evaluate_conditions(conditions: &[Condition], logic_type: LogicType, values: &FormValues) -> bool {
    if conditions.is_empty() {
        return true;
    }
    match logic_type {
        LogicType::All => conditions.iter().all(|c| evaluate_condition(c, values)),
        LogicType::Any => conditions.iter().any(|c| evaluate_condition(c, values)),
    }
}

/// Whether a field should be rendered (and validated)
pub fn evaluate_field_visibility(field: &Field, values: &FormValues) -> bool {
    let logic = &field.conditional_logic;
    if !logic.is_active() {
        return true;
    }
    let met = evaluate_conditions(&logic.conditions, logic.logic_type, values);
    match logic.action {
        ConditionalAction::Show => met,
        ConditionalAction::Hide => !met,
        ConditionalAction::Enable | ConditionalAction::Disable => true,
    }
}

/// Whether a field should be rendered read-only
pub fn evaluate_field_disabled(field: &Field, values: &FormValues) -> bool {
    let logic = &field.conditional_logic;
    if !logic.is_active() {
        return false;
    }
    let met = evaluate_conditions(&logic.conditions, logic.logic_type, values);
    match logic.action {
        ConditionalAction::Enable => !met,
        ConditionalAction::Disable => met,
        ConditionalAction::Show | ConditionalAction::Hide => false,
    }
}

/// Derived state of one field
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldState {
    pub id: FieldId,
    pub visible: bool,
    pub disabled: bool,
}

/// Visible fields in schema order
pub fn visible_fields<'a>(schema: &'a FormSchema, values: &FormValues) -> Vec<&'a Field> {
    schema
        .fields()
        .iter()
        .filter(|f| evaluate_field_visibility(f, values))
        .collect()
}

/// Visibility and disabled state of every field, in schema order
pub fn field_states(schema: &FormSchema, values: &FormValues) -> Vec<FieldState> {
    schema
        .fields()
        .iter()
        .map(|f| FieldState {
            id: f.id.clone(),
            visible: evaluate_field_visibility(f, values),
            disabled: evaluate_field_disabled(f, values),
        })
        .collect()
}

/// Human-readable form of a condition, e.g. `"Age" is greater than "18"`
pub fn describe_condition(condition: &Condition, fields: &[Field]) -> String {
    let name = fields
        .iter()
        .find(|f| f.id == condition.field_id)
        .map(|f| f.label.as_str())
        .unwrap_or("Unknown field");

    if condition.operator.is_unary() {
        format!("\"{}\" {}", name, condition.operator.phrase())
    } else {
        format!("\"{}\" {} \"{}\"", name, condition.operator.phrase(), condition.value)
    }
}

fn lowered(value: &Value) -> String {
    stringify(value).to_lowercase()
}

fn is_empty_value(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty()) || matches!(value, Value::Bool(false))
}
