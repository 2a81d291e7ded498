//! Validation engine
//!
//! Required-ness short-circuits; type and pattern checks accumulate.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tracing::warn;

use super::logic::visible_fields;
use crate::domain::aggregates::{Field, FormSchema};
use crate::domain::catalog::{self, Bounds};
use crate::domain::value_objects::values::{is_blank, is_truthy, stringify, to_number};
use crate::domain::value_objects::{FieldId, FieldType, FormValues};

/// Outcome for a single field
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl FieldValidation {
    pub fn ok() -> Self {
        Self { valid: true, errors: Vec::new() }
    }

    fn from_errors(errors: Vec<String>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }
}

/// Outcome for a set of fields
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValidation {
    pub is_valid: bool,
    pub field_results: BTreeMap<FieldId, FieldValidation>,
}

impl FormValidation {
    /// Results that carry at least one error
    pub fn failures(&self) -> impl Iterator<Item = (&FieldId, &FieldValidation)> {
        self.field_results.iter().filter(|(_, r)| !r.valid)
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

/// Whether text looks like a single-`@` address with a dotted domain
pub fn is_valid_email(text: &str) -> bool {
    email_regex().is_match(text)
}

/// User patterns compiled once per validation pass
///
/// A pattern that fails to compile is remembered as `None` and skipped.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<String, Option<Regex>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, source: &str) -> Option<&Regex> {
        self.compiled
            .entry(source.to_string())
            .or_insert_with(|| match Regex::new(source) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    // A broken pattern never blocks the user
                    warn!(pattern = source, error = %err, "ignoring invalid pattern");
                    None
                }
            })
            .as_ref()
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// Check one value against a field's rules
pub fn validate_field(field: &Field, value: Option<&Value>) -> FieldValidation {
    validate_field_with(field, value, &mut PatternCache::new())
}

/// `validate_field` reusing patterns already compiled in `patterns`
pub fn validate_field_with(field: &Field, value: Option<&Value>, patterns: &mut PatternCache) -> FieldValidation {
    let rule = &field.validation;
    let message = |fallback: String| rule.custom_message().map(str::to_string).unwrap_or(fallback);

    if field.required {
        if is_blank(value) {
            return FieldValidation::from_errors(vec![message(format!("{} is required", field.label))]);
        }
        if field.field_type == FieldType::Checkbox && !value.map(is_truthy).unwrap_or(false) {
            return FieldValidation::from_errors(vec![message(format!("{} must be checked", field.label))]);
        }
    }

    // Optional and empty is always valid
    let Some(value) = value.filter(|v| !is_blank(Some(*v))) else {
        return FieldValidation::ok();
    };

    let mut errors = Vec::new();

    if field.field_type == FieldType::Email && !is_valid_email(&stringify(value)) {
        errors.push(message("Please enter a valid email address".to_string()));
    }

    match catalog::info(field.field_type).bounds {
        Bounds::Numeric => {
            let number = to_number(value);
            if number.is_nan() {
                errors.push(message("Please enter a valid number".to_string()));
            } else {
                if let Some(min) = rule.min.filter(|min| number < *min) {
                    errors.push(message(format!("Value must be at least {}", min)));
                }
                if let Some(max) = rule.max.filter(|max| number > *max) {
                    errors.push(message(format!("Value must be at most {}", max)));
                }
            }
        }
        Bounds::Length => {
            let length = stringify(value).chars().count() as f64;
            if let Some(min) = rule.min.filter(|min| length < *min) {
                errors.push(message(format!("Must be at least {} characters", min)));
            }
            if let Some(max) = rule.max.filter(|max| length > *max) {
                errors.push(message(format!("Must be at most {} characters", max)));
            }
        }
        Bounds::None => {}
    }

    if let Some(source) = rule.pattern_source().filter(|_| is_truthy(value)) {
        if let Some(pattern) = patterns.get(source) {
            if !pattern.is_match(&stringify(value)) {
                errors.push(message("Value does not match the required pattern".to_string()));
            }
        }
    }

    FieldValidation::from_errors(errors)
}

/// Validate exactly the given fields
pub fn validate_all_fields<'a>(
    fields: impl IntoIterator<Item = &'a Field>,
    values: &FormValues,
) -> FormValidation {
    let mut patterns = PatternCache::new();
    let field_results: BTreeMap<_, _> = fields
        .into_iter()
        .map(|field| {
            let result = validate_field_with(field, values.get(&field.id), &mut patterns);
            (field.id.clone(), result)
        })
        .collect();
    FormValidation {
        is_valid: field_results.values().all(|r| r.valid),
        field_results,
    }
}

/// Validate the fields currently visible under `values`
pub fn validate_submission(schema: &FormSchema, values: &FormValues) -> FormValidation {
    validate_all_fields(visible_fields(schema, values), values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::FieldPatch;
    use crate::domain::value_objects::{
        Condition, ConditionOperator, ConditionalAction, ConditionalLogic, LogicType, ValidationRule,
    };
    use serde_json::json;

    fn field(field_type: FieldType, label: &str) -> Field {
        let mut field = Field::new(field_type);
        field.label = label.into();
        field
    }

    fn bounded(field_type: FieldType, min: f64, max: f64) -> Field {
        let mut f = field(field_type, "Amount");
        f.validation = ValidationRule { min: Some(min), max: Some(max), ..Default::default() };
        f
    }

    #[test]
    fn test_required_empty_short_circuits() {
        let mut f = field(FieldType::Text, "Name");
        f.required = true;
        f.validation = ValidationRule {
            min: Some(3.0),
            pattern: Some("^[A-Z]".into()),
            ..Default::default()
        };

        let result = validate_field(&f, Some(&json!("")));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Name is required".to_string()]);

        let result = validate_field(&f, None);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_required_custom_message() {
        let mut f = field(FieldType::Email, "Email");
        f.required = true;
        f.validation.custom_error = "We need your email".into();
        assert_eq!(validate_field(&f, None).errors, vec!["We need your email".to_string()]);
    }

    #[test]
    fn test_required_checkbox() {
        let mut f = field(FieldType::Checkbox, "Terms");
        f.required = true;
        assert_eq!(validate_field(&f, Some(&json!(false))).errors, vec!["Terms must be checked".to_string()]);
        assert_eq!(validate_field(&f, None).errors, vec!["Terms is required".to_string()]);
        assert!(validate_field(&f, Some(&json!(true))).valid);
    }

    #[test]
    fn test_optional_empty_is_valid() {
        let f = bounded(FieldType::Number, 5.0, 10.0);
        assert_eq!(validate_field(&f, None), FieldValidation::ok());
        assert_eq!(validate_field(&f, Some(&json!(""))), FieldValidation::ok());
        assert_eq!(validate_field(&f, Some(&Value::Null)), FieldValidation::ok());
    }

    #[test]
    fn test_email() {
        let f = field(FieldType::Email, "Email");
        assert!(validate_field(&f, Some(&json!("ada@example.com"))).valid);
        for bad in ["ada", "ada@example", "a b@example.com", "ada@@example.com"] {
            let result = validate_field(&f, Some(&json!(bad)));
            assert_eq!(result.errors, vec!["Please enter a valid email address".to_string()], "{}", bad);
        }
    }

    #[test]
    fn test_number_bounds() {
        let f = bounded(FieldType::Number, 5.0, 10.0);

        let low = validate_field(&f, Some(&json!("3")));
        assert_eq!(low.errors, vec!["Value must be at least 5".to_string()]);

        let high = validate_field(&f, Some(&json!("12")));
        assert_eq!(high.errors, vec!["Value must be at most 10".to_string()]);

        assert!(validate_field(&f, Some(&json!("7"))).valid);
        assert!(validate_field(&f, Some(&json!(5))).valid);
        assert!(validate_field(&f, Some(&json!("10"))).valid);

        let nan = validate_field(&f, Some(&json!("seven")));
        assert_eq!(nan.errors, vec!["Please enter a valid number".to_string()]);
    }

    #[test]
    fn test_text_length() {
        let f = bounded(FieldType::Text, 2.0, 4.0);
        assert_eq!(
            validate_field(&f, Some(&json!("a"))).errors,
            vec!["Must be at least 2 characters".to_string()]
        );
        assert_eq!(
            validate_field(&f, Some(&json!("abcde"))).errors,
            vec!["Must be at most 4 characters".to_string()]
        );
        // Characters, not bytes
        assert!(validate_field(&f, Some(&json!("héé"))).valid);
    }

    #[test]
    fn test_errors_accumulate() {
        let mut f = bounded(FieldType::Number, 5.0, 10.0);
        f.validation.pattern = Some(r"^\d$".into());
        let result = validate_field(&f, Some(&json!("12")));
        assert_eq!(
            result.errors,
            vec![
                "Value must be at most 10".to_string(),
                "Value does not match the required pattern".to_string(),
            ]
        );
    }

    #[test]
    fn test_custom_error_replaces_each_message() {
        let mut f = bounded(FieldType::Number, 5.0, 10.0);
        f.validation.pattern = Some("^x$".into());
        f.validation.custom_error = "Pick 5-10".into();
        let result = validate_field(&f, Some(&json!("3")));
        assert_eq!(result.errors, vec!["Pick 5-10".to_string(), "Pick 5-10".to_string()]);
    }

    #[test]
    fn test_invalid_pattern_is_ignored() {
        let mut f = field(FieldType::Text, "Code");
        f.validation.pattern = Some("([a-z".into());
        assert!(validate_field(&f, Some(&json!("anything"))).valid);
    }

    #[test]
    fn test_patterns_compile_once_per_pass() {
        let mut patterns = PatternCache::new();
        let mut a = field(FieldType::Text, "A");
        a.validation.pattern = Some(r"^\d+$".into());
        let mut b = a.clone();
        b.id = FieldId::generate();
        let mut broken = field(FieldType::Text, "C");
        broken.validation.pattern = Some("([a-z".into());

        assert!(validate_field_with(&a, Some(&json!("12")), &mut patterns).valid);
        assert!(!validate_field_with(&b, Some(&json!("x")), &mut patterns).valid);
        assert!(validate_field_with(&broken, Some(&json!("x")), &mut patterns).valid);
        assert!(validate_field_with(&broken, Some(&json!("y")), &mut patterns).valid);
        assert_eq!(patterns.len(), 2);
        assert!(patterns.get("([a-z").is_none());
    }

    #[test]
    fn test_bounds_follow_catalog() {
        // Email, date and choice types carry no bounds
        for field_type in [FieldType::Email, FieldType::Date, FieldType::Dropdown] {
            let f = bounded(field_type, 100.0, 200.0);
            assert!(validate_field(&f, Some(&json!("ada@example.com"))).valid, "{}", field_type);
        }
    }

    #[test]
    fn test_pattern_is_unanchored_search() {
        let mut f = field(FieldType::Date, "When");
        f.validation.pattern = Some(r"\d{4}".into());
        assert!(validate_field(&f, Some(&json!("on 2024-01-01"))).valid);
        assert!(!validate_field(&f, Some(&json!("soon"))).valid);
    }

    #[test]
    fn test_validate_all_fields() {
        let mut name = field(FieldType::Text, "Name");
        name.required = true;
        let age = bounded(FieldType::Number, 18.0, 99.0);
        let fields = vec![name.clone(), age.clone()];

        let values = FormValues::new()
            .with(name.id.as_str(), "Ada")
            .with(age.id.as_str(), "12");
        let result = validate_all_fields(&fields, &values);
        assert!(!result.is_valid);
        assert!(result.field_results[&name.id].valid);
        assert!(!result.field_results[&age.id].valid);
        assert_eq!(result.failures().count(), 1);

        let empty = validate_all_fields(&[], &values);
        assert!(empty.is_valid);
        assert!(empty.field_results.is_empty());
    }

    #[test]
    fn test_hidden_fields_are_not_validated() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Text);
        let b = schema.add_field(FieldType::Number);
        schema.update_field(&a, FieldPatch { required: Some(true), ..Default::default() });
        schema.update_field(&b, FieldPatch {
            required: Some(true),
            conditional_logic: Some(ConditionalLogic {
                enabled: true,
                action: ConditionalAction::Show,
                logic_type: LogicType::All,
                conditions: vec![Condition::new(a.clone(), ConditionOperator::Equals, "x")],
            }),
            ..Default::default()
        });

        let result = validate_submission(&schema, &FormValues::new());
        assert!(!result.is_valid);
        assert!(result.field_results.contains_key(&a));
        assert!(!result.field_results.contains_key(&b));

        // Once shown, B is checked too
        let values = FormValues::new().with(a.as_str(), "x");
        let result = validate_submission(&schema, &values);
        assert_eq!(result.field_results[&b].errors, vec!["New Number Field is required".to_string()]);
    }
}
