//! Input value snapshot and the coercions applied to it
//!
//! Values arrive as loosely typed JSON (strings from text inputs, booleans
//! from checkboxes, occasionally numbers). Comparisons coerce the same way a
//! browser form would: `String(v)` for text comparisons, `Number(v)` for
//! numeric ones.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::FieldId;

/// Current input values keyed by field id
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(HashMap<FieldId, Value>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for a field; `null` counts as absent
    pub fn get(&self, id: &FieldId) -> Option<&Value> {
        self.0.get(id).filter(|v| !v.is_null())
    }

    pub fn set(&mut self, id: FieldId, value: impl Into<Value>) {
        self.0.insert(id, value.into());
    }

    pub fn remove(&mut self, id: &FieldId) -> Option<Value> {
        self.0.remove(id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builder-style insert, handy for literals
    pub fn with(mut self, id: impl Into<FieldId>, value: impl Into<Value>) -> Self {
        self.set(id.into(), value);
        self
    }
}

impl FromIterator<(FieldId, Value)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (FieldId, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// String form of a value
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_number(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Numeric form of a value; `NaN` when it has none
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number(s),
        Value::Array(_) => parse_number(&stringify(value)),
        Value::Object(_) => f64::NAN,
    }
}

/// Numeric parse of text input; blank text is zero
pub fn parse_number(text: &str) -> f64 {
    let t = text.trim();
    if t.is_empty() {
        return 0.0;
    }

    let (sign, unsigned) = match t.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, t.strip_prefix('+').unwrap_or(t)),
    };

    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    // Hex literals never carry a sign
    if sign > 0.0 && !t.starts_with('+') {
        if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
            return i64::from_str_radix(hex, 16)
                .map(|n| n as f64)
                .unwrap_or(f64::NAN);
        }
    }
    // Rust accepts "inf" and "nan" spellings that form input does not
    if unsigned.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }

    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// Whether a value counts as "set" in a boolean context
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Absent or the empty string
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn format_number(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        // f64's Display already drops a trailing ".0"
        format!("{}", f)
    }
}
