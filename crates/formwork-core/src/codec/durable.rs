//! Durable encoding for storage and file export

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::aggregates::SchemaPayload;
use crate::error::{FormsError, Result};

/// Version tag written into every durable document
pub const SCHEMA_VERSION: &str = "1.0";

/// A stored or exported schema with its metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurableDocument {
    #[serde(flatten)]
    pub payload: SchemaPayload,
    #[serde(
        rename = "savedAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "exportedAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl DurableDocument {
    /// Document for the persistence collaborator
    pub fn saved(payload: SchemaPayload, now: DateTime<Utc>) -> Self {
        Self {
            payload,
            saved_at: Some(now),
            exported_at: None,
            version: Some(SCHEMA_VERSION.to_string()),
        }
    }

    /// Document for a file export
    pub fn exported(payload: SchemaPayload, now: DateTime<Utc>) -> Self {
        Self {
            payload,
            saved_at: None,
            exported_at: Some(now),
            version: Some(SCHEMA_VERSION.to_string()),
        }
    }
}

/// Compact JSON for storage
pub fn encode_for_storage(payload: &SchemaPayload, now: DateTime<Utc>) -> Result<String> {
    serde_json::to_string(&DurableDocument::saved(payload.clone(), now))
        .map_err(|e| FormsError::Encode(e.to_string()))
}

/// Pretty JSON for a file export
pub fn encode_for_export(payload: &SchemaPayload, now: DateTime<Utc>) -> Result<String> {
    serde_json::to_string_pretty(&DurableDocument::exported(payload.clone(), now))
        .map_err(|e| FormsError::Encode(e.to_string()))
}

/// Decode a stored or exported document; unknown keys are ignored
pub fn decode_document(text: &str) -> Result<DurableDocument> {
    let value: Value = serde_json::from_str(text)?;
    match value.get("fields") {
        Some(Value::Array(_)) if value.is_object() => {}
        _ => {
            return Err(FormsError::Decode(
                "expected an object with a \"fields\" array".into(),
            ))
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// File name for an export: `<title>-<unix millis>.json`
pub fn export_file_name(title: &str, now: DateTime<Utc>) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() { "form" } else { stem.as_str() };
    format!("{}-{}.json", stem, now.timestamp_millis())
}

// Unparsable timestamps are dropped rather than failing the whole document
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::FormSchema;
    use crate::domain::value_objects::FieldType;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
    }

    fn every_type_payload() -> SchemaPayload {
        let mut schema = FormSchema::with_title("Contact");
        for field_type in FieldType::ALL {
            schema.add_field(field_type);
        }
        schema.to_payload()
    }

    #[test]
    fn test_storage_round_trip() {
        let payload = every_type_payload();
        let text = encode_for_storage(&payload, now()).unwrap();
        let doc = decode_document(&text).unwrap();
        assert_eq!(doc.payload, payload);
        assert_eq!(doc.saved_at, Some(now()));
        assert_eq!(doc.exported_at, None);
        assert_eq!(doc.version.as_deref(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_export_round_trip() {
        let payload = every_type_payload();
        let text = encode_for_export(&payload, now()).unwrap();
        assert!(text.contains('\n'), "export is pretty-printed");

        let raw: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(raw["formTitle"], "Contact");
        assert_eq!(raw["version"], "1.0");
        assert!(raw.get("savedAt").is_none());

        let doc = decode_document(&text).unwrap();
        assert_eq!(doc.payload, payload);
        assert_eq!(doc.exported_at, Some(now()));
    }

    #[test]
    fn test_decode_ignores_unknown_keys() {
        let text = r#"{
            "formTitle": "Legacy",
            "fields": [],
            "theme": "dark",
            "savedAt": "2024-05-17T09:30:00.000Z"
        }"#;
        let doc = decode_document(text).unwrap();
        assert_eq!(doc.payload.title, "Legacy");
        assert_eq!(doc.saved_at, Some(now()));
        assert_eq!(doc.version, None);
    }

    #[test]
    fn test_decode_defaults_missing_title() {
        let doc = decode_document(r#"{"fields": []}"#).unwrap();
        assert_eq!(doc.payload.title, "Untitled Form");
        assert_eq!(doc.payload.description, "");
    }

    #[test]
    fn test_decode_tolerates_bad_timestamp() {
        let doc = decode_document(r#"{"fields": [], "savedAt": "yesterday"}"#).unwrap();
        assert_eq!(doc.saved_at, None);
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        for text in ["", "[]", "42", r#"{"formTitle": "x"}"#, r#"{"fields": {}}"#, "{not json"] {
            assert!(matches!(decode_document(text), Err(FormsError::Decode(_))), "{:?}", text);
        }
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Signup", now()), format!("Signup-{}.json", now().timestamp_millis()));
        assert_eq!(export_file_name("  ", now()), format!("form-{}.json", now().timestamp_millis()));
        assert!(export_file_name("a/b:c", now()).starts_with("a-b-c-"));
    }

    proptest! {
        #[test]
        fn prop_storage_round_trip(title in ".*", min in proptest::option::of(-1_000_000i32..1_000_000)) {
            let mut payload = every_type_payload();
            payload.title = title;
            payload.fields[0].validation.min = min.map(f64::from);
            let doc = decode_document(&encode_for_storage(&payload, now()).unwrap()).unwrap();
            prop_assert_eq!(doc.payload, payload);
        }
    }
}
