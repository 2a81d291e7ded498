//! Link-share encoding
//!
//! JSON, percent-encoded, then base64. Links are written with the URL-safe
//! alphabet and no padding; reading also accepts the standard alphabet and
//! padding so older links keep opening.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::debug;
use url::Url;

use crate::domain::aggregates::SchemaPayload;
use crate::error::{FormsError, Result};

/// Query parameter carrying an encoded form
pub const SHARE_PARAM: &str = "form";

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode a payload for a share link
pub fn encode_share(payload: &SchemaPayload) -> Result<String> {
    let json = serde_json::to_string(payload).map_err(|e| FormsError::Encode(e.to_string()))?;
    let escaped = urlencoding::encode(&json);
    Ok(URL_SAFE_LENIENT.encode(escaped.as_bytes()))
}

/// Decode a share-link value back into a payload
pub fn decode_share(encoded: &str) -> Result<SchemaPayload> {
    // Query parsing turns '+' into ' '
    let cleaned = encoded.trim().replace(' ', "+");
    if cleaned.is_empty() {
        return Err(FormsError::Decode("empty share value".into()));
    }

    let bytes = URL_SAFE_LENIENT
        .decode(&cleaned)
        .or_else(|_| STANDARD_LENIENT.decode(&cleaned))
        .map_err(|e| FormsError::Decode(format!("invalid base64: {}", e)))?;
    let escaped = String::from_utf8(bytes)
        .map_err(|e| FormsError::Decode(format!("invalid text: {}", e)))?;
    let json = urlencoding::decode(&escaped)
        .map_err(|e| FormsError::Decode(format!("invalid percent-encoding: {}", e)))?;
    let payload: SchemaPayload = serde_json::from_str(&json)?;

    debug!(fields = payload.fields.len(), "decoded shared form");
    Ok(payload)
}

/// `base` with `form=<encoded>` set, other query parameters kept
pub fn build_share_url(base: &str, encoded: &str) -> Result<String> {
    let mut url = Url::parse(base).map_err(|e| FormsError::InvalidUrl(format!("{}: {}", base, e)))?;
    let kept = other_params(&url);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(SHARE_PARAM, encoded);
    }
    Ok(url.into())
}

/// The encoded form carried by a URL, if any
pub fn extract_shared_form(location: &str) -> Option<String> {
    let url = Url::parse(location).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == SHARE_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// The URL with the form parameter removed
pub fn strip_shared_form(location: &str) -> Result<String> {
    let mut url = Url::parse(location).map_err(|e| FormsError::InvalidUrl(format!("{}: {}", location, e)))?;
    let kept = other_params(&url);
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept.iter());
    }
    Ok(url.into())
}

fn other_params(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .filter(|(key, _)| key != SHARE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::FormSchema;
    use crate::domain::value_objects::{Condition, ConditionOperator, FieldType};
    use proptest::prelude::*;

    fn every_type_payload() -> SchemaPayload {
        let mut schema = FormSchema::with_title("Café signup ✓");
        let ids: Vec<_> = FieldType::ALL.iter().map(|t| schema.add_field(*t)).collect();
        let mut payload = schema.to_payload();
        payload.description = "Tell us 100% about you & yours".into();
        payload.fields[1].conditional_logic.enabled = true;
        payload.fields[1]
            .conditional_logic
            .conditions
            .push(Condition::new(ids[0].clone(), ConditionOperator::Contains, "a+b=c"));
        payload.fields[2].validation.min = Some(1.5);
        payload.fields[0].validation.pattern = Some(r"^\w+$".into());
        payload
    }

    #[test]
    fn test_share_round_trip() {
        let payload = every_type_payload();
        let encoded = encode_share(&payload).unwrap();
        assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(decode_share(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_decodes_standard_alphabet_with_padding() {
        let payload = every_type_payload();
        let json = serde_json::to_string(&payload).unwrap();
        let standard = base64::engine::general_purpose::STANDARD.encode(urlencoding::encode(&json).as_bytes());
        assert_eq!(decode_share(&standard).unwrap(), payload);
        // Same value after query parsing turned '+' into ' '
        assert_eq!(decode_share(&standard.replace('+', " ")).unwrap(), payload);
    }

    #[test]
    fn test_decode_failures_are_tagged() {
        for bad in ["", "!!!not base64!!!", "aGVsbG8", "JUZG"] {
            assert!(matches!(decode_share(bad), Err(FormsError::Decode(_))), "{:?}", bad);
        }
        // Valid JSON, wrong shape
        let encoded = URL_SAFE_LENIENT.encode(urlencoding::encode(r#"{"fields": 3}"#).as_bytes());
        assert!(matches!(decode_share(&encoded), Err(FormsError::Decode(_))));
    }

    #[test]
    fn test_decode_accepts_form_prefixed_keys() {
        let json = r#"{"formTitle":"T","formDescription":"D","fields":[{"id":"a","type":"text"}]}"#;
        let encoded = URL_SAFE_LENIENT.encode(urlencoding::encode(json).as_bytes());
        let payload = decode_share(&encoded).unwrap();
        assert_eq!(payload.title, "T");
        assert_eq!(payload.description, "D");
        assert_eq!(payload.fields.len(), 1);
        assert_eq!(payload.fields[0].id.as_str(), "a");
        assert_eq!(payload.fields[0].field_type, FieldType::Text);
    }

    #[test]
    fn test_build_and_extract_url() {
        let url = build_share_url("https://forms.example.com/builder?theme=dark&form=old", "abc_-1").unwrap();
        assert_eq!(url, "https://forms.example.com/builder?theme=dark&form=abc_-1");
        assert_eq!(extract_shared_form(&url).as_deref(), Some("abc_-1"));
        assert_eq!(strip_shared_form(&url).unwrap(), "https://forms.example.com/builder?theme=dark");

        let bare = build_share_url("https://forms.example.com/", "xyz").unwrap();
        assert_eq!(strip_shared_form(&bare).unwrap(), "https://forms.example.com/");
        assert!(extract_shared_form("https://forms.example.com/?form=").is_none());
        assert!(extract_shared_form("not a url").is_none());
        assert!(matches!(build_share_url("nope", "x"), Err(FormsError::InvalidUrl(_))));
    }

    #[test]
    fn test_share_url_round_trip() {
        let payload = every_type_payload();
        let url = build_share_url("https://forms.example.com/", &encode_share(&payload).unwrap()).unwrap();
        let encoded = extract_shared_form(&url).unwrap();
        assert_eq!(decode_share(&encoded).unwrap(), payload);
    }

    proptest! {
        #[test]
        fn prop_share_round_trip(title in ".*", description in ".*", label in ".*") {
            let mut payload = every_type_payload();
            payload.title = title;
            payload.description = description;
            payload.fields[3].label = label;
            let decoded = decode_share(&encode_share(&payload).unwrap()).unwrap();
            prop_assert_eq!(decoded, payload);
        }
    }
}
