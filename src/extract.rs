//! Best-effort recovery of fields from the payload the SDK serializes.
//!
//! The SDK's output is not guaranteed to be strictly well-formed JSON, so a strict
//! document parse is attempted first and a lenient YAML flow parse second. Extraction
//! never fails: when no value can be recovered the caller gets a sentinel describing why,
//! because a missing field is itself worth reporting.
use serde_json::{Map, Value};

const PREVIEW_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Found(String),
    /// The payload was empty.
    NullOrEmpty,
    /// The field is absent (or null, according to the strict parser).
    NotFound,
    /// The lenient parser found the field with a null value.
    NullValue,
    /// Neither parser could make sense of the payload.
    ParseError,
}

impl FieldValue {
    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Found(value) => value,
            FieldValue::NullOrEmpty => "NULL_OR_EMPTY",
            FieldValue::NotFound => "NOT_FOUND_IN_JSON",
            FieldValue::NullValue => "NULL_VALUE",
            FieldValue::ParseError => "PARSE_ERROR: Both methods failed",
        }
    }

    pub fn into_string(self) -> String {
        match self {
            FieldValue::Found(value) => value,
            sentinel => sentinel.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict view over a flat JSON object, the way the hosted-payment SDK reads its own output.
struct JsonDoc(Map<String, Value>);

impl JsonDoc {
    fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload).map(JsonDoc)
    }

    /// Scalars are returned in their textual form; null, nested and absent values yield `None`.
    fn get_value(&self, field_name: &str) -> Option<String> {
        match self.0.get(field_name)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum FallbackError {
    #[error(transparent)]
    Parse(#[from] serde_yaml::Error),
    #[error("field `{0}` is not a string")]
    NotAString(String),
    #[error("payload is not a mapping")]
    NotAMapping,
}

fn extract_leniently(payload: &str, field_name: &str) -> Result<FieldValue, FallbackError> {
    // A blank or `---` document parses as null, not as an empty mapping.
    let serde_yaml::Value::Mapping(mapping) = serde_yaml::from_str(payload)? else {
        return Err(FallbackError::NotAMapping);
    };
    match mapping.get(field_name) {
        None => Ok(FieldValue::NotFound),
        Some(serde_yaml::Value::Null) => Ok(FieldValue::NullValue),
        Some(serde_yaml::Value::String(value)) => Ok(FieldValue::Found(value.clone())),
        Some(_) => Err(FallbackError::NotAString(field_name.to_string())),
    }
}

#[tracing::instrument(name = "Extracting field from serialized payload", skip(payload))]
pub fn extract_field(payload: &str, field_name: &str) -> FieldValue {
    if payload.is_empty() {
        return FieldValue::NullOrEmpty;
    }
    tracing::debug!(
        "Attempting to parse {} from JSON: {}...",
        field_name,
        payload.chars().take(PREVIEW_LEN).collect::<String>()
    );

    let strict_error = match JsonDoc::parse(payload) {
        Ok(document) => {
            let value = document.get_value(field_name);
            tracing::debug!("Strict parser recovered {}: {:?}", field_name, value);
            return value.map(FieldValue::Found).unwrap_or(FieldValue::NotFound);
        }
        Err(e) => e,
    };
    tracing::debug!("Strict parsing failed for {}: {}", field_name, strict_error);

    match extract_leniently(payload, field_name) {
        Ok(value) => {
            tracing::debug!("Lenient parser recovered {}: {}", field_name, value);
            value
        }
        Err(lenient_error) => {
            tracing::error!(
                "Both parsing methods failed for {}. Strict: {}, lenient: {}",
                field_name,
                strict_error,
                lenient_error
            );
            FieldValue::ParseError
        }
    }
}
