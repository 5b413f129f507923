//! # Sanitizer
//!
//! Produces a new record whose context has the values of sensitive keys
//! replaced with a redaction marker. Key matching is ASCII case-insensitive.
//! Nested maps are redacted; maps inside lists are left untouched.
//!
//! Activity, value, version, and timestamp pass through unchanged.

use cadence_core::{Codec, CodecError, EncodedRecord, Map, Value};

/// Replacement for redacted values.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Keys redacted when no explicit list is given.
pub const DEFAULT_SENSITIVE_KEYS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "access_token",
    "refresh_token",
    "api_key",
    "apikey",
    "authorization",
    "credit_card",
    "card_number",
    "ssn",
];

/// Redacts sensitive context keys of encoded records.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    codec: Codec,
    keys: Vec<String>,
    marker: String,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(Codec::default(), DEFAULT_SENSITIVE_KEYS)
    }
}

impl Sanitizer {
    /// Build a sanitizer for the given keys, using [`REDACTION_MARKER`].
    pub fn new<S: AsRef<str>>(codec: Codec, keys: &[S]) -> Self {
        Self {
            codec,
            keys: keys.iter().map(|k| k.as_ref().to_ascii_lowercase()).collect(),
            marker: REDACTION_MARKER.to_string(),
        }
    }

    /// Replace the redaction marker.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    fn is_sensitive(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k.eq_ignore_ascii_case(key))
    }

    /// Decode, redact the context, and re-encode.
    ///
    /// # Errors
    ///
    /// Propagates decode failures of `event` and encode failures of the
    /// rebuilt record.
    pub fn sanitize(&self, event: &str) -> Result<EncodedRecord, CodecError> {
        let mut record = self.codec.decode(event)?;
        if let Some(Value::Map(context)) = record.context.as_mut() {
            self.redact_map(context);
        }
        Ok(self.codec.encode_record(&record)?)
    }

    /// Redact sensitive keys in place, recursing into nested maps.
    pub fn redact_map(&self, map: &mut Map) {
        for (key, value) in map.iter_mut() {
            if self.is_sensitive(key) {
                *value = Value::Text(self.marker.clone());
            } else if let Value::Map(nested) = value {
                self.redact_map(nested);
            }
        }
    }
}

/// Sanitize with the default codec and the given keys.
///
/// # Errors
///
/// See [`Sanitizer::sanitize`].
pub fn sanitize(event: &str, sensitive_keys: &[&str]) -> Result<EncodedRecord, CodecError> {
    Sanitizer::new(Codec::default(), sensitive_keys).sanitize(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{DecodingError, FixedClock, NullSink};
    use serde_json::json;
    use std::sync::Arc;

    fn codec() -> Codec {
        Codec::new()
            .with_clock(Arc::new(FixedClock(1_700_000_000_000)))
            .with_sink(Arc::new(NullSink))
    }

    fn event(context: serde_json::Value) -> String {
        codec()
            .encode("login", &Value::Number(1.0), Some(&Value::from(context)), Some("2.1"))
            .unwrap()
            .into_string()
    }

    #[test]
    fn test_nested_key_redacted() {
        let sanitizer = Sanitizer::new(codec(), &["email"]);
        let out = sanitizer
            .sanitize(&event(json!({"user": {"email": "x@y.com", "id": 1}})))
            .unwrap();
        let record = codec().decode(out.as_str()).unwrap();
        assert_eq!(
            record.context,
            Some(Value::from(json!({"user": {"email": "[REDACTED]", "id": 1}})))
        );
    }

    #[test]
    fn test_other_fields_preserved() {
        let sanitizer = Sanitizer::new(codec(), &["password"]);
        let original = event(json!({"password": "hunter2"}));
        let out = sanitizer.sanitize(&original).unwrap();
        let before = codec().decode(&original).unwrap();
        let after = codec().decode(out.as_str()).unwrap();
        assert_eq!(after.activity, before.activity);
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(after.value, before.value);
        assert_eq!(after.version, "2.1");
    }

    #[test]
    fn test_case_insensitive_match() {
        let sanitizer = Sanitizer::new(codec(), &["Token"]);
        let out = sanitizer
            .sanitize(&event(json!({"TOKEN": "abc", "tokens": "keep"})))
            .unwrap();
        let record = codec().decode(out.as_str()).unwrap();
        let ctx = record.context_map().unwrap();
        assert_eq!(ctx["TOKEN"], Value::Text(REDACTION_MARKER.into()));
        assert_eq!(ctx["tokens"], Value::Text("keep".into()));
    }

    #[test]
    fn test_lists_not_descended() {
        let sanitizer = Sanitizer::new(codec(), &["secret"]);
        let input = json!({"items": [{"secret": "s"}]});
        let out = sanitizer.sanitize(&event(input.clone())).unwrap();
        let record = codec().decode(out.as_str()).unwrap();
        assert_eq!(record.context, Some(Value::from(input)));
    }

    #[test]
    fn test_sensitive_container_replaced_whole() {
        let sanitizer = Sanitizer::new(codec(), &["credentials"]);
        let out = sanitizer
            .sanitize(&event(json!({"credentials": {"user": "u", "pass": "p"}})))
            .unwrap();
        let record = codec().decode(out.as_str()).unwrap();
        assert_eq!(
            record.context,
            Some(Value::from(json!({"credentials": "[REDACTED]"})))
        );
    }

    #[test]
    fn test_custom_marker() {
        let sanitizer = Sanitizer::new(codec(), &["ssn"]).with_marker("***");
        let out = sanitizer.sanitize(&event(json!({"ssn": "123"}))).unwrap();
        let record = codec().decode(out.as_str()).unwrap();
        assert_eq!(record.context_map().unwrap()["ssn"], Value::Text("***".into()));
    }

    #[test]
    fn test_default_keys() {
        let sanitizer = Sanitizer::new(codec(), DEFAULT_SENSITIVE_KEYS);
        let out = sanitizer
            .sanitize(&event(json!({"api_key": "k", "note": "n"})))
            .unwrap();
        let record = codec().decode(out.as_str()).unwrap();
        let ctx = record.context_map().unwrap();
        assert_eq!(ctx["api_key"], Value::Text(REDACTION_MARKER.into()));
        assert_eq!(ctx["note"], Value::Text("n".into()));
    }

    #[test]
    fn test_record_without_context_passes_through() {
        let plain = codec()
            .encode("view", &Value::Text("page".into()), None, None)
            .unwrap();
        let out = Sanitizer::new(codec(), &["password"]).sanitize(plain.as_str()).unwrap();
        assert_eq!(out, plain);
    }

    #[test]
    fn test_undecodable_event_errors() {
        let err = Sanitizer::new(codec(), &["password"]).sanitize("nope").unwrap_err();
        assert!(matches!(
            err,
            CodecError::Decoding(DecodingError::TooShort { .. })
        ));
    }
}
