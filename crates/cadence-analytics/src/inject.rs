//! # Context Injector
//!
//! Produces a new record whose context is the existing map context merged
//! with additional entries, plus an [`INJECTION_KEY`] metadata block:
//!
//! ```json
//! {"_injection": {"injectedAt": 1700000000000, "source": "context_injector", "version": "1.0"}}
//! ```
//!
//! Additional entries win over existing ones. The metadata block is written
//! after the merge, so neither can override it. A non-map existing context is
//! discarded.

use cadence_core::{Codec, CodecError, EncodedRecord, Map, Value, FORMAT_VERSION};
use serde::{Deserialize, Serialize};

/// Context key of the injection metadata block.
pub const INJECTION_KEY: &str = "_injection";

/// Source label used when none is configured.
pub const DEFAULT_SOURCE: &str = "context_injector";

/// Options for a single injection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectOptions {
    /// Label recorded as `source` in the metadata block.
    pub source: String,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

/// Merges additional context into encoded records.
#[derive(Debug, Clone, Default)]
pub struct ContextInjector {
    codec: Codec,
    options: InjectOptions,
}

impl ContextInjector {
    /// Build an injector.
    pub fn new(codec: Codec, options: InjectOptions) -> Self {
        Self { codec, options }
    }

    /// Decode, merge, stamp, and re-encode. The record's own timestamp is kept;
    /// `injectedAt` comes from the codec's clock.
    ///
    /// # Errors
    ///
    /// Propagates decode failures of `event` and encode failures of the
    /// rebuilt record.
    pub fn inject(&self, event: &str, additional: &Map) -> Result<EncodedRecord, CodecError> {
        let mut record = self.codec.decode(event)?;

        let mut merged = match record.context.take() {
            Some(Value::Map(existing)) => existing,
            _ => Map::new(),
        };
        merged.extend(additional.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.insert(INJECTION_KEY.to_string(), self.metadata());

        tracing::debug!(
            activity = %record.activity,
            keys = merged.len(),
            "injected context"
        );

        record.context = Some(Value::Map(merged));
        Ok(self.codec.encode_record(&record)?)
    }

    fn metadata(&self) -> Value {
        let mut block = Map::new();
        block.insert(
            "injectedAt".to_string(),
            Value::from(self.codec.now_millis()),
        );
        block.insert("source".to_string(), Value::from(self.options.source.as_str()));
        block.insert("version".to_string(), Value::from(FORMAT_VERSION));
        Value::Map(block)
    }
}

/// Inject with the default codec.
///
/// # Errors
///
/// See [`ContextInjector::inject`].
pub fn inject_context(
    event: &str,
    additional: &Map,
    options: &InjectOptions,
) -> Result<EncodedRecord, CodecError> {
    ContextInjector::new(Codec::default(), options.clone()).inject(event, additional)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{FixedClock, NullSink};
    use serde_json::json;
    use std::sync::Arc;

    const RECORDED_AT: i64 = 1_000;
    const INJECTED_AT: i64 = 9_000;

    fn codec_at(ms: i64) -> Codec {
        Codec::new()
            .with_clock(Arc::new(FixedClock(ms)))
            .with_sink(Arc::new(NullSink))
    }

    fn injector() -> ContextInjector {
        ContextInjector::new(codec_at(INJECTED_AT), InjectOptions::default())
    }

    fn map(json: serde_json::Value) -> Map {
        match Value::from(json) {
            Value::Map(m) => m,
            other => panic!("expected map, got {other:?}"),
        }
    }

    fn event(context: Option<serde_json::Value>) -> String {
        let ctx = context.map(Value::from);
        codec_at(RECORDED_AT)
            .encode("purchase", &Value::Number(19.5), ctx.as_ref(), None)
            .unwrap()
            .into_string()
    }

    #[test]
    fn test_merge_additional_wins() {
        let out = injector()
            .inject(
                &event(Some(json!({"region": "eu", "tier": "free"}))),
                &map(json!({"tier": "pro", "campaign": "spring"})),
            )
            .unwrap();
        let record = codec_at(0).decode(out.as_str()).unwrap();
        let ctx = record.context_map().unwrap();
        assert_eq!(ctx["region"], Value::from("eu"));
        assert_eq!(ctx["tier"], Value::from("pro"));
        assert_eq!(ctx["campaign"], Value::from("spring"));
    }

    #[test]
    fn test_metadata_block() {
        let out = injector().inject(&event(None), &Map::new()).unwrap();
        let record = codec_at(0).decode(out.as_str()).unwrap();
        let ctx = record.context_map().unwrap();
        assert_eq!(
            ctx[INJECTION_KEY],
            Value::from(json!({
                "injectedAt": INJECTED_AT,
                "source": "context_injector",
                "version": FORMAT_VERSION,
            }))
        );
    }

    #[test]
    fn test_metadata_cannot_be_overridden() {
        let out = injector()
            .inject(
                &event(Some(json!({"_injection": "old"}))),
                &map(json!({"_injection": {"source": "forged"}})),
            )
            .unwrap();
        let record = codec_at(0).decode(out.as_str()).unwrap();
        let block = record.context_map().unwrap()[INJECTION_KEY].as_map().unwrap();
        assert_eq!(block["source"], Value::from("context_injector"));
    }

    #[test]
    fn test_timestamp_and_fields_preserved() {
        let out = injector().inject(&event(None), &map(json!({"a": 1}))).unwrap();
        let record = codec_at(0).decode(out.as_str()).unwrap();
        assert_eq!(record.timestamp, Some(RECORDED_AT));
        assert_eq!(record.activity, "purchase");
        assert_eq!(record.value, Value::Number(19.5));
        assert_eq!(record.version, FORMAT_VERSION);
    }

    #[test]
    fn test_non_map_context_replaced() {
        let raw = format!("purchase::{RECORDED_AT}::1::not json");
        let out = injector().inject(&raw, &map(json!({"k": true}))).unwrap();
        let record = codec_at(0).decode(out.as_str()).unwrap();
        let ctx = record.context_map().unwrap();
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx["k"], Value::Bool(true));
    }

    #[test]
    fn test_custom_source() {
        let injector = ContextInjector::new(
            codec_at(INJECTED_AT),
            InjectOptions {
                source: "enricher".into(),
            },
        );
        let out = injector.inject(&event(None), &Map::new()).unwrap();
        let record = codec_at(0).decode(out.as_str()).unwrap();
        let block = record.context_map().unwrap()[INJECTION_KEY].as_map().unwrap();
        assert_eq!(block["source"], Value::from("enricher"));
    }

    #[test]
    fn test_undecodable_event_errors() {
        assert!(injector().inject("x::y", &Map::new()).is_err());
    }
}
