//! # Activity Record Codec
//!
//! Encodes and decodes the delimiter-joined wire form of an activity record:
//!
//! ```text
//! activity::timestamp::value::context::version
//! ```
//!
//! ## Encoding Rules
//!
//! - The activity must be non-empty. Activity, text values, JSON string
//!   leaves, JSON keys and the version are escaped (see [`crate::escape`]).
//! - Numbers and booleans render as literal text, temporal values as epoch
//!   milliseconds, lists and maps as compact JSON. Containers nested deeper
//!   than [`MAX_ENCODE_DEPTH`] render as `null` and raise a
//!   [`DiagnosticKind::DepthLimit`] diagnostic.
//! - A serialized context longer than [`ENVELOPE_THRESHOLD`] characters is
//!   wrapped in an [`IntegrityEnvelope`].
//! - Interior empty fields are kept so positions never shift; trailing empty
//!   fields are dropped. Fewer than three non-empty fields is a
//!   [`EncodingError::Structural`] failure.
//!
//! ## Decoding Rules
//!
//! Only field count is mandatory. Everything else degrades:
//!
//! - A non-integer timestamp decodes as `None`.
//! - The value is tried as a JSON object, a JSON array, a finite number, the
//!   keywords `true`/`false`/`null`/`inf`/`-inf`, and finally kept as text. A text value
//!   that looks like one of the earlier forms (e.g. `"42"`) therefore decodes
//!   as that form.
//! - A context that is not a JSON object is kept as raw [`Value::Text`].
//!   Envelopes whose data exceeds [`ENVELOPE_THRESHOLD`] are unwrapped
//!   transparently; a checksum mismatch is reported but does not fail the
//!   decode. Smaller envelope-shaped objects are ordinary context.
//! - A missing version decodes as [`FORMAT_VERSION`].

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
use crate::envelope::{IntegrityEnvelope, ENVELOPE_THRESHOLD};
use crate::error::{DecodingError, EncodingError};
use crate::escape::{escape, join_fields, split_fields, unescape};
use crate::value::{Map, Value};

/// The current wire format version.
pub const FORMAT_VERSION: &str = "1.0";

/// Maximum container nesting depth rendered by the encoder.
pub const MAX_ENCODE_DEPTH: usize = 10;

/// Minimum number of non-empty fields in a valid record.
pub const MIN_FIELDS: usize = 3;

/// Number of positional fields in the wire format.
pub const FIELD_COUNT: usize = 5;

/// Largest integer magnitude an `f64` carries exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

// ---------------------------------------------------------------------------
// EncodedRecord
// ---------------------------------------------------------------------------

/// The text form of an activity record.
///
/// The inner string is private: an `EncodedRecord` is only ever produced by
/// [`Codec`], so holding one means the text satisfies the wire invariants
/// (at least three non-empty fields, escaped text).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedRecord(String);

impl EncodedRecord {
    /// Borrow the wire text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take ownership of the wire text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Length of the wire text in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a valid record; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for EncodedRecord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EncodedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ActivityRecord
// ---------------------------------------------------------------------------

/// A decoded activity record.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    /// What kind of action this record describes.
    pub activity: String,
    /// Epoch milliseconds, or `None` if the wire field was not numeric.
    pub timestamp: Option<i64>,
    /// The record's value.
    pub value: Value,
    /// Structured context (a `Map`), raw text if it failed to parse, or `None`.
    pub context: Option<Value>,
    /// Wire format version the record was written with.
    pub version: String,
}

impl ActivityRecord {
    /// The context as a map, if it parsed as one.
    pub fn context_map(&self) -> Option<&Map> {
        self.context.as_ref().and_then(Value::as_map)
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Encoder/decoder carrying the injected clock and diagnostics sink.
#[derive(Debug, Clone)]
pub struct Codec {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for Codec {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingSink),
        }
    }
}

impl Codec {
    /// A codec using the system clock and the tracing sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the diagnostics sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The injected clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Current time from the injected clock.
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Encode a new record stamped with the current time.
    ///
    /// # Errors
    ///
    /// - [`EncodingError::InvalidActivity`] if `activity` is empty.
    /// - [`EncodingError::Structural`] if fewer than three fields are non-empty.
    /// - [`EncodingError::Serialization`] if JSON rendering fails.
    pub fn encode(
        &self,
        activity: &str,
        value: &Value,
        context: Option<&Value>,
        version: Option<&str>,
    ) -> Result<EncodedRecord, EncodingError> {
        self.encode_at(
            activity,
            self.clock.now_millis(),
            value,
            context,
            version.unwrap_or(FORMAT_VERSION),
        )
    }

    /// Re-encode a decoded record, keeping its timestamp. A record whose
    /// timestamp did not decode is stamped with the current time.
    pub fn encode_record(&self, record: &ActivityRecord) -> Result<EncodedRecord, EncodingError> {
        let timestamp = record
            .timestamp
            .unwrap_or_else(|| self.clock.now_millis());
        self.encode_at(
            &record.activity,
            timestamp,
            &record.value,
            record.context.as_ref(),
            &record.version,
        )
    }

    fn encode_at(
        &self,
        activity: &str,
        timestamp: i64,
        value: &Value,
        context: Option<&Value>,
        version: &str,
    ) -> Result<EncodedRecord, EncodingError> {
        if activity.is_empty() {
            return Err(EncodingError::InvalidActivity);
        }

        let fields = [
            escape(activity),
            timestamp.to_string(),
            self.render_value(value)?,
            match context {
                Some(ctx) => self.render_context(ctx)?,
                None => String::new(),
            },
            escape(version),
        ];

        let non_empty = fields.iter().filter(|f| !f.is_empty()).count();
        if non_empty < MIN_FIELDS {
            return Err(EncodingError::Structural { fields: non_empty });
        }

        Ok(EncodedRecord(join_fields(&fields)))
    }

    fn render_value(&self, value: &Value) -> Result<String, EncodingError> {
        Ok(match value {
            Value::Null => "null".to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Text(s) => escape(s),
            Value::Temporal(dt) => dt.timestamp_millis().to_string(),
            Value::List(_) | Value::Map(_) => serde_json::to_string(&self.to_wire_json(value, 0))?,
        })
    }

    fn render_context(&self, context: &Value) -> Result<String, EncodingError> {
        let json = match context {
            Value::Map(_) => self.to_wire_json(context, 0),
            other => return self.render_value(other),
        };
        let serialized = serde_json::to_string(&json)?;
        if serialized.chars().count() <= ENVELOPE_THRESHOLD {
            return Ok(serialized);
        }
        match json {
            serde_json::Value::Object(data) => {
                let envelope = IntegrityEnvelope::wrap(data, self.clock.now_millis())?;
                Ok(serde_json::to_string(&envelope)?)
            }
            _ => Ok(serialized),
        }
    }

    /// Convert a value to JSON for the wire: text escaped, temporal values as
    /// epoch milliseconds, containers beyond the depth cap dropped to `null`.
    fn to_wire_json(&self, value: &Value, depth: usize) -> serde_json::Value {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Number(n) => json_number(*n),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Text(s) => serde_json::Value::String(escape(s)),
            Value::Temporal(dt) => serde_json::Value::from(dt.timestamp_millis()),
            Value::List(_) | Value::Map(_) if depth > MAX_ENCODE_DEPTH => {
                self.sink.emit(Diagnostic::new(
                    DiagnosticKind::DepthLimit,
                    format!(
                        "{} nested deeper than {MAX_ENCODE_DEPTH} levels encoded as null",
                        value.kind()
                    ),
                ));
                serde_json::Value::Null
            }
            Value::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| self.to_wire_json(item, depth + 1))
                    .collect(),
            ),
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (escape(k), self.to_wire_json(v, depth + 1)))
                    .collect(),
            ),
        }
    }

    /// Decode a record.
    ///
    /// # Errors
    ///
    /// [`DecodingError::TooShort`] if the text has fewer than three non-empty
    /// fields. No other condition fails.
    pub fn decode(&self, text: &str) -> Result<ActivityRecord, DecodingError> {
        let fields = split_fields(text);
        let non_empty = fields.iter().filter(|f| !f.is_empty()).count();
        if non_empty < MIN_FIELDS {
            return Err(DecodingError::TooShort { fields: non_empty });
        }
        if fields.len() > FIELD_COUNT {
            self.sink.emit(Diagnostic::new(
                DiagnosticKind::SurplusFields,
                format!("record has {} fields; fields after the fifth ignored", fields.len()),
            ));
        }
        let field = |i: usize| fields.get(i).copied().unwrap_or("");

        let version = match field(4) {
            "" => FORMAT_VERSION.to_string(),
            v => unescape(v),
        };

        Ok(ActivityRecord {
            activity: unescape(field(0)),
            timestamp: self.decode_timestamp(field(1)),
            value: decode_value(field(2)),
            context: self.decode_context(field(3)),
            version,
        })
    }

    fn decode_timestamp(&self, raw: &str) -> Option<i64> {
        if let Ok(ms) = raw.parse::<i64>() {
            return Some(ms);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() && f.abs() < MAX_EXACT_INTEGER => Some(f.trunc() as i64),
            _ => {
                self.sink.emit(Diagnostic::new(
                    DiagnosticKind::InvalidTimestamp,
                    format!("timestamp {raw:?} is not an integer"),
                ));
                None
            }
        }
    }

    fn decode_context(&self, raw: &str) -> Option<Value> {
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(json) if json.is_object() => {
                let envelope =
                    IntegrityEnvelope::detect(&json).filter(IntegrityEnvelope::exceeds_threshold);
                if let Some(envelope) = envelope {
                    if !envelope.verify() {
                        self.sink.emit(Diagnostic::new(
                            DiagnosticKind::IntegrityMismatch,
                            format!(
                                "context checksum {} does not match its data",
                                envelope.integrity
                            ),
                        ));
                    }
                    return Some(from_wire_json(serde_json::Value::Object(envelope.into_data())));
                }
                Some(from_wire_json(json))
            }
            _ => {
                self.sink.emit(Diagnostic::new(
                    DiagnosticKind::UnparsedContext,
                    "context is not a JSON object; kept as raw text",
                ));
                Some(Value::Text(unescape(raw)))
            }
        }
    }
}

fn decode_value(raw: &str) -> Value {
    if raw.starts_with('{') || raw.starts_with('[') {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(raw) {
            if json.is_object() || json.is_array() {
                return from_wire_json(json);
            }
        }
    }
    if let Ok(n) = raw.parse::<f64>() {
        if n.is_finite() {
            return Value::Number(n);
        }
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        "inf" => Value::Number(f64::INFINITY),
        "-inf" => Value::Number(f64::NEG_INFINITY),
        _ => Value::Text(unescape(raw)),
    }
}

/// Inverse of [`Codec::to_wire_json`] for everything except temporal values,
/// which come back as numbers.
fn from_wire_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::String(s) => Value::Text(unescape(&s)),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(from_wire_json).collect())
        }
        serde_json::Value::Object(obj) => Value::Map(
            obj.into_iter()
                .map(|(k, v)| (unescape(&k), from_wire_json(v)))
                .collect(),
        ),
        scalar => Value::from(scalar),
    }
}

fn json_number(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

// ---------------------------------------------------------------------------
// Convenience entry points
// ---------------------------------------------------------------------------

/// Encode with the system clock and tracing diagnostics.
pub fn encode(
    activity: &str,
    value: &Value,
    context: Option<&Value>,
    version: Option<&str>,
) -> Result<EncodedRecord, EncodingError> {
    Codec::default().encode(activity, value, context, version)
}

/// Decode with tracing diagnostics.
pub fn decode(text: &str) -> Result<ActivityRecord, DecodingError> {
    Codec::default().decode(text)
}
