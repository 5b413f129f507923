//! # Wire Format Test Vectors
//!
//! Pins the exact text produced by the codec for known inputs. If these
//! tests fail, records written by one build can no longer be read by
//! another, so every change here is a wire format break.
//!
//! Each vector checks the encoded text byte for byte and then decodes it
//! again through the public API.

use std::sync::Arc;

use cadence_core::{
    checksum, Codec, CollectingSink, DecodingError, DiagnosticKind, FixedClock, Map, Value,
    FORMAT_VERSION,
};

const NOW: i64 = 1_767_225_600_000;

fn codec() -> (Codec, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let codec = Codec::new()
        .with_clock(Arc::new(FixedClock(NOW)))
        .with_sink(sink.clone());
    (codec, sink)
}

fn map(value: serde_json::Value) -> Value {
    Value::from(value)
}

// ---------------------------------------------------------------------------
// Vector 1: Minimal record
// ---------------------------------------------------------------------------

#[test]
fn test_vector_minimal_record() {
    let (codec, sink) = codec();
    let rec = codec.encode("login", &Value::Number(1.0), None, None).unwrap();
    assert_eq!(rec.as_str(), "login::1767225600000::1::::1.0");

    let decoded = codec.decode(rec.as_str()).unwrap();
    assert_eq!(decoded.activity, "login");
    assert_eq!(decoded.timestamp, Some(NOW));
    assert_eq!(decoded.value, Value::Number(1.0));
    assert_eq!(decoded.version, FORMAT_VERSION);
    assert!(sink.is_empty());
}

// ---------------------------------------------------------------------------
// Vector 2: Sorted context keys and compact JSON
// ---------------------------------------------------------------------------

#[test]
fn test_vector_context_sorted_compact() {
    let (codec, _) = codec();
    let context = map(serde_json::json!({"zone": "eu", "attempt": 2, "meta": {"b": true, "a": null}}));
    let rec = codec
        .encode("purchase", &Value::Number(19.99), Some(&context), None)
        .unwrap();
    assert_eq!(
        rec.as_str(),
        r#"purchase::1767225600000::19.99::{"attempt":2,"meta":{"a":null,"b":true},"zone":"eu"}::1.0"#
    );
    assert_eq!(codec.decode(rec.as_str()).unwrap().context, Some(context));
}

// ---------------------------------------------------------------------------
// Vector 3: Escaping in every text position
// ---------------------------------------------------------------------------

#[test]
fn test_vector_escaping() {
    let (codec, _) = codec();
    let context = map(serde_json::json!({"k::x": "v::y"}));
    let rec = codec
        .encode("ns::evt", &Value::Text("a\\b::c:".into()), Some(&context), Some("2::beta"))
        .unwrap();
    assert_eq!(
        rec.as_str(),
        r#"ns\:evt::1767225600000::a\\b\:c\;::{"k\\:x":"v\\:y"}::2\:beta"#
    );

    let decoded = codec.decode(rec.as_str()).unwrap();
    assert_eq!(decoded.activity, "ns::evt");
    assert_eq!(decoded.value, Value::Text("a\\b::c:".into()));
    assert_eq!(decoded.context, Some(context));
    assert_eq!(decoded.version, "2::beta");
}

// ---------------------------------------------------------------------------
// Vector 4: Adjacent escape and delimiter
// ---------------------------------------------------------------------------

#[test]
fn test_vector_adjacent_escape_and_delimiter() {
    let (codec, _) = codec();
    // Activity ends with an escaped delimiter that sits directly before a real one.
    let rec = codec.encode("x::", &Value::Text(":y".into()), None, None).unwrap();
    assert_eq!(rec.as_str(), r#"x\:::1767225600000:::y::::1.0"#);

    let decoded = codec.decode(rec.as_str()).unwrap();
    assert_eq!(decoded.activity, "x::");
    assert_eq!(decoded.value, Value::Text(":y".into()));
}

// ---------------------------------------------------------------------------
// Vector 5: Integrity envelope
// ---------------------------------------------------------------------------

#[test]
fn test_vector_integrity_envelope() {
    let (codec, sink) = codec();
    let mut ctx = Map::new();
    for i in 0..60 {
        ctx.insert(format!("field_{i:02}"), Value::Text("abcdefghij".into()));
    }
    let context = Value::Map(ctx);
    let rec = codec.encode("bulk", &Value::Number(0.0), Some(&context), None).unwrap();

    let fields: Vec<&str> = rec.as_str().splitn(4, "::").collect();
    let context_field = fields[3].trim_end_matches("::1.0");
    let envelope: serde_json::Value = serde_json::from_str(context_field).unwrap();
    let data = serde_json::to_string(&envelope["data"]).unwrap();
    assert_eq!(envelope["integrity"], serde_json::Value::String(checksum(&data)));
    assert_eq!(envelope["generatedAt"], serde_json::json!(NOW));

    assert_eq!(codec.decode(rec.as_str()).unwrap().context, Some(context));
    assert!(sink.is_empty());
}

// ---------------------------------------------------------------------------
// Vector 6: Records written by other producers
// ---------------------------------------------------------------------------

#[test]
fn test_vector_foreign_records_degrade() {
    let (codec, sink) = codec();

    let decoded = codec.decode("scroll::not-a-time::0.5::{oops::1.0").unwrap();
    assert_eq!(decoded.timestamp, None);
    assert_eq!(decoded.value, Value::Number(0.5));
    assert_eq!(decoded.context, Some(Value::Text("{oops".into())));
    assert_eq!(sink.count(DiagnosticKind::InvalidTimestamp), 1);
    assert_eq!(sink.count(DiagnosticKind::UnparsedContext), 1);

    assert!(matches!(
        codec.decode("scroll::123"),
        Err(DecodingError::TooShort { fields: 2 })
    ));
}
