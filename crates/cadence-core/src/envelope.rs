//! # Integrity Envelope — Oversized Context Wrapping
//!
//! When a record's serialized context exceeds [`ENVELOPE_THRESHOLD`]
//! characters, the codec substitutes an envelope in place of the plain
//! context JSON:
//!
//! ```text
//! {"data":{...context...},"integrity":"<8 hex digits>","generatedAt":<epoch ms>}
//! ```
//!
//! ## Not A Security Control
//!
//! [`checksum`] is a 32-bit polynomial rolling hash. It detects accidental
//! truncation or editing of a large context and nothing more: anyone can
//! recompute it after tampering. Treat a mismatch as a hint that the record
//! was altered in transit, never as proof that a matching record is
//! authentic.

use serde::{Deserialize, Serialize};

/// Serialized context length (in characters) above which the envelope is used.
pub const ENVELOPE_THRESHOLD: usize = 1000;

/// Compute the rolling checksum of a text: `h = h * 31 + unit` with 32-bit
/// wrapping arithmetic over its UTF-16 code units, rendered as 8 hex digits.
/// Characters outside the Basic Multilingual Plane contribute both halves of
/// their surrogate pair.
pub fn checksum(text: &str) -> String {
    let hash = text.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    format!("{:08x}", hash as u32)
}

/// A context wrapped with a checksum and generation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntegrityEnvelope {
    /// The wrapped context object.
    pub data: serde_json::Map<String, serde_json::Value>,
    /// [`checksum`] of the serialized `data`.
    pub integrity: String,
    /// Epoch milliseconds at which the envelope was produced.
    #[serde(rename = "generatedAt")]
    pub generated_at: i64,
}

impl IntegrityEnvelope {
    /// Wrap a context object, computing its checksum.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `data` cannot be rendered as JSON.
    pub fn wrap(
        data: serde_json::Map<String, serde_json::Value>,
        generated_at: i64,
    ) -> Result<Self, serde_json::Error> {
        let serialized = serde_json::to_string(&data)?;
        Ok(Self {
            integrity: checksum(&serialized),
            data,
            generated_at,
        })
    }

    /// Recompute the checksum over `data` and compare with the stored one.
    pub fn verify(&self) -> bool {
        serde_json::to_string(&self.data)
            .map(|s| checksum(&s) == self.integrity)
            .unwrap_or(false)
    }

    /// Recognize an envelope: an object with exactly the keys `data`
    /// (an object), `integrity` (a string) and `generatedAt` (an integer).
    pub fn detect(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let shaped = obj.len() == 3
            && obj.get("data").is_some_and(serde_json::Value::is_object)
            && obj.get("integrity").is_some_and(serde_json::Value::is_string)
            && obj.get("generatedAt").is_some_and(serde_json::Value::is_i64);
        if !shaped {
            return None;
        }
        Self::deserialize(value).ok()
    }

    /// Whether the serialized `data` is longer than [`ENVELOPE_THRESHOLD`]
    /// characters. Smaller objects are never wrapped by the codec, so an
    /// envelope-shaped object below the threshold is ordinary context.
    pub fn exceeds_threshold(&self) -> bool {
        serde_json::to_string(&self.data)
            .map(|s| s.chars().count() > ENVELOPE_THRESHOLD)
            .unwrap_or(false)
    }

    /// Consume the envelope, returning the wrapped context.
    pub fn into_data(self) -> serde_json::Map<String, serde_json::Value> {
        self.data
    }
}
