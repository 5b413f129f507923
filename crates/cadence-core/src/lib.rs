//! # cadence-core — Activity Record Wire Codec
//!
//! The leaf crate of the Cadence workspace. It defines the activity record
//! data model and the compact, delimiter-joined text encoding that the
//! analytics crate consumes.
//!
//! ## Key Design Principles
//!
//! 1. **One tagged `Value` type.** Values and contexts are the [`Value`] sum
//!    type. Every consumer matches exhaustively; there is no runtime shape
//!    inspection.
//!
//! 2. **`EncodedRecord` newtype.** Its inner text is private and only
//!    [`Codec`] constructs it, so an `EncodedRecord` always satisfies the wire
//!    invariants.
//!
//! 3. **Escapes are atomic.** The field tokenizer scans escape pairs as single
//!    units instead of blindly splitting on the delimiter.
//!
//! 4. **Degrade, don't fail.** Only insufficient field count is a hard decode
//!    error. Malformed optional fields fall back to permissive defaults and
//!    are reported through an injected [`DiagnosticSink`].
//!
//! 5. **Injected clock.** The wall clock is the only external effect and is
//!    reached through the [`Clock`] trait.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cadence-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod clock;
pub mod codec;
pub mod diagnostics;
pub mod envelope;
pub mod error;
pub mod escape;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{decode, encode, ActivityRecord, Codec, EncodedRecord, FORMAT_VERSION};
pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, NullSink, TracingSink,
};
pub use envelope::{checksum, IntegrityEnvelope, ENVELOPE_THRESHOLD};
pub use error::{CodecError, DecodingError, EncodingError};
pub use escape::DELIMITER;
pub use value::{Map, Value};
