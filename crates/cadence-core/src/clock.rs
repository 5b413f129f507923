//! # Clock — Injectable Wall-Clock Source
//!
//! Reading the wall clock is the only external effect in the workspace: the
//! codec stamps encoded records with it, and the batch façade computes event
//! ages from it. Components take an `Arc<dyn Clock>` so tests can pin time
//! with [`FixedClock`].

use chrono::Utc;

/// A source of epoch-millisecond timestamps.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// The host wall clock, via `chrono::Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
