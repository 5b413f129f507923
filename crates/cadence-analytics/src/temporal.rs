//! # Temporal Analyzer
//!
//! Inter-arrival statistics over the timestamps of decoded records.
//! Timestamps are sorted before intervals are taken, so out-of-order input
//! never produces negative intervals. Records whose timestamp did not decode
//! are skipped.

use cadence_core::Codec;
use serde::Serialize;

use crate::stats::{mean, population_std_dev, round_to};

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Direction of the most recent interval relative to the average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// The last interval is shorter than the average.
    Accelerating,
    /// The last interval is at least the average.
    Decelerating,
}

/// Inter-arrival statistics. Ratios are rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalStats {
    /// Number of timestamps considered.
    pub event_count: usize,
    /// Mean gap between consecutive events.
    pub average_interval_ms: f64,
    /// Smallest gap.
    pub shortest_interval_ms: i64,
    /// Largest gap.
    pub longest_interval_ms: i64,
    /// `60000 / average`, 0 when the average is 0.
    pub frequency_per_minute: f64,
    /// `max(0, 1 - sigma / average)`, 0 when the average is 0.
    pub consistency: f64,
    /// Whether the last gap is below the average.
    pub trend: Trend,
    /// `last - first`.
    pub total_duration_ms: i64,
    /// Events per minute over the whole duration, 0 for zero duration.
    pub event_density: f64,
}

impl TemporalStats {
    /// Compute statistics from raw timestamps. `None` with fewer than two.
    pub fn from_timestamps(mut timestamps: Vec<i64>) -> Option<Self> {
        if timestamps.len() < 2 {
            return None;
        }
        timestamps.sort_unstable();

        let intervals: Vec<i64> = timestamps
            .windows(2)
            .map(|pair| pair[1].saturating_sub(pair[0]))
            .collect();
        let as_f64: Vec<f64> = intervals.iter().map(|&i| i as f64).collect();
        let average = mean(&as_f64)?;
        let sigma = population_std_dev(&as_f64)?;
        let last = *as_f64.last()?;

        let (frequency, consistency) = if average > 0.0 {
            (
                MILLIS_PER_MINUTE / average,
                (1.0 - sigma / average).max(0.0),
            )
        } else {
            (0.0, 0.0)
        };

        let first = timestamps[0];
        let total = timestamps[timestamps.len() - 1].saturating_sub(first);
        let density = if total > 0 {
            timestamps.len() as f64 * MILLIS_PER_MINUTE / total as f64
        } else {
            0.0
        };

        Some(Self {
            event_count: timestamps.len(),
            average_interval_ms: round_to(average, 2),
            shortest_interval_ms: intervals.iter().copied().min().unwrap_or(0),
            longest_interval_ms: intervals.iter().copied().max().unwrap_or(0),
            frequency_per_minute: round_to(frequency, 2),
            consistency: round_to(consistency, 2),
            trend: if last < average {
                Trend::Accelerating
            } else {
                Trend::Decelerating
            },
            total_duration_ms: total,
            event_density: round_to(density, 2),
        })
    }
}

/// Decodes records and computes [`TemporalStats`] over their timestamps.
#[derive(Debug, Clone, Default)]
pub struct TemporalAnalyzer {
    codec: Codec,
}

impl TemporalAnalyzer {
    /// Build an analyzer around a codec.
    pub fn new(codec: Codec) -> Self {
        Self { codec }
    }

    /// Statistics over every decodable timestamp, `None` with fewer than two.
    pub fn analyze<S: AsRef<str>>(&self, events: &[S]) -> Option<TemporalStats> {
        let timestamps: Vec<i64> = events
            .iter()
            .filter_map(|event| self.codec.decode(event.as_ref()).ok())
            .filter_map(|record| record.timestamp)
            .collect();
        tracing::debug!(
            events = events.len(),
            timestamps = timestamps.len(),
            "collected timestamps"
        );
        TemporalStats::from_timestamps(timestamps)
    }
}

/// Temporal statistics with the default codec.
pub fn temporal<S: AsRef<str>>(events: &[S]) -> Option<TemporalStats> {
    TemporalAnalyzer::default().analyze(events)
}
