//! # Analytics Configuration
//!
//! One document configures every analytics component. Missing fields take
//! their defaults; unknown fields are rejected so typos surface at load time.
//!
//! ```yaml
//! max_events: 5000
//! lookback: 20
//! sensitive_keys: [password, token]
//! redaction_marker: "***"
//! injection_source: ingest
//! ```

use cadence_core::Codec;
use serde::{Deserialize, Serialize};

use crate::batch::{BatchAnalyzer, BatchOptions, DEFAULT_MAX_EVENTS};
use crate::error::AnalyticsError;
use crate::inject::{ContextInjector, InjectOptions, DEFAULT_SOURCE};
use crate::predictor::{TransitionPredictor, DEFAULT_LOOKBACK, MAX_LOOKBACK, MIN_LOOKBACK};
use crate::sanitize::{Sanitizer, DEFAULT_SENSITIVE_KEYS, REDACTION_MARKER};

/// Settings for the analytics components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Largest batch accepted by the batch façade.
    pub max_events: usize,
    /// Predictor window; must lie in `3..=50`.
    pub lookback: usize,
    /// Context keys redacted by the sanitizer.
    pub sensitive_keys: Vec<String>,
    /// Replacement for redacted values.
    pub redaction_marker: String,
    /// Source label written by the context injector.
    pub injection_source: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            lookback: DEFAULT_LOOKBACK,
            sensitive_keys: DEFAULT_SENSITIVE_KEYS.iter().map(|k| k.to_string()).collect(),
            redaction_marker: REDACTION_MARKER.to_string(),
            injection_source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl AnalyticsConfig {
    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// [`AnalyticsError::Config`] if the YAML is malformed, has unknown
    /// fields, or fails [`validate`](Self::validate).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AnalyticsError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| AnalyticsError::Config(format!("failed to parse YAML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// As [`from_yaml_str`](Self::from_yaml_str).
    pub fn from_json_str(json: &str) -> Result<Self, AnalyticsError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AnalyticsError::Config(format!("failed to parse JSON config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges. Nothing is clamped here.
    ///
    /// # Errors
    ///
    /// [`AnalyticsError::Config`] if `max_events` is zero or `lookback` is
    /// outside `3..=50`.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.max_events == 0 {
            return Err(AnalyticsError::Config(
                "max_events must be greater than zero".to_string(),
            ));
        }
        if !(MIN_LOOKBACK..=MAX_LOOKBACK).contains(&self.lookback) {
            return Err(AnalyticsError::Config(format!(
                "lookback {} outside {MIN_LOOKBACK}..={MAX_LOOKBACK}",
                self.lookback
            )));
        }
        Ok(())
    }

    /// Batch limits from this config.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            max_events: self.max_events,
            lookback: self.lookback,
        }
    }

    /// A batch analyzer sharing `codec`.
    pub fn batch_analyzer(&self, codec: Codec) -> BatchAnalyzer {
        BatchAnalyzer::new(codec, self.batch_options())
    }

    /// A predictor with the configured window.
    pub fn predictor(&self, codec: Codec) -> TransitionPredictor {
        TransitionPredictor::new(codec, self.lookback)
    }

    /// A sanitizer with the configured keys and marker.
    pub fn sanitizer(&self, codec: Codec) -> Sanitizer {
        Sanitizer::new(codec, self.sensitive_keys.as_slice())
            .with_marker(self.redaction_marker.clone())
    }

    /// A context injector with the configured source label.
    pub fn injector(&self, codec: Codec) -> ContextInjector {
        ContextInjector::new(
            codec,
            InjectOptions {
                source: self.injection_source.clone(),
            },
        )
    }
}
