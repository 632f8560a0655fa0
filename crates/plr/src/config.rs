//! Engine configuration.
//!
//! One immutable [`PlrConfig`] value is built at startup (defaults, a YAML or
//! JSON file, builder overrides) and passed to the [`Analyzer`](crate::Analyzer).
//!
//! ```yaml
//! weights: { id: 1.0, class: 0.8, name: 0.8, text: 0.5, tag: 0.2 }
//! adaptive: { penalty_factor: 0.5, instability_threshold: 0.3, min_observations: 3 }
//! remediated_confidence: 0.98
//! dynamic_attribute_patterns: ["^data-v-.*$"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::adaptive::AdaptiveConfig;
use crate::cleaner::DEFAULT_DYNAMIC_PATTERNS;
use crate::fingerprint::{SimHash, DEFAULT_WIDTH};
use crate::locator::AttributeWeights;
use crate::result::{PlrError, PlrResult};

/// Confidence attached to regenerated locators
pub const DEFAULT_REMEDIATED_CONFIDENCE: f64 = 0.98;

/// Confidence attached to locators whose element did not change
pub const DEFAULT_STABLE_CONFIDENCE: f64 = 1.0;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlrConfig {
    /// Synthesizer weights used when no history is available
    pub weights: AttributeWeights,
    /// Adaptive weighting tuning
    pub adaptive: AdaptiveConfig,
    /// Whether observed history may override `weights`
    pub adaptive_weights: bool,
    /// Confidence for remediated locators
    pub remediated_confidence: f64,
    /// Confidence for stable locators
    pub stable_confidence: f64,
    /// Attribute-name regexes stripped before diffing (empty disables cleaning)
    pub dynamic_attribute_patterns: Vec<String>,
    /// Fingerprint width in bits
    pub fingerprint_width: u32,
}

impl Default for PlrConfig {
    fn default() -> Self {
        Self {
            weights: AttributeWeights::default(),
            adaptive: AdaptiveConfig::default(),
            adaptive_weights: true,
            remediated_confidence: DEFAULT_REMEDIATED_CONFIDENCE,
            stable_confidence: DEFAULT_STABLE_CONFIDENCE,
            dynamic_attribute_patterns: DEFAULT_DYNAMIC_PATTERNS
                .iter()
                .map(ToString::to_string)
                .collect(),
            fingerprint_width: DEFAULT_WIDTH,
        }
    }
}

impl PlrConfig {
    /// Default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML
    pub fn from_yaml_str(yaml: &str) -> PlrResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON
    pub fn from_json_str(json: &str) -> PlrResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: impl AsRef<Path>) -> PlrResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            other => Err(PlrError::invalid_config(format!(
                "unsupported config extension {other:?} for {}",
                path.display()
            ))),
        }
    }

    /// Set the synthesizer weights
    #[must_use]
    pub const fn with_weights(mut self, weights: AttributeWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the adaptive tuning
    #[must_use]
    pub const fn with_adaptive(mut self, adaptive: AdaptiveConfig) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Enable or disable adaptive weights
    #[must_use]
    pub const fn with_adaptive_weights(mut self, enabled: bool) -> Self {
        self.adaptive_weights = enabled;
        self
    }

    /// Set the remediated confidence
    #[must_use]
    pub const fn with_remediated_confidence(mut self, confidence: f64) -> Self {
        self.remediated_confidence = confidence;
        self
    }

    /// Replace the dynamic attribute patterns
    #[must_use]
    pub fn with_dynamic_attribute_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dynamic_attribute_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the fingerprint width
    #[must_use]
    pub const fn with_fingerprint_width(mut self, width: u32) -> Self {
        self.fingerprint_width = width;
        self
    }

    /// Fingerprinter with the configured width
    pub fn simhash(&self) -> PlrResult<SimHash> {
        SimHash::new(self.fingerprint_width)
    }

    /// Check value ranges
    pub fn validate(&self) -> PlrResult<()> {
        if !self.weights.is_valid() {
            return Err(PlrError::invalid_config(
                "attribute weights must be in [0, 1]",
            ));
        }
        self.adaptive.validate()?;
        for (name, value) in [
            ("remediated_confidence", self.remediated_confidence),
            ("stable_confidence", self.stable_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PlrError::invalid_config(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if !(1..=64).contains(&self.fingerprint_width) {
            return Err(PlrError::invalid_config(format!(
                "fingerprint_width must be between 1 and 64, got {}",
                self.fingerprint_width
            )));
        }
        Ok(())
    }
}
