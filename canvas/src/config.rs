//! Editor tuning knobs supplied by the host.
//!
//! Every field has a default drawn from [`crate::consts`], so a host can pass
//! `{}` or a partial JSON object and only override what it cares about.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    HISTORY_LIMIT, MIN_ELEMENT_SIZE, NUDGE_STEP, PAGE_GAP, PAGE_HEIGHT, PAGE_WIDTH, PASTE_OFFSET, SIZE_SNAP_THRESHOLD,
    SNAP_THRESHOLD,
};

/// Error returned by [`EditorConfig::from_json`] and [`EditorConfig::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The input was not valid JSON for this struct.
    #[error("invalid editor config: {0}")]
    Json(#[from] serde_json::Error),
    /// A field that must be positive was zero, negative or not finite.
    #[error("config field `{field}` must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    /// A field that may be zero was negative or not finite.
    #[error("config field `{field}` must be a non-negative finite number, got {value}")]
    Negative { field: &'static str, value: f64 },
    /// The history limit was zero.
    #[error("config field `history_limit` must be at least 1")]
    EmptyHistory,
}

/// Geometry and history settings for an [`crate::engine::EngineCore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Page width in layout units.
    pub page_width: f64,
    /// Page height in layout units.
    pub page_height: f64,
    /// Gap between side-by-side pages.
    pub page_gap: f64,
    /// Position snap distance in document units.
    pub snap_threshold: f64,
    /// Size-to-neighbor snap distance in document units.
    pub size_snap_threshold: f64,
    /// Resizes at or below this width/height are rejected.
    pub min_element_size: f64,
    /// Offset for duplicates and same-page pastes.
    pub paste_offset: f64,
    /// Arrow-key nudge distance.
    pub nudge_step: f64,
    /// Maximum undo depth.
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            page_width: PAGE_WIDTH,
            page_height: PAGE_HEIGHT,
            page_gap: PAGE_GAP,
            snap_threshold: SNAP_THRESHOLD,
            size_snap_threshold: SIZE_SNAP_THRESHOLD,
            min_element_size: MIN_ELEMENT_SIZE,
            paste_offset: PASTE_OFFSET,
            nudge_step: NUDGE_STEP,
            history_limit: HISTORY_LIMIT,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON, filling missing fields with defaults, then validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input, or a validation error
    /// from [`EditorConfig::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every size and threshold is usable.
    ///
    /// Thresholds may be zero (which disables snapping); page size, minimum
    /// element size and nudge step must be strictly positive.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("min_element_size", self.min_element_size),
            ("nudge_step", self.nudge_step),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        let non_negative = [
            ("page_gap", self.page_gap),
            ("snap_threshold", self.snap_threshold),
            ("size_snap_threshold", self.size_snap_threshold),
            ("paste_offset", self.paste_offset),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if self.history_limit == 0 {
            return Err(ConfigError::EmptyHistory);
        }
        Ok(())
    }
}
