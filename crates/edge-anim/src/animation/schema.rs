//! JSON schema for keyframes and timing.
//!
//! Keyframes use the flat object shape of the scripting API and timing uses
//! its camelCase dictionary:
//!
//! ```json
//! {
//!   "keyframes": [
//!     { "offset": 0, "opacity": 0, "easing": "ease-in" },
//!     { "offset": 1, "opacity": 1 }
//!   ],
//!   "timing": { "duration": 1000, "iterations": "infinite", "direction": "alternate" }
//! }
//! ```
//!
//! Deserialization alone accepts any numbers; the `parse_*` functions also
//! validate ranges.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::keyframes::{IterationCount, Keyframe, Timing};

/// Errors produced while parsing or validating animation input.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid animation JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("keyframe {index} has offset {offset}, expected a number in [0, 1]")]
    InvalidOffset { index: usize, offset: f64 },

    #[error("duration must be a finite number >= 0, got {0}")]
    InvalidDuration(f64),

    #[error("{field} must be finite, got {value}")]
    NonFiniteDelay { field: &'static str, value: f64 },

    #[error("iterations must be > 0, got {0}")]
    InvalidIterations(f64),
}

/// Keyframes plus timing, the arguments of one `animate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSpec {
    pub keyframes: Vec<Keyframe>,
    pub timing: Timing,
}

impl AnimationSpec {
    pub fn new(keyframes: Vec<Keyframe>, timing: Timing) -> Self {
        Self { keyframes, timing }
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_keyframes(&self.keyframes)?;
        validate_timing(&self.timing)
    }
}

pub fn validate_keyframes(keyframes: &[Keyframe]) -> Result<(), SchemaError> {
    for (index, keyframe) in keyframes.iter().enumerate() {
        if !keyframe.offset.is_finite() || !(0.0..=1.0).contains(&keyframe.offset) {
            return Err(SchemaError::InvalidOffset {
                index,
                offset: keyframe.offset,
            });
        }
    }
    Ok(())
}

pub fn validate_timing(timing: &Timing) -> Result<(), SchemaError> {
    if !timing.duration.is_finite() || timing.duration < 0.0 {
        return Err(SchemaError::InvalidDuration(timing.duration));
    }
    for (field, value) in [("delay", timing.delay), ("endDelay", timing.end_delay)] {
        if !value.is_finite() {
            return Err(SchemaError::NonFiniteDelay { field, value });
        }
    }
    if let IterationCount::Count(count) = timing.iterations {
        if count.is_nan() || count <= 0.0 {
            return Err(SchemaError::InvalidIterations(count));
        }
    }
    Ok(())
}

/// Parse and validate a JSON array of keyframes.
pub fn parse_keyframes(json: &str) -> Result<Vec<Keyframe>, SchemaError> {
    let keyframes: Vec<Keyframe> = serde_json::from_str(json)?;
    validate_keyframes(&keyframes)?;
    Ok(keyframes)
}

/// Parse and validate a JSON timing dictionary.
pub fn parse_timing(json: &str) -> Result<Timing, SchemaError> {
    let timing: Timing = serde_json::from_str(json)?;
    validate_timing(&timing)?;
    Ok(timing)
}

/// Parse and validate `{"keyframes": [...], "timing": {...}}`.
pub fn parse_animation(json: &str) -> Result<AnimationSpec, SchemaError> {
    let spec: AnimationSpec = serde_json::from_str(json)?;
    spec.validate()?;
    Ok(spec)
}
