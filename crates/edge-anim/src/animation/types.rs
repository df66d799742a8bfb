//! Core animation types shared by the timing engine.
//!
//! This module defines the fundamental types for the animation system:
//! - `AnimationId`: Unique identifier for animation instances
//! - `PlayState`: Derived play state of an animation
//! - `PropertyValue`: A keyframe property value (string or number)
//! - `AnimationSample`: Snapshot returned by `Animation::sample`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for an animation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationId(pub u64);

impl AnimationId {
    /// Generate a new unique animation ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for AnimationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Play state of an animation.
///
/// Never stored as independent truth: it is re-derived from the animation's
/// time, last wall-clock sample, rate and active duration on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    /// No time established (never played or canceled).
    #[default]
    Idle,
    /// Time is defined and advancing.
    Running,
    /// Time is defined and frozen.
    Paused,
    /// Time reached a natural boundary for the current playback direction.
    Finished,
}

impl PlayState {
    /// The CSS/WAAPI keyword for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyframe property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
}

impl PropertyValue {
    /// Render the value as CSS text.
    pub fn to_css(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Snapshot of an animation's timing after an update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationSample {
    /// Elapsed milliseconds since the animation's logical zero, `None` when idle.
    pub time: Option<f64>,
    /// Signed playback rate.
    pub rate: f64,
    /// Derived play state.
    pub state: PlayState,
}

/// Format a number the way script engines print it: integral values carry no
/// fractional part, negative zero prints as `0`, and magnitudes below `1e-6`
/// or from `1e21` up use exponent form (`1e+21`, `1.5e-7`).
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exponent = format!("{:e}", value);
        return match exponent.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exponent,
        };
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_ids_are_unique() {
        let a = AnimationId::new();
        let b = AnimationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_play_state_keywords() {
        assert_eq!(PlayState::Idle.as_str(), "idle");
        assert_eq!(PlayState::Finished.to_string(), "finished");
        assert_eq!(PlayState::default(), PlayState::Idle);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1000.0), "1000");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-250.0), "-250");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_format_number_exponent_range() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(1e-6), "0.000001");
    }

    #[test]
    fn test_property_value_from_json() {
        let n: PropertyValue = serde_json::from_str("0.25").unwrap();
        assert_eq!(n, PropertyValue::Number(0.25));
        let s: PropertyValue = serde_json::from_str("\"scale(2)\"").unwrap();
        assert_eq!(s.to_css(), "scale(2)");
    }
}
