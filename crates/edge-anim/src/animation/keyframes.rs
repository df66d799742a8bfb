//! Keyframes, timing configuration and the keyframe compiler.
//!
//! This module provides:
//! - `Keyframe`: One offset-tagged set of property values
//! - `Timing`: Duration, delay, iterations, direction, fill and easing
//! - `compile_keyframes`: Merges keyframes per offset into an `@keyframes` body
//!
//! # CSS Parity
//!
//! Timing maps one-to-one onto the declarative `animation-*` properties:
//! - `animation-duration`, `animation-delay`
//! - `animation-iteration-count` (including `infinite`)
//! - `animation-direction` (`normal`, `reverse`, `alternate`, `alternate-reverse`)
//! - `animation-fill-mode` (`none`, `forwards`, `backwards`, `both`)
//! - `animation-timing-function`
//!
//! # Example
//!
//! ```
//! use edge_anim::animation::keyframes::{compile_keyframes, Keyframe};
//!
//! let frames = [
//!     Keyframe::new(0.0).set("opacity", 0.0),
//!     Keyframe::new(1.0).set("opacity", 1.0),
//! ];
//! assert_eq!(compile_keyframes(&frames), "0%{opacity:0}\n100%{opacity:1}");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::serialize::declarations;
use super::types::{PropertyValue, format_number};

/// Property name the per-keyframe `easing` is renamed to.
pub const TIMING_FUNCTION_PROPERTY: &str = "animation-timing-function";

/// How many times an animation repeats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IterationsRepr", into = "IterationsRepr")]
pub enum IterationCount {
    /// Run the animation a specific number of times (can be fractional).
    Count(f64),
    /// Run the animation indefinitely.
    Infinite,
}

impl Default for IterationCount {
    fn default() -> Self {
        Self::Count(1.0)
    }
}

impl IterationCount {
    /// Numeric value, `f64::INFINITY` for `Infinite`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Count(count) => *count,
            Self::Infinite => f64::INFINITY,
        }
    }

    /// Value of the `animation-iteration-count` property.
    pub fn to_css(&self) -> String {
        match self {
            Self::Infinite => "infinite".to_string(),
            Self::Count(count) if count.is_infinite() => "infinite".to_string(),
            Self::Count(count) => format_number(*count),
        }
    }
}

/// Wire form of `IterationCount`: a number or the keyword `"infinite"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum IterationsRepr {
    Number(f64),
    Keyword(String),
}

impl TryFrom<IterationsRepr> for IterationCount {
    type Error = String;

    fn try_from(repr: IterationsRepr) -> Result<Self, Self::Error> {
        match repr {
            IterationsRepr::Number(n) => Ok(Self::Count(n)),
            IterationsRepr::Keyword(k) if k.eq_ignore_ascii_case("infinite") => Ok(Self::Infinite),
            IterationsRepr::Keyword(k) => Err(format!("invalid iteration count `{k}`")),
        }
    }
}

impl From<IterationCount> for IterationsRepr {
    fn from(count: IterationCount) -> Self {
        match count {
            IterationCount::Count(n) => Self::Number(n),
            IterationCount::Infinite => Self::Keyword("infinite".to_string()),
        }
    }
}

/// Direction of animation playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackDirection {
    /// Play animation forward each iteration.
    #[default]
    Normal,
    /// Play animation backward each iteration.
    Reverse,
    /// Alternate between forward and backward.
    Alternate,
    /// Alternate, starting with backward.
    AlternateReverse,
}

impl PlaybackDirection {
    /// Whether the keyword contains `reverse`.
    pub fn is_reverse(&self) -> bool {
        matches!(self, Self::Reverse | Self::AlternateReverse)
    }

    /// Whether the keyword contains `alternate`.
    pub fn is_alternate(&self) -> bool {
        matches!(self, Self::Alternate | Self::AlternateReverse)
    }

    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Reverse => "reverse",
            Self::Alternate => "alternate",
            Self::AlternateReverse => "alternate-reverse",
        }
    }
}

/// What values to apply before/after the active interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// Don't apply any values outside the animation.
    #[default]
    None,
    /// Retain the final keyframe values after animation ends.
    Forwards,
    /// Apply the first keyframe values during the delay period.
    Backwards,
    /// Apply both forwards and backwards behavior.
    Both,
}

impl FillMode {
    /// Should apply values before animation starts (during delay)?
    pub fn applies_backwards(&self) -> bool {
        matches!(self, Self::Backwards | Self::Both)
    }

    /// Should retain values after animation ends?
    pub fn applies_forwards(&self) -> bool {
        matches!(self, Self::Forwards | Self::Both)
    }

    pub fn as_css(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Forwards => "forwards",
            Self::Backwards => "backwards",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_css())
    }
}

impl fmt::Display for PlaybackDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_css())
    }
}

fn default_easing() -> String {
    "linear".to_string()
}

/// Timing configuration, immutable once an animation is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// Duration of one iteration in milliseconds.
    pub duration: f64,
    /// Delay before the first iteration in milliseconds.
    #[serde(default)]
    pub delay: f64,
    /// Delay after the last iteration in milliseconds.
    #[serde(default)]
    pub end_delay: f64,
    #[serde(default)]
    pub iterations: IterationCount,
    #[serde(default)]
    pub direction: PlaybackDirection,
    #[serde(default)]
    pub fill: FillMode,
    /// CSS timing function applied between keyframes.
    #[serde(default = "default_easing")]
    pub easing: String,
}

impl Timing {
    /// Create a timing config with the given duration and defaults elsewhere.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            delay: 0.0,
            end_delay: 0.0,
            iterations: IterationCount::default(),
            direction: PlaybackDirection::Normal,
            fill: FillMode::None,
            easing: default_easing(),
        }
    }

    /// Set the start delay.
    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Set the end delay.
    pub fn end_delay(mut self, end_delay: f64) -> Self {
        self.end_delay = end_delay;
        self
    }

    /// Set the iteration count.
    pub fn iterations(mut self, iterations: IterationCount) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the playback direction.
    pub fn direction(mut self, direction: PlaybackDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set the fill mode.
    pub fn fill(mut self, fill: FillMode) -> Self {
        self.fill = fill;
        self
    }

    /// Set the timing function.
    pub fn easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = easing.into();
        self
    }

    /// `delay + duration * iterations + end_delay`.
    pub fn total_active_duration(&self) -> f64 {
        self.delay + self.duration * self.iterations.as_f64() + self.end_delay
    }
}

/// A single keyframe: an offset plus property values.
///
/// Deserializes from the flat object shape `{"opacity": 0, "offset": 0}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Position in the iteration (0.0 to 1.0).
    pub offset: f64,
    /// Timing function applied from this keyframe to the next.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
    /// Property values by camelCase or hyphenated name; `None` is omitted on output.
    #[serde(flatten)]
    pub properties: BTreeMap<String, Option<PropertyValue>>,
}

impl Keyframe {
    /// Create an empty keyframe at the given offset.
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            easing: None,
            properties: BTreeMap::new(),
        }
    }

    /// Set a property value for this keyframe.
    ///
    /// `easing` and `offset` set the keyframe's own fields rather than a
    /// property; an `offset` that is not a number is ignored.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match name.as_str() {
            "easing" => self.easing = Some(value.to_css()),
            "offset" => {
                if let PropertyValue::Number(offset) = value {
                    self.offset = offset;
                }
            }
            _ => {
                self.properties.insert(name, Some(value));
            }
        }
        self
    }

    /// Set the easing for this keyframe.
    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = Some(easing.into());
        self
    }

    /// Get a property value from this keyframe.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name).and_then(Option::as_ref)
    }
}

/// Compile keyframes into the body of an `@keyframes` rule.
///
/// Keyframes sharing an offset are merged (later values win), `easing`
/// becomes `animation-timing-function`, and blocks are emitted in ascending
/// offset order as `<offset*100>%{<declarations>}` separated by newlines. An
/// empty list compiles to an empty string.
pub fn compile_keyframes(keyframes: &[Keyframe]) -> String {
    let mut frames: Vec<(f64, BTreeMap<String, Option<PropertyValue>>)> = Vec::new();

    for keyframe in keyframes {
        // -0.0 and 0.0 share a block.
        let offset = keyframe.offset + 0.0;
        let index = match frames.iter().position(|(o, _)| *o == offset) {
            Some(index) => index,
            None => {
                frames.push((offset, BTreeMap::new()));
                frames.len() - 1
            }
        };
        let target = &mut frames[index].1;
        for (name, value) in &keyframe.properties {
            match name.as_str() {
                "offset" => {}
                "easing" => {
                    target.insert(TIMING_FUNCTION_PROPERTY.to_string(), value.clone());
                }
                _ => {
                    target.insert(name.clone(), value.clone());
                }
            }
        }
        if let Some(easing) = &keyframe.easing {
            target.insert(
                TIMING_FUNCTION_PROPERTY.to_string(),
                Some(PropertyValue::Text(easing.clone())),
            );
        }
    }

    frames.sort_by(|a, b| a.0.total_cmp(&b.0));
    frames
        .iter()
        .map(|(offset, props)| {
            format!("{}%{{{}}}", format_number(offset * 100.0), declarations(props))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Distinct offsets in ascending order.
pub fn distinct_offsets(keyframes: &[Keyframe]) -> Vec<f64> {
    let mut offsets: Vec<f64> = keyframes.iter().map(|k| k.offset + 0.0).collect();
    offsets.sort_by(f64::total_cmp);
    offsets.dedup();
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_mode() {
        assert!(!FillMode::None.applies_backwards());
        assert!(!FillMode::None.applies_forwards());

        assert!(!FillMode::Forwards.applies_backwards());
        assert!(FillMode::Forwards.applies_forwards());

        assert!(FillMode::Backwards.applies_backwards());
        assert!(!FillMode::Backwards.applies_forwards());

        assert!(FillMode::Both.applies_backwards());
        assert!(FillMode::Both.applies_forwards());
    }

    #[test]
    fn test_direction_keywords() {
        assert!(!PlaybackDirection::Normal.is_reverse());
        assert!(PlaybackDirection::Reverse.is_reverse());
        assert!(!PlaybackDirection::Reverse.is_alternate());
        assert!(PlaybackDirection::Alternate.is_alternate());
        assert!(PlaybackDirection::AlternateReverse.is_reverse());
        assert!(PlaybackDirection::AlternateReverse.is_alternate());
        assert_eq!(PlaybackDirection::AlternateReverse.as_css(), "alternate-reverse");
    }

    #[test]
    fn test_iteration_count_css() {
        assert_eq!(IterationCount::Infinite.to_css(), "infinite");
        assert_eq!(IterationCount::Count(2.0).to_css(), "2");
        assert_eq!(IterationCount::Count(1.5).to_css(), "1.5");
    }

    #[test]
    fn test_total_active_duration() {
        let timing = Timing::new(500.0)
            .delay(100.0)
            .end_delay(50.0)
            .iterations(IterationCount::Count(3.0));
        assert_eq!(timing.total_active_duration(), 1650.0);
        assert_eq!(
            Timing::new(500.0)
                .iterations(IterationCount::Infinite)
                .total_active_duration(),
            f64::INFINITY
        );
    }

    #[test]
    fn test_timing_defaults_from_json() {
        let timing: Timing = serde_json::from_str(r#"{"duration": 1000}"#).unwrap();
        assert_eq!(timing, Timing::new(1000.0));
        assert_eq!(timing.easing, "linear");
    }

    #[test]
    fn test_timing_full_json() {
        let timing: Timing = serde_json::from_str(
            r#"{"duration": 500, "delay": 10, "endDelay": 20, "iterations": "infinite",
                "direction": "alternate-reverse", "fill": "both", "easing": "ease-in"}"#,
        )
        .unwrap();
        assert_eq!(timing.end_delay, 20.0);
        assert_eq!(timing.iterations, IterationCount::Infinite);
        assert_eq!(timing.direction, PlaybackDirection::AlternateReverse);
        assert_eq!(timing.fill, FillMode::Both);
        assert_eq!(timing.easing, "ease-in");
    }

    #[test]
    fn test_compile_two_frames() {
        let frames = [
            Keyframe::new(0.0).set("opacity", 0.0),
            Keyframe::new(1.0).set("opacity", 1.0),
        ];
        assert_eq!(compile_keyframes(&frames), "0%{opacity:0}\n100%{opacity:1}");
    }

    #[test]
    fn test_compile_merges_offsets_and_renames_easing() {
        let frames = [
            Keyframe::new(0.0)
                .set("transform", "scale(1)")
                .set("backgroundColor", "red")
                .with_easing("ease-in"),
            Keyframe::new(0.5).set("opacity", 0.5),
            Keyframe::new(0.0).set("opacity", 0.25),
            Keyframe::new(1.0)
                .set("transform", "scale(2)")
                .set("msTransform", "x"),
        ];
        assert_eq!(
            compile_keyframes(&frames),
            concat!(
                "0%{animation-timing-function:ease-in;background-color:red;",
                "opacity:0.25;transform:scale(1)}\n",
                "50%{opacity:0.5}\n",
                "100%{-ms-transform:x;transform:scale(2)}",
            )
        );
    }

    #[test]
    fn test_set_routes_easing_and_offset() {
        let frame = Keyframe::new(0.0)
            .set("offset", 0.5)
            .set("easing", "linear")
            .set("offset", "half")
            .set("opacity", 1.0);
        assert_eq!(frame.offset, 0.5);
        assert_eq!(frame.easing.as_deref(), Some("linear"));
        assert_eq!(frame.properties.len(), 1);
        assert_eq!(
            compile_keyframes(&[frame]),
            "50%{animation-timing-function:linear;opacity:1}"
        );
    }

    #[test]
    fn test_compile_skips_reserved_property_keys() {
        let mut frame = Keyframe::new(1.0).set("opacity", 1.0);
        frame.properties.insert("offset".to_string(), Some(PropertyValue::Number(0.2)));
        frame.properties.insert("easing".to_string(), Some(PropertyValue::from("ease-out")));
        assert_eq!(
            compile_keyframes(&[frame]),
            "100%{animation-timing-function:ease-out;opacity:1}"
        );
    }

    #[test]
    fn test_compile_later_values_override() {
        let frames = [
            Keyframe::new(1.0).set("opacity", 0.0),
            Keyframe::new(1.0).set("opacity", 1.0),
        ];
        assert_eq!(compile_keyframes(&frames), "100%{opacity:1}");
    }

    #[test]
    fn test_compile_empty() {
        assert_eq!(compile_keyframes(&[]), "");
    }

    #[test]
    fn test_keyframe_from_json() {
        let json = r#"{"opacity": 0, "offset": 0.5, "color": null, "easing": "ease"}"#;
        let kf: Keyframe = serde_json::from_str(json).unwrap();
        assert_eq!(kf.offset, 0.5);
        assert_eq!(kf.easing.as_deref(), Some("ease"));
        assert_eq!(kf.get("opacity"), Some(&PropertyValue::Number(0.0)));
        assert_eq!(kf.get("color"), None);
        assert_eq!(compile_keyframes(&[kf]), "50%{animation-timing-function:ease;opacity:0}");
    }

    #[test]
    fn test_distinct_offsets() {
        let frames = [
            Keyframe::new(1.0),
            Keyframe::new(0.0),
            Keyframe::new(0.5),
            Keyframe::new(0.0),
        ];
        assert_eq!(distinct_offsets(&frames), vec![0.0, 0.5, 1.0]);
    }
}
