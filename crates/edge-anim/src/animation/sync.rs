//! Element synchronization: turns a play state and local time into style writes.
//!
//! Building the patch is pure; `StylePatch::apply` is the only place that
//! touches a `StyleTarget`.

use tracing::debug;

use super::keyframes::Timing;
use super::types::{PlayState, format_number};
use crate::host::StyleTarget;

/// The `animation-*` longhands written to elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationProperty {
    Name,
    Duration,
    TimingFunction,
    Delay,
    IterationCount,
    Direction,
    FillMode,
    PlayState,
}

impl AnimationProperty {
    /// Hyphenated CSS property name.
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Name => "animation-name",
            Self::Duration => "animation-duration",
            Self::TimingFunction => "animation-timing-function",
            Self::Delay => "animation-delay",
            Self::IterationCount => "animation-iteration-count",
            Self::Direction => "animation-direction",
            Self::FillMode => "animation-fill-mode",
            Self::PlayState => "animation-play-state",
        }
    }
}

/// One step of a style update, applied in order.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleWrite {
    Set(AnimationProperty, String),
    Remove(AnimationProperty),
    /// Read element geometry so the next `animation-name` assignment starts a
    /// fresh animation instead of being coalesced with the removal.
    Reflow,
}

/// An ordered list of style writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    writes: Vec<StyleWrite>,
}

impl StylePatch {
    /// Static timing properties, written once when an animation is created.
    pub fn timing(timing: &Timing) -> Self {
        Self {
            writes: vec![
                StyleWrite::Set(AnimationProperty::TimingFunction, timing.easing.clone()),
                StyleWrite::Set(
                    AnimationProperty::Duration,
                    format!("{}ms", format_number(timing.duration)),
                ),
                StyleWrite::Set(AnimationProperty::IterationCount, timing.iterations.to_css()),
                StyleWrite::Set(
                    AnimationProperty::Direction,
                    timing.direction.as_css().to_string(),
                ),
                StyleWrite::Set(AnimationProperty::FillMode, timing.fill.as_css().to_string()),
            ],
        }
    }

    /// Writes that make the declarative animation `name` display `local_time`
    /// in the given play state. Idle detaches the animation.
    pub fn for_state(state: PlayState, local_time: f64, name: &str) -> Self {
        let writes = match state {
            PlayState::Idle => vec![
                StyleWrite::Remove(AnimationProperty::Name),
                StyleWrite::Remove(AnimationProperty::PlayState),
                StyleWrite::Remove(AnimationProperty::Delay),
            ],
            _ => {
                let play_state = match state {
                    PlayState::Paused | PlayState::Finished => "paused",
                    _ => "running",
                };
                vec![
                    StyleWrite::Remove(AnimationProperty::Name),
                    StyleWrite::Reflow,
                    StyleWrite::Set(
                        AnimationProperty::Delay,
                        format!("{}ms", format_number(-local_time)),
                    ),
                    StyleWrite::Set(AnimationProperty::PlayState, play_state.to_string()),
                    StyleWrite::Set(AnimationProperty::Name, name.to_string()),
                ]
            }
        };
        Self { writes }
    }

    pub fn writes(&self) -> &[StyleWrite] {
        &self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Value this patch leaves for `property`, if it sets one.
    pub fn value_of(&self, property: AnimationProperty) -> Option<&str> {
        self.writes.iter().rev().find_map(|w| match w {
            StyleWrite::Set(p, v) if *p == property => Some(v.as_str()),
            StyleWrite::Remove(p) if *p == property => Some(""),
            _ => None,
        })
    }

    /// Write the patch to an element.
    pub fn apply(&self, target: &dyn StyleTarget) {
        for write in &self.writes {
            match write {
                StyleWrite::Set(property, value) => target.set_property(property.css_name(), value),
                StyleWrite::Remove(property) => target.remove_property(property.css_name()),
                StyleWrite::Reflow => {
                    let _ = target.force_layout();
                }
            }
        }
    }
}

/// Build and apply the patch for `state`, logging what the element now shows.
pub fn synchronize(target: &dyn StyleTarget, state: PlayState, local_time: f64, name: &str) {
    let patch = StylePatch::for_state(state, local_time, name);
    debug!(
        animation = %name,
        %state,
        delay = patch.value_of(AnimationProperty::Delay).unwrap_or(""),
        "synchronized element"
    );
    patch.apply(target);
}
