//! Scriptable animation timing emulated on declarative keyframe animations.
//!
//! Keyframes are compiled into `@keyframes` rules held in one shared
//! stylesheet. Each [`Animation`] keeps its own timeline and steers the
//! element's declarative animation onto it by writing a negative
//! `animation-delay` together with `animation-play-state`, so the host's style
//! engine does the interpolation.
//!
//! The host (clock, timers, elements, document) is abstracted in [`host`];
//! [`host::memory`] provides a deterministic in-memory implementation.

pub mod animation;
pub mod host;

pub use animation::{
    Animation, AnimationEvent, AnimationSample, Animator, FillMode, IterationCount, Keyframe,
    PlayState, PlaybackDirection, SchemaError, Timing,
};
pub use host::{Clock, Host, StyleSheetHost, StyleSheetTarget, StyleTarget, TimerHost, TimerId};
