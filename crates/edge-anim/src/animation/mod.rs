//! Script-driven animations on top of declarative `@keyframes`.
//!
//! This module provides:
//! - **Compilation**: Keyframes become an `@keyframes` body with a content hash name
//! - **Registry**: One shared stylesheet holding every distinct body
//! - **Playback control**: play / pause / cancel / finish / reverse / seek / rate
//! - **Events**: Finish and cancel callbacks plus an animator-wide queue
//!
//! # Architecture
//!
//! ```text
//! Animator
//!   ├── StylesheetRegistry (compiled keyframes → one <style> sheet)
//!   └── Animation handles
//!         ├── resolve()      time / play state from the clock
//!         ├── local_time()   delay, iterations and direction applied
//!         ├── synchronize()  animation-delay / play-state / name on the element
//!         └── ScheduledTask  finish timer
//! ```

pub mod animator;
pub mod events;
pub mod keyframes;
pub mod local_time;
pub mod player;
pub mod registry;
pub mod scheduler;
pub mod schema;
pub mod serialize;
pub mod sync;
pub mod types;

pub use animator::Animator;
pub use events::{AnimationEvent, Callback, EventKind, EventQueue};
pub use keyframes::{
    FillMode, IterationCount, Keyframe, PlaybackDirection, Timing, compile_keyframes,
};
pub use local_time::local_time;
pub use player::{Animation, FINISH_EPSILON_MS};
pub use registry::{DEFAULT_NAMESPACE, StylesheetRegistry, string_hash};
pub use schema::{AnimationSpec, SchemaError, parse_animation, parse_keyframes, parse_timing};
pub use serialize::{declarations, hyphenate};
pub use sync::{AnimationProperty, StylePatch, StyleWrite};
pub use types::{AnimationId, AnimationSample, PlayState, PropertyValue};
