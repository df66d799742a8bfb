//! The animation factory.
//!
//! An `Animator` is the entry point for creating animations. It owns the
//! keyframes registry shared by every animation it creates and collects their
//! finish and cancel events.
//!
//! # Usage
//!
//! ```
//! use std::rc::Rc;
//! use edge_anim::animation::{Animator, Keyframe, PlayState, Timing};
//! use edge_anim::host::memory::{MemoryElement, MemoryHost};
//!
//! let host = MemoryHost::new();
//! let animator = Animator::new(host.host());
//! let element = Rc::new(MemoryElement::new());
//! let fade = [
//!     Keyframe::new(0.0).set("opacity", 0.0),
//!     Keyframe::new(1.0).set("opacity", 1.0),
//! ];
//! let animation = animator.animate(element, &fade, Timing::new(300.0));
//!
//! host.advance(300.0);
//! assert_eq!(animation.play_state(), PlayState::Finished);
//! assert_eq!(animator.drain_events().len(), 1);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use edge_config::EdgeConfig;
use tracing::debug;

use super::events::{AnimationEvent, EventQueue};
use super::keyframes::{Keyframe, Timing};
use super::player::Animation;
use super::registry::StylesheetRegistry;
use super::schema::AnimationSpec;
use crate::host::{Host, StyleTarget};

/// Creates animations against one host and one keyframes registry.
#[derive(Debug, Clone)]
pub struct Animator {
    host: Host,
    registry: StylesheetRegistry,
    events: Rc<RefCell<EventQueue>>,
}

impl Animator {
    /// Animator with the default registry namespace and flush delay.
    pub fn new(host: Host) -> Self {
        let registry = StylesheetRegistry::new(host.clone());
        Self::with_registry(host, registry)
    }

    /// Animator whose registry follows `config.registry`.
    pub fn with_config(host: Host, config: &EdgeConfig) -> Self {
        let registry = StylesheetRegistry::with_options(
            host.clone(),
            config.registry.namespace.clone(),
            config.registry.flush_delay_ms,
        );
        Self::with_registry(host, registry)
    }

    /// Animator sharing an existing registry.
    pub fn with_registry(host: Host, registry: StylesheetRegistry) -> Self {
        Self {
            host,
            registry,
            events: Rc::new(RefCell::new(EventQueue::new())),
        }
    }

    /// Start animating `element`.
    ///
    /// Compiles and registers the keyframes, writes the static timing
    /// properties and plays. The returned handle controls the animation.
    pub fn animate(
        &self,
        element: Rc<dyn StyleTarget>,
        keyframes: &[Keyframe],
        timing: Timing,
    ) -> Animation {
        let animation = Animation::create(
            &self.host,
            &self.registry,
            element,
            keyframes,
            timing,
            Some(self.events.clone()),
        );
        debug!(animation = %animation.name(), id = animation.id().0, "animate");
        animation
    }

    /// `animate` with keyframes and timing from a parsed spec.
    pub fn animate_spec(&self, element: Rc<dyn StyleTarget>, spec: &AnimationSpec) -> Animation {
        self.animate(element, &spec.keyframes, spec.timing.clone())
    }

    /// Take every event emitted so far, oldest first.
    pub fn drain_events(&self) -> Vec<AnimationEvent> {
        self.events.borrow_mut().drain().collect()
    }

    /// Number of events waiting to be drained.
    pub fn pending_events(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn registry(&self) -> &StylesheetRegistry {
        &self.registry
    }

    pub fn host(&self) -> &Host {
        &self.host
    }
}
