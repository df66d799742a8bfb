//! Animation events and completion callbacks.
//!
//! Each `Animation` carries optional payload-free `on_finish` / `on_cancel`
//! callbacks. Animations created through an `Animator` additionally push an
//! `AnimationEvent` onto the animator's shared `EventQueue`, which can be
//! polled after driving the host.
//!
//! # Usage
//!
//! ```ignore
//! let animator = Animator::new(host.host());
//! let anim = animator.animate(element, &keyframes, Timing::new(300.0));
//! anim.on_finish(|| println!("done"));
//!
//! host.advance(300.0);
//! for event in animator.drain_events() {
//!     println!("{} {}", event.kind(), event.animation_name());
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use super::types::AnimationId;

/// Event emitted when an animation finishes or is canceled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationEvent {
    /// Playback reached its boundary, naturally or through `finish()`.
    Finished {
        /// The animation instance ID.
        animation_id: AnimationId,
        /// Stylesheet name of the animation.
        animation_name: String,
    },
    /// The animation was canceled.
    Cancelled {
        /// The animation instance ID.
        animation_id: AnimationId,
        /// Stylesheet name of the animation.
        animation_name: String,
    },
}

impl AnimationEvent {
    /// Get the animation ID for this event.
    pub fn animation_id(&self) -> AnimationId {
        match self {
            Self::Finished { animation_id, .. } | Self::Cancelled { animation_id, .. } => {
                *animation_id
            }
        }
    }

    /// Get the animation name for this event.
    pub fn animation_name(&self) -> &str {
        match self {
            Self::Finished { animation_name, .. } | Self::Cancelled { animation_name, .. } => {
                animation_name
            }
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Finished { .. } => EventKind::Finish,
            Self::Cancelled { .. } => EventKind::Cancel,
        }
    }

    /// Check if this is a "finished" event.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    /// Check if this is a "cancelled" event.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Which callback slot an event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Finish,
    Cancel,
}

impl EventKind {
    pub fn event(self, animation_id: AnimationId, animation_name: &str) -> AnimationEvent {
        let animation_name = animation_name.to_string();
        match self {
            Self::Finish => AnimationEvent::Finished {
                animation_id,
                animation_name,
            },
            Self::Cancel => AnimationEvent::Cancelled {
                animation_id,
                animation_name,
            },
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Finish => "finish",
            Self::Cancel => "cancel",
        })
    }
}

/// A payload-free callback.
pub type Callback = Box<dyn FnMut()>;

#[derive(Default)]
struct Slot {
    callback: Option<Callback>,
    /// Bumped on every `set`, so a callback that ran can tell whether its slot
    /// was touched meanwhile.
    generation: u64,
}

/// The `on_finish` / `on_cancel` slots of one animation.
#[derive(Default)]
pub struct EventHandlers {
    on_finish: Slot,
    on_cancel: Slot,
}

impl EventHandlers {
    fn slot(&mut self, kind: EventKind) -> &mut Slot {
        match kind {
            EventKind::Finish => &mut self.on_finish,
            EventKind::Cancel => &mut self.on_cancel,
        }
    }

    /// Replace or clear a callback.
    pub fn set(&mut self, kind: EventKind, callback: Option<Callback>) {
        let slot = self.slot(kind);
        slot.callback = callback;
        slot.generation += 1;
    }

    /// Take the callback out so it can run without any borrow held. The
    /// returned generation is handed back to [`EventHandlers::restore`].
    pub fn take(&mut self, kind: EventKind) -> Option<(Callback, u64)> {
        let slot = self.slot(kind);
        let generation = slot.generation;
        slot.callback.take().map(|callback| (callback, generation))
    }

    /// Put a callback back after it ran, unless the slot was set (replaced or
    /// cleared) meanwhile.
    pub fn restore(&mut self, kind: EventKind, callback: Callback, generation: u64) {
        let slot = self.slot(kind);
        if slot.generation == generation && slot.callback.is_none() {
            slot.callback = Some(callback);
        }
    }

    pub fn has(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Finish => self.on_finish.callback.is_some(),
            EventKind::Cancel => self.on_cancel.callback.is_some(),
        }
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("on_finish", &self.has(EventKind::Finish))
            .field("on_cancel", &self.has(EventKind::Cancel))
            .finish()
    }
}

/// Queue for collecting animation events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<AnimationEvent>,
}

impl EventQueue {
    /// Create a new empty event queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event onto the queue.
    pub fn push(&mut self, event: AnimationEvent) {
        self.events.push_back(event);
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get the number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Pop the next event from the queue.
    pub fn pop(&mut self) -> Option<AnimationEvent> {
        self.events.pop_front()
    }

    /// Drain all events from the queue, returning an iterator.
    pub fn drain(&mut self) -> impl Iterator<Item = AnimationEvent> + '_ {
        self.events.drain(..)
    }

    /// Clear all pending events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Get events for a specific animation.
    pub fn events_for(&self, animation_id: AnimationId) -> Vec<&AnimationEvent> {
        self.events
            .iter()
            .filter(|e| e.animation_id() == animation_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_event_accessors() {
        let event = EventKind::Finish.event(AnimationId(7), "ea_abc");
        assert_eq!(event.animation_id(), AnimationId(7));
        assert_eq!(event.animation_name(), "ea_abc");
        assert!(event.is_finished());
        assert!(!event.is_cancelled());
        assert_eq!(event.kind(), EventKind::Finish);
    }

    #[test]
    fn test_event_queue_operations() {
        let mut queue = EventQueue::new();
        assert!(queue.is_empty());

        queue.push(EventKind::Finish.event(AnimationId(1), "a"));
        queue.push(EventKind::Cancel.event(AnimationId(2), "b"));
        queue.push(EventKind::Finish.event(AnimationId(1), "a"));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.events_for(AnimationId(1)).len(), 2);

        assert!(queue.pop().unwrap().is_finished());
        let rest: Vec<_> = queue.drain().collect();
        assert_eq!(rest.len(), 2);
        assert!(rest[0].is_cancelled());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_handlers_take_and_restore() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut handlers = EventHandlers::default();
        handlers.set(
            EventKind::Finish,
            Some(Box::new(move || counter.set(counter.get() + 1))),
        );
        assert!(handlers.has(EventKind::Finish));
        assert!(!handlers.has(EventKind::Cancel));

        let (mut callback, generation) = handlers.take(EventKind::Finish).unwrap();
        assert!(!handlers.has(EventKind::Finish));
        callback();
        handlers.restore(EventKind::Finish, callback, generation);
        assert!(handlers.has(EventKind::Finish));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_restore_keeps_replacement() {
        let mut handlers = EventHandlers::default();
        handlers.set(EventKind::Cancel, Some(Box::new(|| {})));
        let (old, generation) = handlers.take(EventKind::Cancel).unwrap();

        let replaced = Rc::new(Cell::new(false));
        let flag = replaced.clone();
        handlers.set(EventKind::Cancel, Some(Box::new(move || flag.set(true))));
        handlers.restore(EventKind::Cancel, old, generation);

        let (mut current, _) = handlers.take(EventKind::Cancel).unwrap();
        current();
        assert!(replaced.get());
    }

    #[test]
    fn test_restore_respects_clear() {
        let mut handlers = EventHandlers::default();
        handlers.set(EventKind::Finish, Some(Box::new(|| {})));
        let (callback, generation) = handlers.take(EventKind::Finish).unwrap();

        // Cleared while the callback was out.
        handlers.set(EventKind::Finish, None);
        handlers.restore(EventKind::Finish, callback, generation);
        assert!(!handlers.has(EventKind::Finish));
        assert!(handlers.take(EventKind::Finish).is_none());
    }

    #[test]
    fn test_event_serialization() {
        let event = EventKind::Cancel.event(AnimationId(42), "ea_1");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"cancelled\""));
        let parsed: AnimationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
