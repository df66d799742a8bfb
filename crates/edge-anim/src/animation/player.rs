//! The animation state machine.
//!
//! An `Animation` owns the timing of one declarative animation on one element.
//! Control calls mutate `time`, `last_sample` or `rate`, then a single update
//! pass re-derives the play state, synchronizes the element and re-arms the
//! finish timer:
//!
//! ```text
//! play/pause/cancel/finish/reverse/seek/set_rate
//!     └─→ resolve()          time, last_sample, state
//!         └─→ synchronize()  negative animation-delay + play state
//!             └─→ reschedule()  one-shot finish timer
//! ```
//!
//! All of this happens synchronously inside the control call, so no other code
//! (timers included) ever observes a half-applied update.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use super::events::{Callback, EventHandlers, EventKind, EventQueue};
use super::keyframes::{FillMode, Keyframe, Timing, compile_keyframes};
use super::local_time::local_time;
use super::registry::StylesheetRegistry;
use super::scheduler::{ScheduledTask, remaining_ms};
use super::sync::{StylePatch, synchronize};
use super::types::{AnimationId, AnimationSample, PlayState};
use crate::host::{Clock, Host, StyleTarget};

/// Distance kept from a boundary when fill pins a finished animation, so the
/// last visible frame renders instead of one just outside the fill window.
pub const FINISH_EPSILON_MS: f64 = 0.0001;

/// Round half up, the way script engines round.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Outcome of one timing update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub time: Option<f64>,
    pub last_sample: Option<f64>,
    pub state: PlayState,
}

/// Derive the play state and advance time to `now`.
///
/// Undefined time is idle; undefined last sample is paused. Otherwise time
/// advances by the rate-scaled wall-clock delta (rounded to whole
/// milliseconds) and playback is finished once it reaches the boundary for
/// its direction: `total` going forward, 0 going backward. A finished time is
/// pinned just inside the boundary when fill covers that side and exactly on
/// it otherwise.
pub fn resolve(
    time: Option<f64>,
    last_sample: Option<f64>,
    now: f64,
    rate: f64,
    total: f64,
    fill: FillMode,
) -> Resolved {
    let Some(time) = time else {
        return Resolved {
            time: None,
            last_sample,
            state: PlayState::Idle,
        };
    };
    let Some(last) = last_sample else {
        return Resolved {
            time: Some(time),
            last_sample: None,
            state: PlayState::Paused,
        };
    };

    let time = round_half_up(time + (now - last) * rate);
    let forwards = rate >= 0.0;
    let done = if forwards { time >= total } else { time <= 0.0 };
    if !done {
        return Resolved {
            time: Some(time),
            last_sample: Some(now),
            state: PlayState::Running,
        };
    }

    Resolved {
        time: Some(finished_time(forwards, total, fill)),
        last_sample: Some(now),
        state: PlayState::Finished,
    }
}

/// Time a finished animation rests at: the boundary of its direction, moved
/// just inside when fill covers that side.
pub fn finished_time(forwards: bool, total: f64, fill: FillMode) -> f64 {
    if forwards {
        if fill.applies_forwards() {
            total - FINISH_EPSILON_MS
        } else {
            total
        }
    } else if fill.applies_backwards() {
        -FINISH_EPSILON_MS
    } else {
        0.0
    }
}

struct Inner {
    id: AnimationId,
    name: String,
    element: Rc<dyn StyleTarget>,
    clock: Rc<dyn Clock>,
    timing: Timing,
    total: f64,
    rate: f64,
    time: Option<f64>,
    last_sample: Option<f64>,
    state: PlayState,
    /// `(state, local time)` of updates whose style writes are not applied yet.
    unsynced: Vec<(PlayState, f64)>,
    finish_task: ScheduledTask,
    handlers: EventHandlers,
    events: Option<Rc<RefCell<EventQueue>>>,
    this: Weak<RefCell<Inner>>,
}

impl Inner {
    fn update(&mut self) {
        let previous = self.state;
        let resolved = resolve(
            self.time,
            self.last_sample,
            self.clock.now(),
            self.rate,
            self.total,
            self.timing.fill,
        );
        self.time = resolved.time;
        self.last_sample = resolved.last_sample;
        self.state = resolved.state;
        if previous != self.state {
            debug!(
                animation = %self.name,
                from = %previous,
                to = %self.state,
                time = ?self.time,
                "play state changed"
            );
        }

        let local = self.time.map_or(0.0, |t| local_time(&self.timing, t));
        self.unsynced.push((self.state, local));
        self.reschedule(previous);
    }

    /// Update a running animation to the current clock. Returns whether this
    /// update reached the boundary.
    fn catch_up(&mut self) -> bool {
        if self.state != PlayState::Running {
            return false;
        }
        self.update();
        self.state == PlayState::Finished
    }

    /// Arm the finish timer for the next boundary.
    ///
    /// Running animations get a timer for the remaining wall-clock time; an
    /// update that newly lands in `finished` gets an immediate one so the
    /// completion callback still runs. Paused, idle and already-finished
    /// animations have no timer.
    fn reschedule(&mut self, previous: PlayState) {
        self.finish_task.cancel();
        let delay = match (self.state, self.time) {
            (PlayState::Running, Some(time)) => remaining_ms(time, self.rate, self.total),
            (PlayState::Finished, _) if previous != PlayState::Finished => Some(0.0),
            _ => None,
        };
        if let Some(delay) = delay {
            let this = self.this.clone();
            self.finish_task.schedule(
                delay,
                Box::new(move || {
                    if let Some(inner) = this.upgrade() {
                        Animation { inner }.finish();
                    }
                }),
            );
        }
    }

    fn sample(&self) -> AnimationSample {
        AnimationSample {
            time: self.time,
            rate: self.rate,
            state: self.state,
        }
    }
}

/// Handle to one running animation on one element.
///
/// Cloning yields another handle to the same animation. Dropping every handle
/// disposes the pending finish timer; call [`Animation::cancel`] first to also
/// detach the element's declarative animation.
///
/// No borrow of the animation is held while the element is written or a
/// callback runs, so both may call back into the handle.
#[derive(Clone)]
pub struct Animation {
    inner: Rc<RefCell<Inner>>,
}

impl Animation {
    /// Compile and register `keyframes`, write the static timing properties to
    /// `element`, and start playing.
    pub fn new(
        host: &Host,
        registry: &StylesheetRegistry,
        element: Rc<dyn StyleTarget>,
        keyframes: &[Keyframe],
        timing: Timing,
    ) -> Self {
        Self::create(host, registry, element, keyframes, timing, None)
    }

    pub(crate) fn create(
        host: &Host,
        registry: &StylesheetRegistry,
        element: Rc<dyn StyleTarget>,
        keyframes: &[Keyframe],
        timing: Timing,
        events: Option<Rc<RefCell<EventQueue>>>,
    ) -> Self {
        let name = registry.insert(&compile_keyframes(keyframes));
        StylePatch::timing(&timing).apply(element.as_ref());

        let total = timing.total_active_duration();
        let id = AnimationId::new();
        debug!(animation = %name, id = id.0, total, "created animation");
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(Inner {
                id,
                name,
                element,
                clock: host.clock.clone(),
                timing,
                total,
                rate: 1.0,
                time: None,
                last_sample: None,
                state: PlayState::Idle,
                unsynced: Vec::new(),
                finish_task: ScheduledTask::new(host.timers.clone()),
                handlers: EventHandlers::default(),
                events,
                this: this.clone(),
            })
        });

        let animation = Self { inner };
        animation.play();
        animation
    }

    /// Run `f` under the borrow, then write the resulting style updates to the
    /// element with the borrow released.
    fn control<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let (result, element, name, unsynced) = {
            let mut inner = self.inner.borrow_mut();
            let result = f(&mut inner);
            let unsynced = std::mem::take(&mut inner.unsynced);
            (result, inner.element.clone(), inner.name.clone(), unsynced)
        };
        for (state, local) in unsynced {
            synchronize(element.as_ref(), state, local, &name);
        }
        result
    }

    /// Bring a running animation up to the current clock before a call that
    /// changes `last_sample` or `rate`. Reaching the boundary on the way
    /// finishes the animation, since the call would otherwise clear the
    /// pending finish timer.
    fn catch_up(&self) {
        if self.control(Inner::catch_up) {
            self.finish();
        }
    }

    /// Start or resume playback.
    ///
    /// An idle animation, or one at or past the boundary of its current
    /// direction, restarts from the opposite edge (0 going forward, the total
    /// active duration going backward). A running animation keeps its time.
    pub fn play(&self) {
        self.catch_up();
        self.control(|inner| {
            let forwards = inner.rate >= 0.0;
            let restart = match inner.time.map(round_half_up) {
                None => true,
                Some(time) if forwards => time >= inner.total,
                Some(time) => time <= 0.0,
            };
            if restart {
                inner.time = Some(if forwards { 0.0 } else { inner.total });
            }
            inner.last_sample = Some(inner.clock.now());
            inner.update();
        });
    }

    /// Freeze time at its current value.
    pub fn pause(&self) {
        self.catch_up();
        self.control(|inner| {
            inner.last_sample = None;
            inner.update();
        });
    }

    /// Drop the time, detach the element's animation and clear the finish
    /// timer. Runs `on_cancel` when the animation was not already idle.
    pub fn cancel(&self) {
        let was_idle = self.control(|inner| {
            let was_idle = inner.time.is_none();
            inner.time = None;
            inner.last_sample = None;
            inner.update();
            inner.finish_task.cancel();
            was_idle
        });
        if !was_idle {
            self.emit(EventKind::Cancel);
        }
    }

    /// Jump to the boundary of the current direction and run `on_finish`.
    pub fn finish(&self) {
        self.control(|inner| {
            let forwards = inner.rate >= 0.0;
            if inner.state == PlayState::Finished {
                inner.time = Some(finished_time(forwards, inner.total, inner.timing.fill));
            } else {
                inner.time = Some(if forwards { inner.total } else { 0.0 });
                inner.update();
            }
            inner.finish_task.cancel();
        });
        self.emit(EventKind::Finish);
    }

    /// Flip the playback direction without moving time.
    pub fn reverse(&self) {
        self.catch_up();
        self.control(|inner| {
            inner.rate = -inner.rate;
            inner.update();
        });
    }

    /// Set the current time directly.
    ///
    /// The value is not clamped here; a following update applies the usual
    /// completion and fill rules.
    pub fn seek(&self, time: f64) {
        self.control(|inner| {
            inner.time = Some(time);
            inner.update();
        });
    }

    /// Change speed and direction of future advancement. Elapsed time is not
    /// rescaled.
    pub fn set_rate(&self, rate: f64) {
        self.catch_up();
        self.control(|inner| {
            inner.rate = rate;
            inner.update();
        });
    }

    /// Bring timing up to date and return a snapshot.
    pub fn sample(&self) -> AnimationSample {
        self.control(|inner| {
            inner.update();
            inner.sample()
        })
    }

    /// Current time after an update; `None` when idle.
    pub fn current_time(&self) -> Option<f64> {
        self.sample().time
    }

    /// Playback rate after an update.
    pub fn playback_rate(&self) -> f64 {
        self.sample().rate
    }

    /// Play state after an update.
    pub fn play_state(&self) -> PlayState {
        self.sample().state
    }

    /// Snapshot of the last update, without advancing time.
    pub fn last_sample(&self) -> AnimationSample {
        self.inner.borrow().sample()
    }

    /// Local time the element currently displays, without advancing time.
    pub fn local_time(&self) -> Option<f64> {
        let inner = self.inner.borrow();
        inner.time.map(|t| local_time(&inner.timing, t))
    }

    /// Run `callback` whenever the animation finishes.
    pub fn on_finish(&self, callback: impl FnMut() + 'static) {
        self.set_handler(EventKind::Finish, Some(Box::new(callback)));
    }

    /// Run `callback` whenever the animation is canceled.
    pub fn on_cancel(&self, callback: impl FnMut() + 'static) {
        self.set_handler(EventKind::Cancel, Some(Box::new(callback)));
    }

    /// Replace or clear a callback. Safe to call from inside a callback.
    pub fn set_handler(&self, kind: EventKind, callback: Option<Callback>) {
        self.inner.borrow_mut().handlers.set(kind, callback);
    }

    pub fn id(&self) -> AnimationId {
        self.inner.borrow().id
    }

    /// Keyframes name registered in the stylesheet.
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn timing(&self) -> Timing {
        self.inner.borrow().timing.clone()
    }

    /// `delay + duration * iterations + end_delay`.
    pub fn total_active_duration(&self) -> f64 {
        self.inner.borrow().total
    }

    /// Whether a finish timer is armed.
    pub fn has_pending_finish(&self) -> bool {
        self.inner.borrow().finish_task.is_armed()
    }

    fn emit(&self, kind: EventKind) {
        let (taken, event, queue) = {
            let mut inner = self.inner.borrow_mut();
            (
                inner.handlers.take(kind),
                kind.event(inner.id, &inner.name),
                inner.events.clone(),
            )
        };
        debug!(animation = %event.animation_name(), event = %kind, "dispatching event");
        if let Some(queue) = queue {
            queue.borrow_mut().push(event);
        }
        if let Some((mut callback, generation)) = taken {
            callback();
            self.inner
                .borrow_mut()
                .handlers
                .restore(kind, callback, generation);
        }
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Animation")
            .field("id", &inner.id)
            .field("name", &inner.name)
            .field("time", &inner.time)
            .field("rate", &inner.rate)
            .field("state", &inner.state)
            .finish()
    }
}
