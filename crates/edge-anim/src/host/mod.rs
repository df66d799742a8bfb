//! Host surface consumed by the timing engine.
//!
//! The engine never owns an element, a clock, a timer loop or a document; it
//! talks to them through the traits below. Everything is single-threaded:
//! implementations use interior mutability behind `&self` and are shared via
//! `Rc`.
//!
//! - `Clock`: monotonic milliseconds
//! - `TimerHost`: one-shot timers
//! - `StyleTarget`: an element's mutable style bag
//! - `StyleSheetHost` / `StyleSheetTarget`: stylesheet injection

pub mod memory;

use std::rc::Rc;

/// Monotonic wall clock in milliseconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Identifier of an armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Work run when a timer fires.
pub type TimerTask = Box<dyn FnOnce()>;

/// One-shot timers.
///
/// Implementations must never run `task` from inside `set_timeout`, and must
/// not hold internal borrows while a task runs: tasks re-enter the host to arm
/// and clear timers. Negative or non-finite delays behave as 0.
pub trait TimerHost {
    fn set_timeout(&self, delay_ms: f64, task: TimerTask) -> TimerId;
    /// Clearing an unknown or already-fired timer is a no-op.
    fn clear_timeout(&self, id: TimerId);
}

/// An element's style property bag.
pub trait StyleTarget {
    fn set_property(&self, name: &str, value: &str);
    fn remove_property(&self, name: &str);
    /// Read a geometry property, forcing style and layout to be resolved.
    fn force_layout(&self) -> f64;
}

/// A stylesheet whose text is owned by the registry.
pub trait StyleSheetTarget {
    /// Replace the whole stylesheet text.
    fn replace_contents(&self, css: &str);
}

/// The document that style targets are injected into.
pub trait StyleSheetHost {
    fn create_style_sheet(&self) -> Rc<dyn StyleSheetTarget>;
}

/// Process-wide collaborators shared by every animation.
#[derive(Clone)]
pub struct Host {
    pub clock: Rc<dyn Clock>,
    pub timers: Rc<dyn TimerHost>,
    pub document: Rc<dyn StyleSheetHost>,
}

impl Host {
    pub fn new(
        clock: Rc<dyn Clock>,
        timers: Rc<dyn TimerHost>,
        document: Rc<dyn StyleSheetHost>,
    ) -> Self {
        Self {
            clock,
            timers,
            document,
        }
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
