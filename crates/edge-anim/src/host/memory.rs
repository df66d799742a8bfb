//! In-memory host: a virtual clock, a virtual-time timer queue, a recording
//! element and a recording document.
//!
//! Used by the test suite and the scenario runner to drive animations
//! deterministically.
//!
//! ```
//! use edge_anim::host::memory::MemoryHost;
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use edge_anim::host::TimerHost;
//!
//! let host = MemoryHost::new();
//! let fired = Rc::new(Cell::new(false));
//! let flag = fired.clone();
//! host.timers().set_timeout(10.0, Box::new(move || flag.set(true)));
//! host.advance(9.0);
//! assert!(!fired.get());
//! host.advance(1.0);
//! assert!(fired.get());
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use super::{
    Clock, Host, StyleSheetHost, StyleSheetTarget, StyleTarget, TimerHost, TimerId, TimerTask,
};

/// Settable virtual clock.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: f64) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

struct PendingTimer {
    id: TimerId,
    due: f64,
    task: TimerTask,
}

/// Timer queue running on a `ManualClock`.
///
/// Tasks fire in `(due, id)` order. While a task runs the clock reads its due
/// time, as if the host event loop woke up exactly on schedule.
pub struct TaskQueue {
    clock: Rc<ManualClock>,
    pending: RefCell<Vec<PendingTimer>>,
    next_id: Cell<u64>,
    fired: Cell<usize>,
}

impl TaskQueue {
    pub fn new(clock: Rc<ManualClock>) -> Self {
        Self {
            clock,
            pending: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            fired: Cell::new(0),
        }
    }

    /// Number of armed timers.
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Number of tasks run so far.
    pub fn fired(&self) -> usize {
        self.fired.get()
    }

    /// Due time of the earliest armed timer.
    pub fn next_due(&self) -> Option<f64> {
        self.pending
            .borrow()
            .iter()
            .map(|t| t.due)
            .min_by(f64::total_cmp)
    }

    fn pop_due(&self, until: f64) -> Option<PendingTimer> {
        let mut pending = self.pending.borrow_mut();
        let index = pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;
        Some(pending.remove(index))
    }

    /// Run every task due at or before `until`, including tasks armed by the
    /// tasks themselves, then leave the clock at `until`.
    pub fn run_until(&self, until: f64) {
        while let Some(timer) = self.pop_due(until) {
            if timer.due > self.clock.now() {
                self.clock.set(timer.due);
            }
            trace!(timer = timer.id.0, due = timer.due, "running timer");
            self.fired.set(self.fired.get() + 1);
            (timer.task)();
        }
        if until > self.clock.now() {
            self.clock.set(until);
        }
    }

    /// Run tasks until none remain or `limit` tasks have run.
    pub fn run_all(&self, limit: usize) {
        for _ in 0..limit {
            match self.next_due() {
                Some(due) => self.run_until(due.max(self.clock.now())),
                None => break,
            }
        }
    }
}

impl TimerHost for TaskQueue {
    fn set_timeout(&self, delay_ms: f64, task: TimerTask) -> TimerId {
        let delay = if delay_ms.is_finite() && delay_ms > 0.0 {
            delay_ms
        } else {
            0.0
        };
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.pending.borrow_mut().push(PendingTimer {
            id,
            due: self.clock.now() + delay,
            task,
        });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.pending.borrow_mut().retain(|t| t.id != id);
    }
}

/// A style write recorded by `MemoryElement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedWrite {
    Set(String, String),
    Remove(String),
    Reflow,
}

/// Element stand-in that records every style write.
#[derive(Debug, Default)]
pub struct MemoryElement {
    properties: RefCell<HashMap<String, String>>,
    writes: RefCell<Vec<RecordedWrite>>,
    reflows: Cell<usize>,
}

impl MemoryElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a property.
    pub fn property(&self, name: &str) -> Option<String> {
        self.properties.borrow().get(name).cloned()
    }

    /// Every write so far, oldest first.
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }

    pub fn reflow_count(&self) -> usize {
        self.reflows.get()
    }
}

impl StyleTarget for MemoryElement {
    fn set_property(&self, name: &str, value: &str) {
        self.properties
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self.writes
            .borrow_mut()
            .push(RecordedWrite::Set(name.to_string(), value.to_string()));
    }

    fn remove_property(&self, name: &str) {
        self.properties.borrow_mut().remove(name);
        self.writes
            .borrow_mut()
            .push(RecordedWrite::Remove(name.to_string()));
    }

    fn force_layout(&self) -> f64 {
        self.reflows.set(self.reflows.get() + 1);
        self.writes.borrow_mut().push(RecordedWrite::Reflow);
        0.0
    }
}

/// Stylesheet stand-in that keeps its text and counts replacements.
#[derive(Debug, Default)]
pub struct MemoryStyleSheet {
    contents: RefCell<String>,
    replacements: Cell<usize>,
}

impl MemoryStyleSheet {
    pub fn contents(&self) -> String {
        self.contents.borrow().clone()
    }

    pub fn replacements(&self) -> usize {
        self.replacements.get()
    }
}

impl StyleSheetTarget for MemoryStyleSheet {
    fn replace_contents(&self, css: &str) {
        *self.contents.borrow_mut() = css.to_string();
        self.replacements.set(self.replacements.get() + 1);
    }
}

/// Document stand-in that hands out `MemoryStyleSheet`s.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    sheets: RefCell<Vec<Rc<MemoryStyleSheet>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stylesheet created so far.
    pub fn style_sheets(&self) -> Vec<Rc<MemoryStyleSheet>> {
        self.sheets.borrow().clone()
    }
}

impl StyleSheetHost for MemoryDocument {
    fn create_style_sheet(&self) -> Rc<dyn StyleSheetTarget> {
        let sheet = Rc::new(MemoryStyleSheet::default());
        self.sheets.borrow_mut().push(sheet.clone());
        sheet
    }
}

/// Clock, timers and document wired together on virtual time.
pub struct MemoryHost {
    clock: Rc<ManualClock>,
    timers: Rc<TaskQueue>,
    document: Rc<MemoryDocument>,
}

impl MemoryHost {
    /// Host starting at time 0.
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    pub fn starting_at(start: f64) -> Self {
        let clock = Rc::new(ManualClock::new(start));
        let timers = Rc::new(TaskQueue::new(clock.clone()));
        Self {
            clock,
            timers,
            document: Rc::new(MemoryDocument::new()),
        }
    }

    /// Trait-object handles for the engine.
    pub fn host(&self) -> Host {
        Host::new(self.clock.clone(), self.timers.clone(), self.document.clone())
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn clock(&self) -> &Rc<ManualClock> {
        &self.clock
    }

    pub fn timers(&self) -> &Rc<TaskQueue> {
        &self.timers
    }

    pub fn document(&self) -> &Rc<MemoryDocument> {
        &self.document
    }

    /// Advance virtual time by `delta`, firing due timers on the way.
    pub fn advance(&self, delta: f64) {
        self.run_until(self.clock.now() + delta);
    }

    /// Advance virtual time to `until`, firing due timers on the way.
    pub fn run_until(&self, until: f64) {
        self.timers.run_until(until);
    }

    /// Let the current tick's zero-delay timers run without moving the clock.
    pub fn tick(&self) {
        self.timers.run_until(self.clock.now());
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}
