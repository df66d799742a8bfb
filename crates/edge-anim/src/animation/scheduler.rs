//! Finish scheduling: a cancellable one-shot task per animation.

use std::rc::Rc;

use tracing::trace;

use crate::host::{TimerHost, TimerId, TimerTask};

/// Wall-clock milliseconds until playback reaches its natural boundary.
///
/// Forward playback ends at `total`, reverse playback at 0. The remaining
/// timeline distance is divided by the playback speed. Returns `None` when the
/// boundary is never reached (zero rate, infinite or undefined duration).
pub fn remaining_ms(time: f64, rate: f64, total: f64) -> Option<f64> {
    if rate == 0.0 {
        return None;
    }
    let distance = if rate >= 0.0 { total - time } else { time };
    let wall = distance / rate.abs();
    if wall.is_finite() {
        Some(wall.max(0.0))
    } else {
        None
    }
}

/// A timer handle that can be re-armed and is cleared on drop.
pub struct ScheduledTask {
    timers: Rc<dyn TimerHost>,
    handle: Option<TimerId>,
}

impl ScheduledTask {
    pub fn new(timers: Rc<dyn TimerHost>) -> Self {
        Self {
            timers,
            handle: None,
        }
    }

    /// Clear any armed timer and arm a new one.
    pub fn schedule(&mut self, delay_ms: f64, task: TimerTask) {
        self.cancel();
        let id = self.timers.set_timeout(delay_ms, task);
        trace!(timer = id.0, delay_ms, "armed finish timer");
        self.handle = Some(id);
    }

    /// Clear the armed timer, if any.
    pub fn cancel(&mut self) {
        if let Some(id) = self.handle.take() {
            self.timers.clear_timeout(id);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("handle", &self.handle)
            .finish()
    }
}
