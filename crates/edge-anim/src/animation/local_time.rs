//! Mapping from an animation's elapsed time to the time within one iteration.
//!
//! The declarative animation is already running with the element's direction
//! and iteration settings; the value computed here is written as a negative
//! `animation-delay` so it displays the requested instant without native
//! scrubbing.

use super::keyframes::Timing;

/// Local (within-iteration) time for `time` milliseconds since logical zero.
///
/// Steps:
/// 1. subtract `delay + end_delay`
/// 2. take the remainder by `duration`
/// 3. mirror (`duration - t`) when the direction contains `reverse`
/// 4. mirror again when the direction contains `alternate` and the iteration
///    index (floor of time-less-delay over duration) is even
/// 5. cap at the total active duration and floor at zero
///
/// Non-finite intermediate results (zero duration) map to 0.
pub fn local_time(timing: &Timing, time: f64) -> f64 {
    let duration = timing.duration;
    let total = timing.total_active_duration();
    let time_less_delay = time - (timing.delay + timing.end_delay);

    let mut local = time_less_delay % duration;
    if timing.direction.is_reverse() {
        local = duration - local;
    }
    if timing.direction.is_alternate() && (time_less_delay / duration).floor() % 2.0 == 0.0 {
        local = duration - local;
    }

    if local.is_nan() {
        0.0
    } else if total < local {
        total
    } else if local < 0.0 {
        0.0
    } else {
        local
    }
}
