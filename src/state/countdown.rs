//! Countdown Clock - Live time remaining until a target instant
//!
//! One clock per page. On creation it computes the first snapshot
//! synchronously, then recomputes once per [`TICK_INTERVAL`] on the host
//! scheduler until the target is reached. From then on the snapshot is
//! [`CountdownSnapshot::ZERO`] and the timer is gone.
//!
//! The snapshot is published through a signal so renderers can track it.
//!
//! # Example
//!
//! ```ignore
//! use spark_page::state::countdown::CountdownClock;
//!
//! let clock = CountdownClock::create(target, &host);
//! let digits = clock.snapshot().units();
//!
//! // Owning region goes away
//! clock.dispose();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use spark_signals::{signal, Signal};

use crate::host::{CancelHandle, Clock, Host};
use crate::types::{CountdownSnapshot, TargetInstant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// How often a running clock recomputes.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

// =============================================================================
// DECOMPOSITION
// =============================================================================

/// Split a signed millisecond distance into whole days/hours/minutes/seconds.
///
/// Distances at or below zero clamp to [`CountdownSnapshot::ZERO`].
pub fn decompose(distance_ms: i64) -> CountdownSnapshot {
    if distance_ms <= 0 {
        return CountdownSnapshot::ZERO;
    }
    let distance = distance_ms as u64;

    CountdownSnapshot {
        days: distance / MS_PER_DAY,
        hours: ((distance % MS_PER_DAY) / MS_PER_HOUR) as u8,
        minutes: ((distance % MS_PER_HOUR) / MS_PER_MINUTE) as u8,
        seconds: ((distance % MS_PER_MINUTE) / MS_PER_SECOND) as u8,
    }
}

// =============================================================================
// CLOCK STATE
// =============================================================================

/// Shared between the handle and the tick callback.
struct ClockState {
    target: TargetInstant,
    clock: Rc<dyn Clock>,
    snapshot: Signal<CountdownSnapshot>,
    timer: RefCell<Option<CancelHandle>>,
    expired: Cell<bool>,
}

impl ClockState {
    /// Recompute and publish. Returns true once the target has been reached.
    fn refresh(&self) -> bool {
        let distance = self.target.millis_until(self.clock.now());
        self.snapshot.set(decompose(distance));
        if distance <= 0 {
            self.expired.set(true);
        }
        distance <= 0
    }

    fn stop(&self) {
        let timer = self.timer.borrow_mut().take();
        if let Some(timer) = timer {
            timer.cancel();
        }
    }
}

// =============================================================================
// COUNTDOWN CLOCK
// =============================================================================

/// Handle to a running (or finished) countdown.
///
/// Dropping the handle disposes it.
pub struct CountdownClock {
    state: Rc<ClockState>,
}

impl CountdownClock {
    /// Start counting down to `target` using the host's clock and scheduler.
    ///
    /// A target at or before now yields a zeroed snapshot and never schedules
    /// a timer.
    pub fn create(target: TargetInstant, host: &Host) -> Self {
        let distance = target.millis_until(host.clock.now());
        let state = Rc::new(ClockState {
            target,
            clock: host.clock.clone(),
            snapshot: signal(decompose(distance)),
            timer: RefCell::new(None),
            expired: Cell::new(distance <= 0),
        });

        if state.expired.get() {
            tracing::debug!(instant = %target, "countdown target already passed");
            return Self { state };
        }

        let weak = Rc::downgrade(&state);
        let handle = host.scheduler.schedule(
            TICK_INTERVAL,
            Box::new(move || {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                if state.refresh() {
                    tracing::debug!(instant = %state.target, "countdown reached target");
                    state.stop();
                }
            }),
        );

        // Hosts may tick synchronously inside schedule()
        if state.expired.get() {
            handle.cancel();
        } else {
            *state.timer.borrow_mut() = Some(handle);
            tracing::debug!(instant = %target, remaining = %state.snapshot.get(), "countdown started");
        }

        Self { state }
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> CountdownSnapshot {
        self.state.snapshot.get()
    }

    /// Signal carrying the latest snapshot, for reactive renderers.
    pub fn snapshot_signal(&self) -> Signal<CountdownSnapshot> {
        self.state.snapshot.clone()
    }

    pub fn target(&self) -> TargetInstant {
        self.state.target
    }

    /// True while a tick timer is scheduled.
    pub fn is_running(&self) -> bool {
        self.state.timer.borrow().is_some()
    }

    /// True once the target has been reached.
    pub fn is_expired(&self) -> bool {
        self.state.expired.get()
    }

    /// Stop ticking. The last snapshot stays readable until the handle is gone.
    pub fn dispose(self) {
        // Drop does the work
    }
}

impl Drop for CountdownClock {
    fn drop(&mut self) {
        if self.is_running() {
            tracing::debug!(instant = %self.state.target, "countdown disposed");
        }
        self.state.stop();
    }
}

// =============================================================================
// TESTS
// =============================================================================
