//! Manual Host - virtual time and a scripted viewport
//!
//! A host that never sleeps and never scrolls on its own. Time moves only when
//! [`ManualScheduler::advance`] is called; regions become visible only when
//! [`ManualViewport::set_visibility`] says so.
//!
//! Both registries count their live entries, which is how lifecycle tests
//! catch leaked timers and watchers.
//!
//! Callbacks are invoked with no registry borrow held, so a callback may
//! cancel or unregister itself (or anything else) while it runs.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{CancelHandle, Clock, Host, Scheduler, UnregisterHandle, VisibilityEntry, VisibilityHost};
use crate::types::RegionId;

// =============================================================================
// MANUAL CLOCK
// =============================================================================

/// Settable clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(at)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }

    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::milliseconds(by.as_millis() as i64);
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

// =============================================================================
// MANUAL SCHEDULER
// =============================================================================

type TimerCallback = Rc<RefCell<Box<dyn FnMut()>>>;

struct Timer {
    id: u64,
    interval_ms: u64,
    next_due_ms: u64,
    callback: TimerCallback,
}

#[derive(Default)]
struct SchedulerRegistry {
    elapsed_ms: u64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl SchedulerRegistry {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Earliest timer due at or before `until`, ties broken by registration order.
    fn next_due(&self, until: u64) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.next_due_ms <= until)
            .min_by_key(|(_, t)| (t.next_due_ms, t.id))
            .map(|(i, _)| i)
    }
}

/// Virtual-time scheduler.
///
/// Owns a [`ManualClock`] and moves it in step with the timers it fires, so a
/// callback reading the clock sees its own deadline.
pub struct ManualScheduler {
    registry: Rc<RefCell<SchedulerRegistry>>,
    clock: ManualClock,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            registry: Rc::new(RefCell::new(SchedulerRegistry::default())),
            clock,
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Move virtual time forward, firing every timer interval that elapses.
    ///
    /// Returns how many callbacks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let until = self.registry.borrow().elapsed_ms + by.as_millis() as u64;
        let mut fired = 0;

        loop {
            let callback = {
                let mut guard = self.registry.borrow_mut();
                let reg = &mut *guard;
                let Some(i) = reg.next_due(until) else {
                    break;
                };
                let timer = &mut reg.timers[i];
                let due = timer.next_due_ms;
                timer.next_due_ms += timer.interval_ms;
                let step = due - reg.elapsed_ms;
                reg.elapsed_ms = due;
                self.clock.advance(Duration::from_millis(step));
                reg.timers[i].callback.clone()
            };

            (callback.borrow_mut())();
            fired += 1;
        }

        let mut reg = self.registry.borrow_mut();
        let step = until - reg.elapsed_ms;
        reg.elapsed_ms = until;
        self.clock.advance(Duration::from_millis(step));
        fired
    }

    /// Number of timers still scheduled.
    pub fn active_timers(&self) -> usize {
        self.registry.borrow().timers.len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, interval: Duration, callback: Box<dyn FnMut()>) -> CancelHandle {
        let interval_ms = interval.as_millis() as u64;
        // A zero interval would fire forever within one advance()
        if interval_ms == 0 {
            tracing::warn!("ignoring zero-interval timer");
            return CancelHandle::noop();
        }

        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id();
            let next_due_ms = reg.elapsed_ms + interval_ms;
            reg.timers.push(Timer {
                id,
                interval_ms,
                next_due_ms,
                callback: Rc::new(RefCell::new(callback)),
            });
            id
        };

        let registry: Weak<RefCell<SchedulerRegistry>> = Rc::downgrade(&self.registry);
        CancelHandle::new(move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            // Drop the timer outside the borrow: its callback may own handles
            // that cancel back into this registry.
            let removed = {
                let mut reg = registry.borrow_mut();
                let index = reg.timers.iter().position(|t| t.id == id);
                index.map(|i| reg.timers.remove(i))
            };
            drop(removed);
        })
    }
}

// =============================================================================
// MANUAL VIEWPORT
// =============================================================================

type WatcherCallback = Rc<RefCell<Box<dyn FnMut(&VisibilityEntry)>>>;

struct Watcher {
    id: u64,
    region: RegionId,
    threshold: f64,
    callback: WatcherCallback,
}

#[derive(Default)]
struct ViewportRegistry {
    next_id: u64,
    watchers: Vec<Watcher>,
}

/// Scripted viewport: regions are exactly as visible as the test says.
#[derive(Default)]
pub struct ManualViewport {
    registry: Rc<RefCell<ViewportRegistry>>,
}

impl ManualViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `region` as `ratio` visible (0.0 = off screen) to every watcher
    /// on it. Returns how many callbacks ran.
    pub fn set_visibility(&self, region: &RegionId, ratio: f64) -> usize {
        let ratio = ratio.clamp(0.0, 1.0);
        let entry = VisibilityEntry {
            region: region.clone(),
            is_intersecting: ratio > 0.0,
            ratio,
        };

        let targets: Vec<(u64, WatcherCallback)> = self
            .registry
            .borrow()
            .watchers
            .iter()
            .filter(|w| &w.region == region)
            .map(|w| (w.id, w.callback.clone()))
            .collect();

        let mut delivered = 0;
        for (id, callback) in targets {
            // An earlier callback in this batch may have unregistered this one
            let still_registered = self.registry.borrow().watchers.iter().any(|w| w.id == id);
            if still_registered {
                (callback.borrow_mut())(&entry);
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of watchers still registered.
    pub fn active_watchers(&self) -> usize {
        self.registry.borrow().watchers.len()
    }

    /// Number of watchers registered on `region`.
    pub fn watchers_for(&self, region: &RegionId) -> usize {
        self.registry
            .borrow()
            .watchers
            .iter()
            .filter(|w| &w.region == region)
            .count()
    }

    /// Threshold requested by the first watcher on `region`.
    pub fn threshold_for(&self, region: &RegionId) -> Option<f64> {
        self.registry
            .borrow()
            .watchers
            .iter()
            .find(|w| &w.region == region)
            .map(|w| w.threshold)
    }
}

impl VisibilityHost for ManualViewport {
    fn observe_visibility(
        &self,
        region: &RegionId,
        threshold: f64,
        callback: Box<dyn FnMut(&VisibilityEntry)>,
    ) -> UnregisterHandle {
        let id = {
            let mut reg = self.registry.borrow_mut();
            reg.next_id += 1;
            let id = reg.next_id;
            reg.watchers.push(Watcher {
                id,
                region: region.clone(),
                threshold,
                callback: Rc::new(RefCell::new(callback)),
            });
            id
        };

        let registry = Rc::downgrade(&self.registry);
        UnregisterHandle::new(move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            let removed = {
                let mut reg = registry.borrow_mut();
                let index = reg.watchers.iter().position(|w| w.id == id);
                index.map(|i| reg.watchers.remove(i))
            };
            drop(removed);
        })
    }
}

// =============================================================================
// MANUAL HOST
// =============================================================================

/// A clock, scheduler and viewport wired together.
pub struct ManualHost {
    pub clock: ManualClock,
    pub scheduler: Rc<ManualScheduler>,
    pub viewport: Rc<ManualViewport>,
}

impl ManualHost {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        let clock = ManualClock::new(now);
        Self {
            scheduler: Rc::new(ManualScheduler::new(clock.clone())),
            viewport: Rc::new(ManualViewport::new()),
            clock,
        }
    }

    /// Capability bundle to hand to components.
    pub fn host(&self) -> Host {
        Host::new(
            Rc::new(self.clock.clone()),
            self.scheduler.clone(),
            self.viewport.clone(),
        )
    }

    /// Timers plus watchers still alive.
    pub fn live_resources(&self) -> usize {
        self.scheduler.active_timers() + self.viewport.active_watchers()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_advance_fires_each_interval() {
        let host = ManualHost::starting_at(epoch());
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let _handle = host.scheduler.schedule(
            Duration::from_secs(1),
            Box::new(move || count_clone.set(count_clone.get() + 1)),
        );

        assert_eq!(host.scheduler.advance(Duration::from_millis(999)), 0);
        assert_eq!(host.scheduler.advance(Duration::from_millis(2_001)), 2);
        assert_eq!(count.get(), 2);
        assert_eq!(host.clock.now(), epoch() + chrono::Duration::seconds(3));
    }

    #[test]
    fn test_clock_matches_deadline_inside_callback() {
        let host = ManualHost::starting_at(epoch());
        let clock = host.clock.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let _handle = host.scheduler.schedule(
            Duration::from_millis(500),
            Box::new(move || seen_clone.borrow_mut().push(clock.now())),
        );
        host.scheduler.advance(Duration::from_millis(1_200));

        assert_eq!(
            *seen.borrow(),
            vec![
                epoch() + chrono::Duration::milliseconds(500),
                epoch() + chrono::Duration::milliseconds(1_000),
            ]
        );
    }

    #[test]
    fn test_callback_can_cancel_itself() {
        let host = ManualHost::starting_at(epoch());
        let slot: Rc<RefCell<Option<CancelHandle>>> = Rc::new(RefCell::new(None));
        let slot_clone = slot.clone();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let handle = host.scheduler.schedule(
            Duration::from_secs(1),
            Box::new(move || {
                count_clone.set(count_clone.get() + 1);
                if let Some(handle) = slot_clone.borrow_mut().take() {
                    handle.cancel();
                }
            }),
        );
        *slot.borrow_mut() = Some(handle);

        host.scheduler.advance(Duration::from_secs(5));
        assert_eq!(count.get(), 1);
        assert_eq!(host.scheduler.active_timers(), 0);
    }

    #[test]
    fn test_zero_interval_is_noop() {
        let host = ManualHost::starting_at(epoch());
        let _handle = host.scheduler.schedule(Duration::ZERO, Box::new(|| {}));
        assert_eq!(host.scheduler.active_timers(), 0);
    }

    #[test]
    fn test_viewport_delivery_and_unregister() {
        let host = ManualHost::starting_at(epoch());
        let region = RegionId::from("hero");
        let entries = Rc::new(RefCell::new(Vec::new()));
        let entries_clone = entries.clone();

        let handle = host.viewport.observe_visibility(
            &region,
            0.1,
            Box::new(move |entry| entries_clone.borrow_mut().push(entry.clone())),
        );
        assert_eq!(host.viewport.threshold_for(&region), Some(0.1));

        host.viewport.set_visibility(&RegionId::from("other"), 1.0);
        host.viewport.set_visibility(&region, 0.0);
        host.viewport.set_visibility(&region, 0.5);
        assert_eq!(entries.borrow().len(), 2);
        assert!(!entries.borrow()[0].is_intersecting);
        assert!(entries.borrow()[1].is_intersecting);

        handle.unregister();
        assert_eq!(host.viewport.active_watchers(), 0);
        assert_eq!(host.viewport.set_visibility(&region, 1.0), 0);
    }

    #[test]
    fn test_handles_outliving_host_are_safe() {
        let handle = {
            let host = ManualHost::starting_at(epoch());
            host.scheduler.schedule(Duration::from_secs(1), Box::new(|| {}))
        };
        handle.cancel();
    }
}
