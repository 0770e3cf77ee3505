//! Reveal Observer - One-shot fade-in for page sections
//!
//! Each watched region starts [`RevealState::Hidden`]. The first visibility
//! report with at least [`REVEAL_THRESHOLD`] of the region on screen flips it
//! to [`RevealState::Revealed`] and unregisters its watcher. Nothing flips it
//! back.
//!
//! # Lifecycle
//!
//! - `watch(region)` registers a watcher with the host
//! - first qualifying report: reveal + unregister
//! - `teardown(region)` unregisters a region that never became visible
//! - dropping the observer unregisters everything still watched
//!
//! Reports that arrive after a region is revealed or torn down are ignored.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use crate::host::{Host, UnregisterHandle, VisibilityEntry, VisibilityHost};
use crate::types::{RegionId, RevealState};

/// Fraction of a region that must be on screen before it reveals.
pub const REVEAL_THRESHOLD: f64 = 0.1;

// =============================================================================
// REGISTRY
// =============================================================================

struct WatchedRegion {
    state: Signal<RevealState>,
    /// Present until the region reveals or is torn down.
    watcher: Option<UnregisterHandle>,
}

type RegionMap = HashMap<RegionId, WatchedRegion>;

/// Handle a visibility report for `region`.
fn on_visibility(regions: &Weak<RefCell<RegionMap>>, region: &RegionId, entry: &VisibilityEntry, threshold: f64) {
    if !entry.is_intersecting || entry.ratio < threshold {
        return;
    }
    let Some(regions) = regions.upgrade() else {
        return;
    };

    let (state, watcher) = {
        let mut regions = regions.borrow_mut();
        // Torn down
        let Some(watched) = regions.get_mut(region) else {
            return;
        };
        // Late delivery
        if watched.state.get().is_revealed() {
            return;
        }
        (watched.state.clone(), watched.watcher.take())
    };

    tracing::debug!(%region, ratio = entry.ratio, "region revealed");
    state.set(RevealState::Revealed);
    if let Some(watcher) = watcher {
        watcher.unregister();
    }
}

// =============================================================================
// REVEAL OBSERVER
// =============================================================================

/// Tracks reveal state for any number of page regions.
pub struct RevealObserver {
    visibility: Rc<dyn VisibilityHost>,
    threshold: f64,
    regions: Rc<RefCell<RegionMap>>,
}

impl RevealObserver {
    pub fn new(host: &Host) -> Self {
        Self::with_threshold(host, REVEAL_THRESHOLD)
    }

    /// Observer with a custom visible fraction, clamped into `(0, 1]`.
    pub fn with_threshold(host: &Host, threshold: f64) -> Self {
        let threshold = if threshold.is_nan() {
            REVEAL_THRESHOLD
        } else {
            threshold.clamp(f64::MIN_POSITIVE, 1.0)
        };

        Self {
            visibility: host.visibility.clone(),
            threshold,
            regions: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Start watching `region`. Watching a region twice is a no-op.
    pub fn watch(&self, region: impl Into<RegionId>) {
        let region = region.into();
        {
            let mut regions = self.regions.borrow_mut();
            if regions.contains_key(&region) {
                return;
            }
            regions.insert(
                region.clone(),
                WatchedRegion {
                    state: signal(RevealState::Hidden),
                    watcher: None,
                },
            );
        }

        let weak = Rc::downgrade(&self.regions);
        let threshold = self.threshold;
        let watched_region = region.clone();
        let handle = self.visibility.observe_visibility(
            &region,
            threshold,
            Box::new(move |entry| on_visibility(&weak, &watched_region, entry, threshold)),
        );

        // The host may have reported synchronously and revealed already
        let unused = {
            let mut regions = self.regions.borrow_mut();
            match regions.get_mut(&region) {
                Some(watched) if !watched.state.get().is_revealed() => {
                    watched.watcher = Some(handle);
                    None
                }
                _ => Some(handle),
            }
        };
        if let Some(handle) = unused {
            handle.unregister();
        }

        tracing::trace!(%region, threshold, "watching region");
    }

    /// Current state of `region`. Unknown regions are hidden.
    pub fn state(&self, region: &RegionId) -> RevealState {
        self.regions
            .borrow()
            .get(region)
            .map(|watched| watched.state.get())
            .unwrap_or_default()
    }

    /// Reveal state signal for `region`, for reactive renderers.
    pub fn state_signal(&self, region: &RegionId) -> Option<Signal<RevealState>> {
        self.regions
            .borrow()
            .get(region)
            .map(|watched| watched.state.clone())
    }

    /// True while `region` still has a watcher registered.
    pub fn is_watching(&self, region: &RegionId) -> bool {
        self.regions
            .borrow()
            .get(region)
            .is_some_and(|watched| watched.watcher.is_some())
    }

    /// Number of regions tracked (revealed or not).
    pub fn len(&self) -> usize {
        self.regions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.borrow().is_empty()
    }

    /// Number of regions that have revealed.
    pub fn revealed_count(&self) -> usize {
        self.regions
            .borrow()
            .values()
            .filter(|watched| watched.state.get().is_revealed())
            .count()
    }

    /// Forget `region`, unregistering its watcher if still present.
    ///
    /// Returns the state it had, or `None` if it was not watched.
    pub fn teardown(&self, region: &RegionId) -> Option<RevealState> {
        let removed = self.regions.borrow_mut().remove(region)?;
        let state = removed.state.get();
        if let Some(watcher) = removed.watcher {
            watcher.unregister();
        }
        tracing::trace!(%region, ?state, "region torn down");
        Some(state)
    }

    /// Unregister every remaining watcher.
    pub fn dispose(self) {
        // Drop does the work
    }
}

impl Drop for RevealObserver {
    fn drop(&mut self) {
        let regions = std::mem::take(&mut *self.regions.borrow_mut());
        let pending = regions.values().filter(|watched| watched.watcher.is_some()).count();
        if pending > 0 {
            tracing::debug!(pending, "reveal observer disposed with hidden regions");
        }
        // Watchers unregister as the map drops
        drop(regions);
    }
}

// =============================================================================
// TESTS
// =============================================================================
