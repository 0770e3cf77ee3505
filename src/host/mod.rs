//! Host Module - Capabilities the engine borrows from its runtime
//!
//! The state systems never touch a real timer or a real viewport. Whatever
//! hosts the page (a browser binding, a desktop shell, a test) provides:
//!
//! - **Clock** - the current instant
//! - **Scheduler** - recurring timers with a cancel handle
//! - **VisibilityHost** - per-region viewport intersection callbacks with an
//!   unregister handle
//!
//! [`manual`] ships a headless, virtual-time implementation of all three.
//!
//! # Example
//!
//! ```ignore
//! use spark_page::host::manual::ManualHost;
//!
//! let manual = ManualHost::starting_at(now);
//! let host = manual.host();
//!
//! let handle = host.scheduler.schedule(Duration::from_secs(1), Box::new(|| tick()));
//! manual.scheduler.advance(Duration::from_secs(3)); // tick() runs 3 times
//! handle.cancel();
//! ```

pub mod manual;

use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::types::RegionId;

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Recurring timer facility.
pub trait Scheduler {
    /// Run `callback` once per elapsed `interval` until the returned handle is
    /// cancelled or dropped.
    fn schedule(&self, interval: Duration, callback: Box<dyn FnMut()>) -> CancelHandle;
}

/// Viewport intersection facility.
pub trait VisibilityHost {
    /// Deliver intersection changes for `region` to `callback` until the
    /// returned handle is unregistered or dropped.
    ///
    /// `threshold` is the visible-area fraction the caller cares about; hosts
    /// may use it to decide when to deliver, callers must not rely on that.
    fn observe_visibility(
        &self,
        region: &RegionId,
        threshold: f64,
        callback: Box<dyn FnMut(&VisibilityEntry)>,
    ) -> UnregisterHandle;
}

/// One intersection report for a watched region.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityEntry {
    pub region: RegionId,
    pub is_intersecting: bool,
    /// Fraction of the region's area inside the viewport, 0.0..=1.0.
    pub ratio: f64,
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// =============================================================================
// HANDLES
// =============================================================================

/// Stops a scheduled timer.
///
/// Dropping the handle cancels the timer as well.
pub struct CancelHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl CancelHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Handle for a timer that was never started.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Stops a visibility watcher.
///
/// Dropping the handle unregisters the watcher as well.
pub struct UnregisterHandle {
    unregister: Option<Box<dyn FnOnce()>>,
}

impl UnregisterHandle {
    pub fn new(unregister: impl FnOnce() + 'static) -> Self {
        Self {
            unregister: Some(Box::new(unregister)),
        }
    }

    pub fn noop() -> Self {
        Self { unregister: None }
    }

    pub fn unregister(mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}

impl Drop for UnregisterHandle {
    fn drop(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}

// =============================================================================
// HOST BUNDLE
// =============================================================================

/// The three capabilities, shared by every component mounted on a page.
#[derive(Clone)]
pub struct Host {
    pub clock: Rc<dyn Clock>,
    pub scheduler: Rc<dyn Scheduler>,
    pub visibility: Rc<dyn VisibilityHost>,
}

impl Host {
    pub fn new(
        clock: Rc<dyn Clock>,
        scheduler: Rc<dyn Scheduler>,
        visibility: Rc<dyn VisibilityHost>,
    ) -> Self {
        Self {
            clock,
            scheduler,
            visibility,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
