//! Mount API - Page lifecycle.
//!
//! Mounting a page builds every state system its configuration asks for and
//! hands back a [`PageHandle`] that owns them. Unmounting (or dropping the
//! handle) cancels the countdown timer and unregisters every visibility
//! watcher before returning.
//!
//! # Example
//!
//! ```ignore
//! use spark_page::pipeline::mount;
//!
//! let mut page = mount::mount(&PageConfig::default(), &host)?;
//!
//! page.faq_mut().toggle(2)?;
//! let frame = page.snapshot();
//!
//! // Clean up
//! page.unmount();
//! ```

use crate::config::PageConfig;
use crate::error::ConfigError;
use crate::host::Host;
use crate::state::{CountdownClock, DisclosureList, RevealObserver};
use crate::types::{CountdownSnapshot, RegionId, RevealState};

// =============================================================================
// Page Handle
// =============================================================================

/// Handle returned by [`mount`] that owns a page's state.
///
/// Holds:
/// - The countdown clock (one per page)
/// - The reveal observer watching every configured section
/// - The FAQ and installation guide disclosure lists
pub struct PageHandle {
    title: String,
    sections: Vec<RegionId>,
    countdown: Option<CountdownClock>,
    reveal: Option<RevealObserver>,
    faq: DisclosureList,
    guide: DisclosureList,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub countdown: CountdownSnapshot,
    /// Configured sections in page order.
    pub sections: Vec<(RegionId, RevealState)>,
    pub faq_open: Option<usize>,
    pub guide_open: Option<usize>,
}

impl PageHandle {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// True until [`unmount`](Self::unmount) or drop.
    pub fn is_mounted(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn countdown(&self) -> Option<&CountdownClock> {
        self.countdown.as_ref()
    }

    pub fn reveal(&self) -> Option<&RevealObserver> {
        self.reveal.as_ref()
    }

    pub fn faq(&self) -> &DisclosureList {
        &self.faq
    }

    pub fn faq_mut(&mut self) -> &mut DisclosureList {
        &mut self.faq
    }

    pub fn guide(&self) -> &DisclosureList {
        &self.guide
    }

    pub fn guide_mut(&mut self) -> &mut DisclosureList {
        &mut self.guide
    }

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> PageSnapshot {
        let countdown = self
            .countdown
            .as_ref()
            .map(CountdownClock::snapshot)
            .unwrap_or_default();
        let sections = self
            .sections
            .iter()
            .map(|id| {
                let state = self
                    .reveal
                    .as_ref()
                    .map(|reveal| reveal.state(id))
                    .unwrap_or_default();
                (id.clone(), state)
            })
            .collect();

        PageSnapshot {
            countdown,
            sections,
            faq_open: self.faq.open_index(),
            guide_open: self.guide.open_index(),
        }
    }

    /// Stop the countdown and unregister all watchers.
    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let was_mounted = self.is_mounted();

        if let Some(countdown) = self.countdown.take() {
            countdown.dispose();
        }
        if let Some(reveal) = self.reveal.take() {
            reveal.dispose();
        }

        if was_mounted {
            tracing::debug!(title = %self.title, "page unmounted");
        }
    }
}

impl Drop for PageHandle {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Mount a page.
///
/// This sets up:
/// 1. A countdown clock bound to `config.target`
/// 2. A reveal observer watching each of `config.sections`
/// 3. Disclosure lists for `config.faq` and `config.guide`, all collapsed
///
/// Fails only if the configuration does not validate.
pub fn mount(config: &PageConfig, host: &Host) -> Result<PageHandle, ConfigError> {
    config.validate()?;

    let countdown = CountdownClock::create(config.target, host);

    let reveal = RevealObserver::with_threshold(host, config.reveal_threshold);
    let sections: Vec<RegionId> = config.sections.iter().map(|s| s.id.clone()).collect();
    for id in &sections {
        reveal.watch(id.clone());
    }

    tracing::debug!(
        title = %config.title,
        sections = sections.len(),
        faq = config.faq.len(),
        guide = config.guide.len(),
        "page mounted"
    );

    Ok(PageHandle {
        title: config.title.clone(),
        sections,
        countdown: Some(countdown),
        reveal: Some(reveal),
        faq: DisclosureList::new(config.faq.clone()),
        guide: DisclosureList::new(config.guide.clone()),
    })
}

/// Unmount and clean up.
pub fn unmount(handle: PageHandle) {
    handle.unmount();
}

// =============================================================================
// TESTS
// =============================================================================
