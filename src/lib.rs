//! # spark-page
//!
//! Presentation-state engine for event landing pages.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) so
//! renderers can track state changes.
//!
//! ## Architecture
//!
//! Three independent state systems, each owned per mounted page and driven by
//! a host capability rather than a real browser:
//!
//! ```text
//! Scheduler tick   → CountdownClock → Signal<CountdownSnapshot>
//! Viewport report  → RevealObserver → Signal<RevealState> per region
//! Click            → DisclosureList → open index
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (TargetInstant, CountdownSnapshot, RevealState, ...)
//! - [`host`] - Clock, scheduler and visibility capabilities, plus a manual host
//! - [`state`] - Countdown clock, reveal observer, disclosure list
//! - [`config`] - Page configuration (TOML)
//! - [`pipeline`] - Page mount/unmount

pub mod config;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{ConfigError, DisclosureError};

pub use host::{
    CancelHandle, Clock, Host, Scheduler, SystemClock, UnregisterHandle, VisibilityEntry,
    VisibilityHost,
};

pub use state::{
    decompose, CountdownClock, DisclosureEntry, DisclosureList, EntryView, RevealObserver,
    REVEAL_THRESHOLD, TICK_INTERVAL,
};

pub use config::{PageConfig, SectionConfig};

pub use pipeline::{mount, unmount, PageHandle, PageSnapshot};
