//! State Module - Presentation state systems
//!
//! Independent state systems, each driven by its own host signal:
//!
//! - **Countdown** - time remaining to a target instant, ticked by the scheduler
//! - **Reveal** - one-shot fade-in per region, driven by viewport visibility
//! - **Disclosure** - accordion with at most one entry open, driven by clicks

pub mod countdown;
pub mod disclosure;
pub mod reveal;

pub use countdown::{decompose, CountdownClock, TICK_INTERVAL};
pub use disclosure::{DisclosureEntry, DisclosureList, EntryView};
pub use reveal::{RevealObserver, REVEAL_THRESHOLD};
