//! Page Pipeline
//!
//! Wires the state systems to a page configuration and a host.
//!
//! ```text
//! PageConfig + Host → mount() → PageHandle → snapshot() → renderer
//! ```
//!
//! ## Key Design Principles
//!
//! - **One engine, many pages**: pages differ only by `PageConfig`
//! - **Owned state**: every timer, watcher and list lives in the `PageHandle`;
//!   nothing is process-wide
//! - **Synchronous teardown**: `unmount()` returns only after the host has
//!   dropped every timer and watcher the page registered

pub mod mount;

pub use mount::{mount, unmount, PageHandle, PageSnapshot};
