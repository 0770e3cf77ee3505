//! Exclusive Disclosure List - Accordion with at most one entry open
//!
//! States are `Closed` and `Open(i)` for each entry:
//!
//! ```text
//! Closed  --toggle(i)--> Open(i)
//! Open(i) --toggle(i)--> Closed
//! Open(i) --toggle(j)--> Open(j)
//! ```
//!
//! Renderers only need [`EntryView::expanded`] per entry; height and chevron
//! animation hang off that flag.

use serde::{Deserialize, Serialize};

use crate::error::DisclosureError;

// =============================================================================
// ENTRIES
// =============================================================================

/// One question/answer pair.
///
/// `key` is optional and lets a page toggle sections by name ("kicad")
/// instead of position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub question: String,
    pub answer: String,
}

impl DisclosureEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            key: None,
            question: question.into(),
            answer: answer.into(),
        }
    }

    pub fn keyed(key: impl Into<String>, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// What a renderer needs for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryView<'a> {
    pub index: usize,
    pub question: &'a str,
    pub answer: &'a str,
    pub expanded: bool,
}

// =============================================================================
// DISCLOSURE LIST
// =============================================================================

/// Ordered entries plus the index of the one open entry, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisclosureList {
    entries: Vec<DisclosureEntry>,
    open_index: Option<usize>,
}

impl DisclosureList {
    /// New list, all entries collapsed.
    pub fn new(entries: Vec<DisclosureEntry>) -> Self {
        Self {
            entries,
            open_index: None,
        }
    }

    /// Open entry `index`, or close it if it is the open one.
    ///
    /// Returns the new open index. Fails without touching state if `index` is
    /// out of range.
    pub fn toggle(&mut self, index: usize) -> Result<Option<usize>, DisclosureError> {
        if index >= self.entries.len() {
            return Err(DisclosureError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }

        self.open_index = if self.open_index == Some(index) {
            None
        } else {
            Some(index)
        };
        tracing::trace!(index, open = ?self.open_index, "disclosure toggled");
        Ok(self.open_index)
    }

    /// [`toggle`](Self::toggle) the entry whose key is `key`.
    pub fn toggle_key(&mut self, key: &str) -> Result<Option<usize>, DisclosureError> {
        let index = self
            .position_of(key)
            .ok_or_else(|| DisclosureError::UnknownKey(key.to_string()))?;
        self.toggle(index)
    }

    /// Collapse whatever is open.
    pub fn close(&mut self) {
        self.open_index = None;
    }

    pub fn open_index(&self) -> Option<usize> {
        self.open_index
    }

    pub fn open_entry(&self) -> Option<&DisclosureEntry> {
        self.open_index.and_then(|i| self.entries.get(i))
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open_index == Some(index)
    }

    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.key.as_deref() == Some(key))
    }

    pub fn entries(&self) -> &[DisclosureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render views in order.
    pub fn views(&self) -> impl Iterator<Item = EntryView<'_>> + '_ {
        self.entries.iter().enumerate().map(move |(index, entry)| EntryView {
            index,
            question: &entry.question,
            answer: &entry.answer,
            expanded: self.is_open(index),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
