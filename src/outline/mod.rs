//! Outline model: one entry per question/answer pair on the page.
//!
//! - [`read`] reconstructs the *desired* outline from the live page through
//!   the active adapter.
//! - [`OutlineModel`] is the *rendered* outline the sidebar currently shows,
//!   including per-entry collapse state.
//!
//! Entries are ordered by their answers' document order (conversation order)
//! and keyed by [`Fingerprint`].

mod read;

pub use read::{DesiredEntry, read_outline};

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::dom::NodeId;
use crate::platform::HeadingRef;
use crate::utils::hash;

// =============================================================================
// Fingerprint
// =============================================================================

/// Identity key of an entry: compact hash of the question text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(question: &str) -> Self {
        Self(hash::fingerprint(question))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Entry
// =============================================================================

/// One rendered question with its headings.
///
/// `question_ref` and heading targets are lookup keys into the page and may
/// be stale; revalidate before scrolling to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub fingerprint: Fingerprint,
    pub question: String,
    pub question_ref: NodeId,
    pub headings: Vec<HeadingRef>,
    pub collapsed: bool,
}

impl OutlineEntry {
    /// Fresh entry from desired state; expanded by default.
    pub fn from_desired(desired: &DesiredEntry) -> Self {
        Self {
            fingerprint: desired.fingerprint.clone(),
            question: desired.question.clone(),
            question_ref: desired.question_ref,
            headings: desired.headings.clone(),
            collapsed: false,
        }
    }

    pub fn heading_texts(&self) -> impl Iterator<Item = &str> {
        self.headings.iter().map(|h| h.text.as_str())
    }

    /// Do both heading lists carry the same texts in the same order?
    pub fn same_headings(&self, desired: &DesiredEntry) -> bool {
        self.headings.len() == desired.headings.len()
            && self.heading_texts().eq(desired.heading_texts())
    }
}

// =============================================================================
// Model
// =============================================================================

/// Ordered entries with O(1) fingerprint lookup.
#[derive(Debug, Clone, Default)]
pub struct OutlineModel {
    entries: Vec<OutlineEntry>,
    index: FxHashMap<Fingerprint, usize>,
}

impl OutlineModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&OutlineEntry> {
        self.entries.get(index)
    }

    pub fn position(&self, fingerprint: &Fingerprint) -> Option<usize> {
        self.index.get(fingerprint).copied()
    }

    pub fn find(&self, fingerprint: &Fingerprint) -> Option<&OutlineEntry> {
        self.position(fingerprint).map(|i| &self.entries[i])
    }

    /// Append an entry. A fingerprint already present is rejected.
    pub fn push(&mut self, entry: OutlineEntry) -> bool {
        if self.index.contains_key(&entry.fingerprint) {
            return false;
        }
        self.index
            .insert(entry.fingerprint.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    /// Swap the entry at `index` for one with the same fingerprint.
    pub fn replace(&mut self, index: usize, entry: OutlineEntry) -> bool {
        match self.entries.get_mut(index) {
            Some(slot) if slot.fingerprint == entry.fingerprint => {
                *slot = entry;
                true
            }
            _ => false,
        }
    }

    /// Mutable access for in-place updates that keep the fingerprint.
    pub fn refs_mut(&mut self, index: usize) -> Option<(&mut NodeId, &mut Vec<HeadingRef>)> {
        self.entries
            .get_mut(index)
            .map(|e| (&mut e.question_ref, &mut e.headings))
    }

    pub fn set_collapsed(&mut self, index: usize, collapsed: bool) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.collapsed = collapsed;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Global indicator: expanded when any entry is expanded.
    ///
    /// An empty outline counts as expanded.
    pub fn any_expanded(&self) -> bool {
        self.entries.is_empty() || self.entries.iter().any(|e| !e.collapsed)
    }
}
