//! Read path: reconstruct the desired outline from the live page.

use rustc_hash::FxHashSet;

use super::Fingerprint;
use crate::dom::{Document, NodeId};
use crate::platform::{HeadingRef, PlatformAdapter};

/// One entry the page currently asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredEntry {
    pub fingerprint: Fingerprint,
    pub question: String,
    pub question_ref: NodeId,
    pub answer: NodeId,
    pub headings: Vec<HeadingRef>,
}

impl DesiredEntry {
    pub fn heading_texts(&self) -> impl Iterator<Item = &str> {
        self.headings.iter().map(|h| h.text.as_str())
    }
}

/// Walk answers in document order and pair each with its question and
/// headings.
///
/// Answers without a resolvable, non-empty question are skipped. A question
/// text seen earlier in the conversation contributes no second entry.
pub fn read_outline(doc: &Document, adapter: &PlatformAdapter) -> Vec<DesiredEntry> {
    let mut seen = FxHashSet::default();
    let mut desired = Vec::new();

    for answer in adapter.answers(doc) {
        let Some((question, question_ref)) = adapter.question_text(doc, answer) else {
            continue;
        };
        let fingerprint = Fingerprint::of(&question);
        if !seen.insert(fingerprint.clone()) {
            continue;
        }
        desired.push(DesiredEntry {
            fingerprint,
            question,
            question_ref,
            answer,
            headings: adapter.headings_of(doc, answer),
        });
    }

    desired
}
