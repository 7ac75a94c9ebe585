//! Read-back of the rendered widget, for terminal and JSON output.
//!
//! Snapshots are taken from the widget's DOM, not from the model, so they show
//! exactly what a user would see.

use std::fmt::Write;

use serde::Serialize;

use super::render::{ACTIVE, COLLAPSED, HEADING, ITEM, QUESTION};
use super::{Position, Sidebar};
use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingSnapshot {
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySnapshot {
    pub fingerprint: String,
    pub question: String,
    pub collapsed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub active: bool,
    pub headings: Vec<HeadingSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineSnapshot {
    pub platform: String,
    pub drawer_open: bool,
    pub any_expanded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub entries: Vec<EntrySnapshot>,
}

fn first_with_class(doc: &Document, root: NodeId, class: &str) -> Option<NodeId> {
    doc.descendants(root).find(|&n| doc.has_class(n, class))
}

fn all_with_class(doc: &Document, root: NodeId, class: &str) -> Vec<NodeId> {
    doc.descendants(root)
        .filter(|&n| doc.has_class(n, class))
        .collect()
}

impl OutlineSnapshot {
    pub fn capture(doc: &Document, sidebar: &Sidebar, platform: &str) -> Self {
        let root = sidebar.root();
        let entries = all_with_class(doc, root, ITEM)
            .into_iter()
            .map(|li| {
                let row = first_with_class(doc, li, QUESTION);
                let question = first_with_class(doc, li, "question-text")
                    .map(|n| doc.text_content(n))
                    .unwrap_or_default();
                let headings = all_with_class(doc, li, HEADING)
                    .into_iter()
                    .map(|h| HeadingSnapshot {
                        text: doc.text_content(h),
                        active: doc.has_class(h, ACTIVE),
                    })
                    .collect();
                EntrySnapshot {
                    fingerprint: doc.attr(li, "data-fingerprint").unwrap_or("").to_string(),
                    question,
                    collapsed: row.is_some_and(|r| doc.has_class(r, COLLAPSED)),
                    active: row.is_some_and(|r| doc.has_class(r, ACTIVE)),
                    headings,
                }
            })
            .collect();

        let any_expanded = first_with_class(doc, root, "outline-toggle-all")
            .is_some_and(|n| doc.text_content(n) == super::render::EXPANDED_GLYPH);

        Self {
            platform: platform.to_string(),
            drawer_open: !doc.has_class(root, COLLAPSED),
            any_expanded,
            position: sidebar.position(),
            entries,
        }
    }
}

/// Plain-text rendering of a snapshot.
///
/// ```text
/// Outline · chatgpt  [-]
///  1. [-] What is X?
///         1.1 Intro
///  2. [+] What is Y?
/// ```
pub fn render_text(snapshot: &OutlineSnapshot) -> String {
    let mut out = String::new();
    let indicator = if snapshot.any_expanded { "-" } else { "+" };
    let _ = writeln!(out, "Outline · {}  [{indicator}]", snapshot.platform);

    if !snapshot.drawer_open {
        let _ = writeln!(out, "  (hidden)");
        return out;
    }
    if snapshot.entries.is_empty() {
        let _ = writeln!(out, "  (no entries)");
        return out;
    }

    for (i, entry) in snapshot.entries.iter().enumerate() {
        let glyph = if entry.collapsed { "+" } else { "-" };
        let marker = if entry.active { " ◀" } else { "" };
        let _ = writeln!(out, "{:>2}. [{glyph}] {}{marker}", i + 1, entry.question);
        if entry.collapsed {
            continue;
        }
        for (j, heading) in entry.headings.iter().enumerate() {
            let marker = if heading.active { " ◀" } else { "" };
            let _ = writeln!(out, "       {}.{} {}{marker}", i + 1, j + 1, heading.text);
        }
    }
    out
}
