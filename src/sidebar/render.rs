//! Detached DOM builders for the sidebar.
//!
//! Everything here creates nodes that are not yet attached to the page, so
//! building an item costs no observable writes. The caller attaches the
//! finished subtree in a single insertion.

use crate::dom::{Document, NodeId};
use crate::outline::OutlineEntry;

pub const CONTAINER: &str = "outline-container";
pub const LIST: &str = "outline-list";
pub const ITEM: &str = "outline-item";
pub const QUESTION: &str = "outline-question";
pub const HEADING_LIST: &str = "outline-h3-list";
pub const HEADING: &str = "outline-h3";
pub const COLLAPSED: &str = "collapsed";
pub const HIDDEN: &str = "hidden";
pub const ACTIVE: &str = "outline-active";

pub const EXPANDED_GLYPH: &str = "-";
pub const COLLAPSED_GLYPH: &str = "+";

pub fn glyph(collapsed: bool) -> &'static str {
    if collapsed {
        COLLAPSED_GLYPH
    } else {
        EXPANDED_GLYPH
    }
}

/// Handles into the fixed chrome of the widget.
#[derive(Debug, Clone, Copy)]
pub struct ChromeNodes {
    pub root: NodeId,
    pub drawer_handle: NodeId,
    pub toggle_all: NodeId,
    pub refresh: NodeId,
    pub list: NodeId,
}

/// Handles into one rendered entry.
#[derive(Debug, Clone)]
pub struct ItemNodes {
    pub li: NodeId,
    pub row: NodeId,
    pub toggle: NodeId,
    pub text: NodeId,
    pub headings: Vec<NodeId>,
}

fn element_with_text(doc: &mut Document, tag: &str, attrs: &[(&str, &str)], text: &str) -> NodeId {
    let el = doc.create_element_with(tag, attrs);
    let t = doc.create_text(text);
    doc.append_child(el, t);
    el
}

/// Container, header and an empty list.
pub fn build_chrome(doc: &mut Document, width: u32, drawer_open: bool) -> ChromeNodes {
    let style = format!("width:{width}px");
    let root = doc.create_element_with("div", &[("class", CONTAINER), ("style", style.as_str())]);
    if !drawer_open {
        doc.add_class(root, COLLAPSED);
    }

    let header = doc.create_element_with("div", &[("class", "outline-header")]);
    let left = doc.create_element_with("div", &[("class", "outline-controls")]);
    let drawer_handle = element_with_text(
        doc,
        "span",
        &[("class", "outline-drawer-handle")],
        drawer_glyph(drawer_open),
    );
    doc.append_child(left, drawer_handle);

    let title = element_with_text(doc, "div", &[("class", "outline-title")], "Outline");

    let right = doc.create_element_with("div", &[("class", "outline-controls")]);
    let toggle_all = element_with_text(
        doc,
        "span",
        &[("class", "outline-toggle-all")],
        EXPANDED_GLYPH,
    );
    let refresh = element_with_text(doc, "span", &[("class", "outline-refresh")], "↻");
    doc.append_child(right, toggle_all);
    doc.append_child(right, refresh);

    doc.append_child(header, left);
    doc.append_child(header, title);
    doc.append_child(header, right);

    let list = build_list(doc, drawer_open);
    doc.append_child(root, header);
    doc.append_child(root, list);

    ChromeNodes {
        root,
        drawer_handle,
        toggle_all,
        refresh,
        list,
    }
}

pub fn drawer_glyph(open: bool) -> &'static str {
    if open { ">" } else { "<" }
}

pub fn list_style(drawer_open: bool) -> &'static str {
    if drawer_open {
        "display:block"
    } else {
        "display:none"
    }
}

/// An empty `ul.outline-list`.
pub fn build_list(doc: &mut Document, drawer_open: bool) -> NodeId {
    doc.create_element_with(
        "ul",
        &[("class", LIST), ("style", list_style(drawer_open))],
    )
}

/// One `li.outline-item` reflecting the entry's collapse state.
pub fn build_item(doc: &mut Document, entry: &OutlineEntry) -> ItemNodes {
    let li = doc.create_element_with(
        "li",
        &[("class", ITEM), ("data-fingerprint", entry.fingerprint.as_str())],
    );

    let row_class = if entry.collapsed {
        format!("{QUESTION} {COLLAPSED}")
    } else {
        QUESTION.to_string()
    };
    let row = doc.create_element_with("div", &[("class", row_class.as_str())]);
    let toggle = element_with_text(doc, "span", &[("class", "toggle")], glyph(entry.collapsed));
    let text = element_with_text(
        doc,
        "span",
        &[("class", "question-text"), ("title", entry.question.as_str())],
        &entry.question,
    );
    doc.append_child(row, toggle);
    doc.append_child(row, text);

    let list = doc.create_element_with("div", &[("class", HEADING_LIST)]);
    let heading_class = if entry.collapsed {
        format!("{HEADING} {HIDDEN}")
    } else {
        HEADING.to_string()
    };
    let headings = entry
        .headings
        .iter()
        .map(|h| {
            let div = element_with_text(
                doc,
                "div",
                &[("class", heading_class.as_str()), ("title", h.text.as_str())],
                &h.text,
            );
            doc.append_child(list, div);
            div
        })
        .collect();

    doc.append_child(li, row);
    doc.append_child(li, list);

    ItemNodes {
        li,
        row,
        toggle,
        text,
        headings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::Fingerprint;
    use crate::platform::HeadingRef;

    #[test]
    fn test_build_item_is_detached_and_free() {
        let mut doc = Document::new();
        let target = doc.create_element("h3");
        let entry = OutlineEntry {
            fingerprint: Fingerprint::of("Q?"),
            question: "Q?".into(),
            question_ref: target,
            headings: vec![HeadingRef {
                text: "Intro".into(),
                target,
            }],
            collapsed: true,
        };
        let item = build_item(&mut doc, &entry);

        assert_eq!(doc.writes(), 0);
        assert!(!doc.is_connected(item.li));
        assert!(doc.has_class(item.row, COLLAPSED));
        assert!(doc.has_class(item.headings[0], HIDDEN));
        assert_eq!(doc.text_content(item.toggle), "+");
        assert_eq!(doc.attr(item.li, "data-fingerprint"), Some(entry.fingerprint.as_str()));
    }

    #[test]
    fn test_chrome_follows_drawer_state() {
        let mut doc = Document::new();
        let chrome = build_chrome(&mut doc, 300, false);
        assert!(doc.has_class(chrome.root, COLLAPSED));
        assert_eq!(doc.attr(chrome.list, "style"), Some("display:none"));
        assert_eq!(doc.attr(chrome.root, "style"), Some("width:300px"));
    }
}
