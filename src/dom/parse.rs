//! HTML text → [`Document`] nodes, via `tl`.
//!
//! Page snapshots are fed through here. Only the body content is kept:
//! `<head>`, scripts, styles and comments are dropped, whitespace-only text
//! is skipped and entities in text are decoded.

use thiserror::Error;

use super::{Document, NodeId};
use crate::utils::html::{is_raw_text_element, unescape};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse HTML: {0}")]
    Html(String),
}

/// Parse a full page into a fresh document.
pub fn parse_document(html: &str) -> Result<Document, ParseError> {
    let mut doc = Document::new();
    let body = doc.body();
    insert_fragment(&mut doc, body, None, html)?;
    Ok(doc)
}

/// Parse `html` and insert the resulting top-level nodes into `parent`
/// before `before` (or at the end). Each inserted node is one write.
///
/// When the markup contains a `<body>`, its children are used instead of the
/// top-level nodes.
pub fn insert_fragment(
    doc: &mut Document,
    parent: NodeId,
    before: Option<NodeId>,
    html: &str,
) -> Result<Vec<NodeId>, ParseError> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|e| ParseError::Html(format!("{e:?}")))?;
    let parser = dom.parser();

    let roots: Vec<tl::NodeHandle> = match find_body(dom.children().iter().copied(), parser) {
        Some(body) => body.children().top().iter().copied().collect(),
        None => dom.children().to_vec(),
    };

    let mut inserted = Vec::with_capacity(roots.len());
    for handle in roots {
        if let Some(node) = build(doc, handle, parser) {
            doc.insert_before(parent, node, before);
            inserted.push(node);
        }
    }
    Ok(inserted)
}

/// Locate `<body>` among top-level nodes or inside `<html>`.
fn find_body<'p, 'a>(
    handles: impl IntoIterator<Item = tl::NodeHandle>,
    parser: &'p tl::Parser<'a>,
) -> Option<&'p tl::HTMLTag<'a>> {
    for handle in handles {
        let Some(tl::Node::Tag(tag)) = handle.get(parser) else {
            continue;
        };
        match tag.name().as_utf8_str().to_ascii_lowercase().as_str() {
            "body" => return Some(tag),
            "html" => {
                let nested: Vec<tl::NodeHandle> = tag.children().top().iter().copied().collect();
                if let Some(body) = find_body(nested, parser) {
                    return Some(body);
                }
            }
            _ => {}
        }
    }
    None
}

/// Build a detached subtree for one `tl` node.
fn build(doc: &mut Document, handle: tl::NodeHandle, parser: &tl::Parser) -> Option<NodeId> {
    match handle.get(parser)? {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_ascii_lowercase();
            if name == "head" || is_raw_text_element(&name) {
                return None;
            }

            let attrs: Vec<(String, String)> = tag
                .attributes()
                .iter()
                .map(|(key, value)| {
                    let key: &str = key.as_ref();
                    let value = value.map(|v| unescape(&v).into_owned()).unwrap_or_default();
                    (key.to_string(), value)
                })
                .collect();
            let attr_refs: Vec<(&str, &str)> = attrs
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();

            let element = doc.create_element_with(&name, &attr_refs);
            for child in tag.children().top().iter() {
                if let Some(node) = build(doc, *child, parser) {
                    doc.append_child(element, node);
                }
            }
            Some(element)
        }
        tl::Node::Raw(bytes) => {
            let text = bytes.as_utf8_str();
            if text.trim().is_empty() {
                None
            } else {
                Some(doc.create_text(&unescape(&text)))
            }
        }
        tl::Node::Comment(_) => None,
    }
}
