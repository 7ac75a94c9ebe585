//! CSS selectors used by platform adapters.
//!
//! Parsing and matching are done by the `selectors` crate. This module plugs
//! the [`Document`] arena into it:
//!
//! - [`Dialect`]: a selector implementation without namespaces, pseudo-elements
//!   or stateful pseudo-classes (`:hover` and friends are parse errors)
//! - [`NodeRef`]: a borrowed element handle implementing [`selectors::Element`]
//!
//! Type, `#id`, `.class`, attribute operators, `*`, every combinator,
//! selector lists and tree-structural pseudo-classes (`:first-child`,
//! `:nth-of-type(..)`, `:not(..)`) all come with the crate.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use cssparser::ToCss;
use precomputed_hash::PrecomputedHash;
use rustc_hash::FxHasher;
use selectors::OpaqueElement;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{
    self, ElementSelectorFlags, MatchingContext, MatchingForInvalidation, MatchingMode,
    NeedsSelectorFlags, QuirksMode, SelectorCaches,
};
use selectors::parser::{self, ParseRelative, SelectorList, SelectorParseErrorKind};
use thiserror::Error;

use super::{Document, Element, Node, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("invalid selector `{selector}` at column {column}: {reason}")]
    Invalid {
        selector: String,
        column: u32,
        reason: String,
    },
}

// =============================================================================
// Dialect
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect;

/// Attribute value as written in a selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CssString(String);

impl From<&str> for CssString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_string(&self.0, dest)
    }
}

impl PrecomputedHash for CssString {
    fn precomputed_hash(&self) -> u32 {
        fx_hash(&self.0)
    }
}

/// Tag names, ids, classes and attribute names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CssIdent(String);

impl From<&str> for CssIdent {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl ToCss for CssIdent {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_identifier(&self.0, dest)
    }
}

impl PrecomputedHash for CssIdent {
    fn precomputed_hash(&self) -> u32 {
        fx_hash(&self.0)
    }
}

fn fx_hash(value: &str) -> u32 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish() as u32
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {}

impl parser::NonTSPseudoClass for PseudoClass {
    type Impl = Dialect;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl ToCss for PseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoElement {}

impl parser::PseudoElement for PseudoElement {
    type Impl = Dialect;
}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl parser::SelectorImpl for Dialect {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssIdent;
    type LocalName = CssIdent;
    type NamespaceUrl = CssIdent;
    type NamespacePrefix = CssIdent;
    type BorrowedNamespaceUrl = CssIdent;
    type BorrowedLocalName = CssIdent;
    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

struct DialectParser;

impl<'i> parser::Parser<'i> for DialectParser {
    type Impl = Dialect;
    type Error = SelectorParseErrorKind<'i>;
}

// =============================================================================
// Element handle
// =============================================================================

/// An element of a [`Document`], as seen by the matcher.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
    node: &'a Node,
    element: &'a Element,
}

impl<'a> NodeRef<'a> {
    /// `None` for stale ids and text nodes.
    pub fn new(doc: &'a Document, id: NodeId) -> Option<Self> {
        let node = doc.get(id)?;
        let element = node.as_element()?;
        Some(Self {
            doc,
            id,
            node,
            element,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    fn wrap(&self, id: Option<NodeId>) -> Option<Self> {
        id.and_then(|id| Self::new(self.doc, id))
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> {}", self.element.tag(), self.id)
    }
}

impl selectors::Element for NodeRef<'_> {
    type Impl = Dialect;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.node)
    }

    fn parent_element(&self) -> Option<Self> {
        self.wrap(self.doc.parent(self.id))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.wrap(self.doc.prev_element_sibling(self.id))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let parent = self.doc.parent(self.id)?;
        let siblings = self.doc.children(parent);
        let pos = siblings.iter().position(|&s| s == self.id)?;
        siblings[pos + 1..]
            .iter()
            .find_map(|&s| Self::new(self.doc, s))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.wrap(self.doc.element_children(self.id).next())
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssIdent) -> bool {
        self.element.tag() == name.0
    }

    fn has_namespace(&self, ns: &CssIdent) -> bool {
        ns.0.is_empty()
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.element.tag() == other.element.tag()
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssIdent>,
        local_name: &CssIdent,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        if let NamespaceConstraint::Specific(url) = ns
            && !url.0.is_empty()
        {
            return false;
        }
        self.element
            .attr(&local_name.0)
            .is_some_and(|value| operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &PseudoClass,
        _context: &mut MatchingContext<'_, Dialect>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Dialect>,
    ) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssIdent, case_sensitivity: CaseSensitivity) -> bool {
        self.element
            .attr("id")
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &CssIdent, case_sensitivity: CaseSensitivity) -> bool {
        self.element
            .classes()
            .any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
    }

    fn has_custom_state(&self, _name: &CssIdent) -> bool {
        false
    }

    fn imported_part(&self, _name: &CssIdent) -> Option<CssIdent> {
        None
    }

    fn is_part(&self, _name: &CssIdent) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.doc.children(self.id).is_empty()
    }

    fn is_root(&self) -> bool {
        self.id == self.doc.body()
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}

// =============================================================================
// Selector
// =============================================================================

/// A compiled selector list.
#[derive(Clone)]
pub struct Selector {
    source: String,
    list: SelectorList<Dialect>,
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Selector {}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn context(caches: &mut SelectorCaches) -> MatchingContext<'_, Dialect> {
    MatchingContext::new(
        MatchingMode::Normal,
        None,
        caches,
        QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        MatchingForInvalidation::No,
    )
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut input = cssparser::ParserInput::new(source);
        let mut css = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&DialectParser, &mut css, ParseRelative::No).map_err(|e| {
            SelectorError::Invalid {
                selector: source.to_string(),
                column: e.location.column,
                reason: format!("{:?}", e.kind),
            }
        })?;

        Ok(Self {
            source: source.to_string(),
            list,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn matches_with(
        &self,
        doc: &Document,
        id: NodeId,
        context: &mut MatchingContext<'_, Dialect>,
    ) -> bool {
        NodeRef::new(doc, id).is_some_and(|element| {
            self.list
                .slice()
                .iter()
                .any(|s| matching::matches_selector(s, 0, None, &element, context))
        })
    }

    /// Does the element match any alternative?
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let mut caches = SelectorCaches::default();
        self.matches_with(doc, id, &mut context(&mut caches))
    }

    /// Matching descendants of `root` in document order (root excluded).
    pub fn query_all(&self, doc: &Document, root: NodeId) -> Vec<NodeId> {
        let mut caches = SelectorCaches::default();
        let mut context = context(&mut caches);
        doc.descendants(root)
            .filter(|&n| self.matches_with(doc, n, &mut context))
            .collect()
    }

    /// First matching descendant of `root` in document order.
    pub fn query_first(&self, doc: &Document, root: NodeId) -> Option<NodeId> {
        let mut caches = SelectorCaches::default();
        let mut context = context(&mut caches);
        doc.descendants(root)
            .find(|&n| self.matches_with(doc, n, &mut context))
    }

    /// Nearest ancestor-or-self matching the selector.
    pub fn closest(&self, doc: &Document, id: NodeId) -> Option<NodeId> {
        let mut caches = SelectorCaches::default();
        let mut context = context(&mut caches);
        std::iter::once(id)
            .chain(doc.ancestors(id))
            .find(|&n| self.matches_with(doc, n, &mut context))
    }

    /// Does `id` match, or contain a match?
    pub fn matches_within(&self, doc: &Document, id: NodeId) -> bool {
        self.matches(doc, id) || self.query_first(doc, id).is_some()
    }
}
