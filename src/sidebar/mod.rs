//! Sidebar view.
//!
//! Owns the rendered widget subtree inside the page and the [`OutlineModel`]
//! it projects. Every method keeps both in step: a model change is always
//! accompanied by the matching DOM write, and nothing is written when the
//! rendered state already matches.
//!
//! ```text
//! div.outline-container
//! ├── div.outline-header  (drawer handle, title, toggle-all, refresh)
//! └── ul.outline-list
//!     └── li.outline-item[data-fingerprint]
//!         ├── div.outline-question  (span.toggle, span.question-text)
//!         └── div.outline-h3-list
//!             └── div.outline-h3 ...
//! ```

mod drag;
mod render;
mod snapshot;

pub use drag::{DEFAULT_VIEWPORT, Position, Size, WIDGET_HEIGHT};
pub use snapshot::{EntrySnapshot, HeadingSnapshot, OutlineSnapshot, render_text};

use crate::config::SidebarSettings;
use crate::dom::{Document, NodeId};
use crate::outline::{DesiredEntry, Fingerprint, OutlineEntry, OutlineModel};

use render::{ChromeNodes, ItemNodes};

/// A navigation target: a question row, or one of its headings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub entry: Fingerprint,
    pub heading: Option<usize>,
}

pub struct Sidebar {
    chrome: ChromeNodes,
    items: Vec<ItemNodes>,
    model: OutlineModel,
    active: Option<Navigation>,
    drawer_open: bool,
    allow_drag: bool,
    width: u32,
    position: Option<Position>,
    viewport: Size,
}

impl Sidebar {
    /// Build the widget and attach it under `at` (one write).
    pub fn mount(doc: &mut Document, at: NodeId, settings: &SidebarSettings) -> Self {
        let chrome = render::build_chrome(doc, settings.width, settings.auto_show);
        doc.append_child(at, chrome.root);
        Self {
            chrome,
            items: Vec::new(),
            model: OutlineModel::new(),
            active: None,
            drawer_open: settings.auto_show,
            allow_drag: settings.allow_drag,
            width: settings.width,
            position: None,
            viewport: DEFAULT_VIEWPORT,
        }
    }

    pub fn root(&self) -> NodeId {
        self.chrome.root
    }

    pub fn model(&self) -> &OutlineModel {
        &self.model
    }

    pub fn active(&self) -> Option<&Navigation> {
        self.active.as_ref()
    }

    pub fn is_drawer_open(&self) -> bool {
        self.drawer_open
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn is_attached(&self, doc: &Document) -> bool {
        doc.is_connected(self.chrome.root)
    }

    /// Is `node` the widget root or inside it?
    pub fn contains(&self, doc: &Document, node: NodeId) -> bool {
        node == self.chrome.root || doc.ancestors(node).any(|a| a == self.chrome.root)
    }

    /// Put the widget back if the page detached it.
    ///
    /// Returns true when anything had to be written. A widget whose nodes
    /// were already freed is rebuilt from the model, keeping collapse state.
    pub fn ensure_attached(&mut self, doc: &mut Document, at: NodeId) -> bool {
        if self.is_attached(doc) {
            return false;
        }
        if !doc.is_live(self.chrome.root) {
            self.chrome = render::build_chrome(doc, self.width, self.drawer_open);
            if let Some(pos) = self.position {
                doc.set_attr(self.chrome.root, "style", &drag::style(self.width, pos));
            }
            self.items = self
                .model
                .entries()
                .iter()
                .map(|entry| render::build_item(doc, entry))
                .collect();
            for item in &self.items {
                doc.append_child(self.chrome.list, item.li);
            }
            if let Some(active) = self.active.clone() {
                self.mark_active(doc, &active);
            }
            self.sync_indicator(doc);
        }
        doc.append_child(at, self.chrome.root);
        true
    }

    // -------------------------------------------------------------------------
    // Reconciliation primitives
    // -------------------------------------------------------------------------

    /// Render a new, expanded entry at the end of the list (one write).
    ///
    /// A fingerprint already in the model is skipped before anything is built.
    pub fn append_entry(&mut self, doc: &mut Document, desired: &DesiredEntry) -> bool {
        if self.model.position(&desired.fingerprint).is_some() {
            return false;
        }
        let entry = OutlineEntry::from_desired(desired);
        let item = render::build_item(doc, &entry);
        if !self.model.push(entry) {
            return false;
        }
        doc.append_child(self.chrome.list, item.li);
        self.items.push(item);
        true
    }

    /// Re-render entry `index` from desired state, carrying its collapsed
    /// flag and active marking (one write).
    pub fn replace_entry(&mut self, doc: &mut Document, index: usize, desired: &DesiredEntry) {
        let Some(previous) = self.model.get(index) else {
            return;
        };
        if previous.fingerprint != desired.fingerprint {
            return;
        }
        let mut entry = OutlineEntry::from_desired(desired);
        entry.collapsed = previous.collapsed;

        let item = render::build_item(doc, &entry);
        if let Some(active) = &self.active
            && active.entry == entry.fingerprint
            && let Some(node) = active_node(&item, active.heading)
        {
            doc.add_class(node, render::ACTIVE);
        }

        if self.model.replace(index, entry) {
            let old = std::mem::replace(&mut self.items[index], item);
            doc.replace_child(self.chrome.list, self.items[index].li, old.li);
        }
    }

    /// Point entry `index` at fresh page nodes. Model-only, never a write.
    pub fn refresh_refs(&mut self, index: usize, desired: &DesiredEntry) {
        if let Some((question_ref, headings)) = self.model.refs_mut(index) {
            *question_ref = desired.question_ref;
            *headings = desired.headings.clone();
        }
    }

    /// Discard every rendered entry and render `desired` fresh.
    ///
    /// The new list is assembled detached and swapped in with one write.
    /// Collapse state and the active marking are reset.
    pub fn rebuild(&mut self, doc: &mut Document, desired: &[DesiredEntry]) {
        self.model.clear();
        self.items.clear();
        self.active = None;

        let list = render::build_list(doc, self.drawer_open);
        for d in desired {
            let entry = OutlineEntry::from_desired(d);
            if !self.model.push(entry.clone()) {
                continue;
            }
            let item = render::build_item(doc, &entry);
            doc.append_child(list, item.li);
            self.items.push(item);
        }

        let old = std::mem::replace(&mut self.chrome.list, list);
        doc.replace_child(self.chrome.root, list, old);
    }

    /// Show `-` while any entry is expanded, `+` otherwise.
    pub fn sync_indicator(&mut self, doc: &mut Document) {
        let glyph = render::glyph(!self.model.any_expanded());
        doc.set_text_content(self.chrome.toggle_all, glyph);
    }

    // -------------------------------------------------------------------------
    // User intents
    // -------------------------------------------------------------------------

    /// Flip one entry. Returns false for an unknown fingerprint.
    pub fn toggle_entry(&mut self, doc: &mut Document, fingerprint: &Fingerprint) -> bool {
        let Some(index) = self.model.position(fingerprint) else {
            return false;
        };
        let collapsed = !self.model.entries()[index].collapsed;
        self.set_collapsed(doc, index, collapsed);
        self.sync_indicator(doc);
        true
    }

    /// Collapse everything if anything is expanded, else expand everything.
    pub fn toggle_all(&mut self, doc: &mut Document) {
        let collapse = self.model.any_expanded();
        for index in 0..self.model.len() {
            self.set_collapsed(doc, index, collapse);
        }
        self.sync_indicator(doc);
    }

    fn set_collapsed(&mut self, doc: &mut Document, index: usize, collapsed: bool) {
        if !self.model.set_collapsed(index, collapsed) {
            return;
        }
        let item = &self.items[index];
        doc.set_class(item.row, render::COLLAPSED, collapsed);
        doc.set_text_content(item.toggle, render::glyph(collapsed));
        for &heading in &item.headings {
            doc.set_class(heading, render::HIDDEN, collapsed);
        }
    }

    /// Page node a navigation points at, if the entry and heading exist.
    ///
    /// The id may be stale; callers revalidate before scrolling.
    pub fn target_of(&self, nav: &Navigation) -> Option<NodeId> {
        let entry = self.model.find(&nav.entry)?;
        match nav.heading {
            None => Some(entry.question_ref),
            Some(h) => entry.headings.get(h).map(|r| r.target),
        }
    }

    /// Make `nav` the only active row. Returns false when it names nothing.
    pub fn mark_active(&mut self, doc: &mut Document, nav: &Navigation) -> bool {
        let Some(index) = self.model.position(&nav.entry) else {
            return false;
        };
        let Some(node) = active_node(&self.items[index], nav.heading) else {
            return false;
        };

        let marked: Vec<NodeId> = doc
            .descendants(self.chrome.root)
            .filter(|&n| doc.has_class(n, render::ACTIVE))
            .collect();
        for previous in marked {
            if previous != node {
                doc.remove_class(previous, render::ACTIVE);
            }
        }
        doc.add_class(node, render::ACTIVE);
        self.active = Some(nav.clone());
        true
    }

    /// Hide or show the list.
    pub fn toggle_drawer(&mut self, doc: &mut Document) -> bool {
        self.drawer_open = !self.drawer_open;
        let open = self.drawer_open;
        doc.set_class(self.chrome.root, render::COLLAPSED, !open);
        doc.set_attr(self.chrome.list, "style", render::list_style(open));
        doc.set_text_content(self.chrome.drawer_handle, render::drawer_glyph(open));
        open
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Move the widget, clamped to the viewport. Ignored unless dragging is
    /// allowed.
    pub fn drag_to(&mut self, doc: &mut Document, target: Position) -> Option<Position> {
        if !self.allow_drag {
            return None;
        }
        let widget = Size {
            width: i32::try_from(self.width).unwrap_or(i32::MAX),
            height: WIDGET_HEIGHT,
        };
        let pos = drag::clamp(target, widget, self.viewport);
        doc.set_attr(self.chrome.root, "style", &drag::style(self.width, pos));
        self.position = Some(pos);
        Some(pos)
    }

    /// Detach the widget and drop every page reference.
    pub fn destroy(&mut self, doc: &mut Document) {
        doc.remove(self.chrome.root);
        self.items.clear();
        self.model.clear();
        self.active = None;
    }
}

fn active_node(item: &ItemNodes, heading: Option<usize>) -> Option<NodeId> {
    match heading {
        None => Some(item.row),
        Some(h) => item.headings.get(h).copied(),
    }
}

#[cfg(test)]
mod tests;
