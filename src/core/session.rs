//! One outline session per page.
//!
//! ```text
//! records ─▶ MutationFilter ─▶ Debouncer ─(quiet)─▶ run_pass
//!                                                      │
//!                         read_outline ◀───────────────┘
//!                              │
//!                              ▼
//!                         reconcile ─▶ Sidebar
//! ```
//!
//! Every method runs to completion before returning, so two update passes
//! can never overlap. The update pass has no error path: selectors that find
//! nothing yield an empty outline.

use std::time::{Duration, Instant};

use serde::Serialize;

use super::Intent;
use crate::config::Settings;
use crate::dom::{Document, ObserveOptions};
use crate::observe::{Debouncer, MutationFilter};
use crate::outline::read_outline;
use crate::platform::{PlatformAdapter, Registry};
use crate::reconcile::{ReconcileOutcome, reconcile};
use crate::sidebar::{Navigation, OutlineSnapshot, Sidebar};

/// Result of handling one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Dispatched {
    /// An update pass ran
    Pass(ReconcileOutcome),
    /// The sidebar changed
    Applied,
    /// Nothing to do (unknown target, dragging disabled, ...)
    Ignored,
}

pub struct Session {
    adapter: PlatformAdapter,
    sidebar: Sidebar,
    debouncer: Debouncer,
    passes: u64,
}

impl Session {
    /// Attach to a page. `None` when no adapter matches `url`; the page is
    /// then left untouched.
    pub fn start(
        doc: &mut Document,
        registry: &Registry,
        url: &str,
        settings: &Settings,
    ) -> Option<Self> {
        let adapter = registry.resolve(url)?.clone();
        crate::debug!("session"; "{} v{} matches {}", adapter.id(), adapter.version(), url);

        let mount = adapter.mount_point(doc);
        let sidebar = Sidebar::mount(doc, mount, &settings.sidebar);

        doc.observe(if adapter.observes_character_data() {
            ObserveOptions::all()
        } else {
            ObserveOptions::child_list()
        });

        let mut session = Self {
            debouncer: Debouncer::new(settings.debounce_for(&adapter)),
            adapter,
            sidebar,
            passes: 0,
        };
        session.run_pass(doc);
        Some(session)
    }

    pub fn adapter(&self) -> &PlatformAdapter {
        &self.adapter
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    /// Update passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn snapshot(&self, doc: &Document) -> OutlineSnapshot {
        OutlineSnapshot::capture(doc, &self.sidebar, self.adapter.id())
    }

    // -------------------------------------------------------------------------
    // Scheduling
    // -------------------------------------------------------------------------

    /// Drain pending mutation records and arm the debounce timer when any of
    /// them is relevant. Returns the number of relevant records.
    pub fn on_mutations(&mut self, doc: &mut Document, now: Instant) -> usize {
        let records = doc.take_records();
        if records.is_empty() {
            return 0;
        }

        let filter = MutationFilter::new(self.adapter.observe_scope(), Some(self.sidebar.root()));
        let relevant = filter.count_relevant(doc, &records);
        crate::debug!("observe"; "{}/{} records relevant", relevant, records.len());

        if !self.sidebar.is_attached(doc) {
            let at = self.adapter.mount_point(doc);
            self.sidebar.ensure_attached(doc, at);
            crate::debug!("session"; "widget was detached by the page, re-attached");
        }
        self.settle(doc);

        if relevant > 0 {
            self.debouncer.trigger(now);
        }
        relevant
    }

    /// Run the pending pass once the quiet period has elapsed.
    pub fn poll(&mut self, doc: &mut Document, now: Instant) -> Option<ReconcileOutcome> {
        let coalesced = self.debouncer.take_if_ready(now)?;
        crate::debug!("observe"; "quiet for {:?}, {} batches coalesced", self.debouncer.quiet(), coalesced);
        Some(self.run_pass(doc))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn sleep_duration(&self, now: Instant) -> Duration {
        self.debouncer.sleep_duration(now)
    }

    /// Read the page and reconcile the sidebar against it.
    pub fn run_pass(&mut self, doc: &mut Document) -> ReconcileOutcome {
        let at = self.adapter.mount_point(doc);
        self.sidebar.ensure_attached(doc, at);

        let desired = read_outline(doc, &self.adapter);
        let outcome = reconcile(doc, &mut self.sidebar, &desired);
        self.passes += 1;
        crate::debug!("reconcile"; "pass #{}: {}", self.passes, outcome);
        self.settle(doc);
        outcome
    }

    /// Drop the records produced by the widget's own writes. Removed nodes
    /// are freed once no page record is left that might still mention them.
    fn settle(&self, doc: &mut Document) {
        let filter = MutationFilter::new(self.adapter.observe_scope(), Some(self.sidebar.root()));
        doc.retain_records(|doc, record| !filter.is_own(doc, record));
        if !doc.has_pending_records() {
            doc.sweep();
        }
    }

    // -------------------------------------------------------------------------
    // Intents
    // -------------------------------------------------------------------------

    pub fn dispatch(&mut self, doc: &mut Document, intent: Intent) -> Dispatched {
        let applied = |ok: bool| {
            if ok {
                Dispatched::Applied
            } else {
                Dispatched::Ignored
            }
        };

        let dispatched = match intent {
            Intent::Toggle(fingerprint) => applied(self.sidebar.toggle_entry(doc, &fingerprint)),
            Intent::ToggleAll => {
                self.sidebar.toggle_all(doc);
                Dispatched::Applied
            }
            Intent::Refresh => {
                let dropped = self.debouncer.cancel();
                if dropped > 0 {
                    crate::debug!("observe"; "refresh supersedes {} pending batches", dropped);
                }
                Dispatched::Pass(self.run_pass(doc))
            }
            Intent::Navigate(nav) => applied(self.navigate(doc, &nav)),
            Intent::ToggleDrawer => {
                self.sidebar.toggle_drawer(doc);
                Dispatched::Applied
            }
            Intent::Drag(pos) => applied(self.sidebar.drag_to(doc, pos).is_some()),
        };
        self.settle(doc);
        dispatched
    }

    /// Scroll to the target and make it the only active row.
    ///
    /// A stale page reference is re-resolved by fingerprint from a fresh
    /// read before giving up.
    fn navigate(&mut self, doc: &mut Document, nav: &Navigation) -> bool {
        let Some(mut target) = self.sidebar.target_of(nav) else {
            return false;
        };

        if !doc.is_connected(target) {
            let desired = read_outline(doc, &self.adapter);
            let Some(fresh) = desired.iter().find(|d| d.fingerprint == nav.entry) else {
                return false;
            };
            let Some(index) = self.sidebar.model().position(&nav.entry) else {
                return false;
            };
            self.sidebar.refresh_refs(index, fresh);
            match self.sidebar.target_of(nav) {
                Some(t) if doc.is_connected(t) => target = t,
                _ => return false,
            }
        }

        doc.scroll_into_view(target);
        self.sidebar.mark_active(doc, nav)
    }

    /// Stop observing, remove the widget and drop every page reference.
    pub fn destroy(mut self, doc: &mut Document) {
        doc.disconnect();
        self.debouncer.cancel();
        self.sidebar.destroy(doc);
        crate::debug!("session"; "destroyed after {} passes", self.passes);
    }
}

#[cfg(test)]
mod tests;
