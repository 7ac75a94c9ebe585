//! Per-tab support tracking.
//!
//! Mirrors which browser tabs sit on a supported conversation page and
//! derives the toolbar icon state from the active one. Every lifecycle hook
//! re-evaluates the affected tab against the [`Registry`], so the icon never
//! lags behind a navigation.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::platform::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabState {
    pub url: String,
    /// Some adapter claims `url`
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconState {
    Enabled,
    Disabled,
}

impl fmt::Display for IconState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        })
    }
}

pub struct TabRegistry {
    registry: Registry,
    tabs: FxHashMap<TabId, TabState>,
    active: Option<TabId>,
}

impl TabRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            tabs: FxHashMap::default(),
            active: None,
        }
    }

    fn track(&mut self, tab: TabId, url: &str) {
        let matched = self.registry.is_supported(url);
        crate::debug!("tabs"; "{} {} ({})", tab, url, if matched { "supported" } else { "unsupported" });
        self.tabs.insert(
            tab,
            TabState {
                url: url.to_string(),
                matched,
            },
        );
    }

    /// A tab was opened. Tabs without a URL yet are tracked on first update.
    pub fn on_created(&mut self, tab: TabId, url: Option<&str>) {
        if let Some(url) = url {
            self.track(tab, url);
        }
    }

    /// A tab navigated or changed load status. Only finished loads count.
    pub fn on_updated(&mut self, tab: TabId, url: &str, complete: bool) {
        if complete {
            self.track(tab, url);
        }
    }

    pub fn on_activated(&mut self, tab: TabId) {
        self.active = Some(tab);
    }

    pub fn on_removed(&mut self, tab: TabId) {
        self.tabs.remove(&tab);
        if self.active == Some(tab) {
            self.active = None;
        }
    }

    pub fn get(&self, tab: TabId) -> Option<&TabState> {
        self.tabs.get(&tab)
    }

    pub fn active(&self) -> Option<TabId> {
        self.active
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Enabled iff the active tab is tracked and on a supported page.
    pub fn icon(&self) -> IconState {
        match self.active.and_then(|tab| self.tabs.get(&tab)) {
            Some(state) if state.matched => IconState::Enabled,
            _ => IconState::Disabled,
        }
    }
}
