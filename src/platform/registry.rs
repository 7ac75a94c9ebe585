//! Adapter registry and platform resolution.

use rustc_hash::FxHashSet;

use super::{AdapterError, AdapterSpec, PlatformAdapter, builtin_specs};

/// Compiled adapters in registration order.
#[derive(Debug, Clone)]
pub struct Registry {
    adapters: Vec<PlatformAdapter>,
}

impl Registry {
    /// Built-in adapters only.
    pub fn builtin() -> Self {
        Self::with_extra(&[]).unwrap_or_else(|_| Self {
            adapters: Vec::new(),
        })
    }

    /// Built-ins followed by `extra` (config-declared) adapters.
    pub fn with_extra(extra: &[AdapterSpec]) -> Result<Self, AdapterError> {
        let mut seen = FxHashSet::default();
        let mut adapters = Vec::new();
        for spec in builtin_specs().iter().chain(extra) {
            if !seen.insert(spec.id.clone()) {
                return Err(AdapterError::Duplicate(spec.id.clone()));
            }
            adapters.push(PlatformAdapter::compile(spec)?);
        }
        Ok(Self { adapters })
    }

    /// First adapter (in registration order) with a pattern matching `url`.
    pub fn resolve(&self, url: &str) -> Option<&PlatformAdapter> {
        self.adapters.iter().find(|a| a.matches_url(url))
    }

    /// Host query: is `url` a supported page?
    pub fn is_supported(&self, url: &str) -> bool {
        self.resolve(url).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&PlatformAdapter> {
        self.adapters.iter().find(|a| a.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformAdapter> {
        self.adapters.iter()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
