//! Common utilities shared across CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::Cli;
use crate::config::Settings;
use crate::dom::{Document, parse_document};
use crate::platform::Registry;

/// Settings and the adapter registry built from them.
pub struct Context {
    pub settings: Settings,
    pub registry: Registry,
}

impl Context {
    pub fn load(cli: &Cli) -> Result<Self> {
        let settings = Settings::load(&cli.config)
            .with_context(|| format!("failed to load {}", cli.config.display()))?;
        if let Some(path) = &settings.config_path {
            crate::debug!("config"; "loaded {}", path.display());
        }
        let registry = settings.registry()?;
        Ok(Self { settings, registry })
    }
}

pub fn read_html(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Load a saved page into a fresh document.
pub fn read_page(path: &Path) -> Result<Document> {
    let html = read_html(path)?;
    parse_document(&html).with_context(|| format!("failed to parse {}", path.display()))
}
