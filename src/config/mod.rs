//! Settings management for `chatoc.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [sidebar], [observe]
//! ├── error          # ConfigError
//! ├── util           # config file lookup
//! └── mod.rs         # Settings (this file)
//! ```
//!
//! # Sections
//!
//! | Section         | Purpose                                       |
//! |-----------------|-----------------------------------------------|
//! | `[sidebar]`     | auto_show, width, allow_drag                  |
//! | `[observe]`     | debounce_ms                                   |
//! | `[[platform]]`  | extra platform adapters, after the built-ins  |
//!
//! A missing config file is not an error: every section has defaults.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{ObserveSettings, SidebarSettings};
use section::check_debounce;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::log;
use crate::platform::{AdapterSpec, PlatformAdapter, Registry};
use util::find_config_file;

/// Root configuration structure representing `chatoc.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the settings were loaded from (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    pub sidebar: SidebarSettings,

    pub observe: ObserveSettings,

    /// Extra adapters, tried after the built-ins
    #[serde(rename = "platform", skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<AdapterSpec>,
}

impl Settings {
    /// Load settings, searching upward from the working directory for
    /// `config_name`. Defaults apply when no file is found.
    pub fn load(config_name: &Path) -> Result<Self, ConfigError> {
        match find_config_file(config_name) {
            Some(path) => Self::from_path(&path),
            None => {
                crate::debug!("config"; "{} not found, using defaults", config_name.display());
                Ok(Self::default())
            }
        }
    }

    /// Load and validate settings from a file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let (mut settings, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "unknown fields in {} ignored: {}", name, ignored.join(", "));
        }

        settings.validate()?;
        settings.config_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Parse TOML content without validation.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let settings = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((settings, ignored))
    }

    /// Check ranges and compile every declared platform.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sidebar.validate()?;
        self.observe.validate()?;
        for platform in &self.platforms {
            if let Some(ms) = platform.debounce_ms {
                check_debounce(&format!("platform `{}` debounce_ms", platform.id), ms)?;
            }
        }
        self.registry()?;
        Ok(())
    }

    /// Built-in adapters followed by the declared ones.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        Ok(Registry::with_extra(&self.platforms)?)
    }

    /// Quiet period for `adapter`: its own override, else `[observe]`.
    pub fn debounce_for(&self, adapter: &PlatformAdapter) -> Duration {
        adapter.debounce().unwrap_or_else(|| self.observe.debounce())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse settings. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Settings {
    let (parsed, ignored) = Settings::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL: &str = r#"
[[platform]]
id = "local"
name = "Local"
url_patterns = ["http://localhost:*/*"]
answer = ".answer"
question_turn = ".turn"
question = ".question"
"#;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(matches!(
            Settings::from_str("[sidebar\nwidth = 1"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.sidebar.auto_show);
        assert_eq!(settings.observe.debounce_ms, 300);
        assert!(settings.platforms.is_empty());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_platform_tables_append_after_builtins() {
        let settings = test_parse_config(LOCAL);
        let registry = settings.registry().unwrap();
        let last = registry.iter().last().unwrap();
        assert_eq!(last.id(), "local");
        assert_eq!(
            registry.resolve("http://localhost:3000/c/1").map(PlatformAdapter::id),
            Some("local")
        );
    }

    #[test]
    fn test_invalid_platform_is_config_error() {
        let bad = LOCAL.replace(r#"".answer""#, r#""div >""#);
        let settings = test_parse_config(&bad);
        assert!(matches!(settings.validate(), Err(ConfigError::Platform(_))));
    }

    #[test]
    fn test_platform_debounce_range_checked() {
        let settings = test_parse_config(&format!("{LOCAL}debounce_ms = 0\n"));
        assert!(matches!(settings.validate(), Err(ConfigError::Validation(_))));

        let settings = test_parse_config(&format!("{LOCAL}debounce_ms = 9223372036854775807\n"));
        assert!(matches!(settings.validate(), Err(ConfigError::Validation(_))));

        let settings = test_parse_config(&format!("{LOCAL}debounce_ms = 800\n"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let (settings, ignored) =
            Settings::parse_with_ignored("[sidebar]\nwidth = 300\n[theme]\ndark = true").unwrap();
        assert_eq!(settings.sidebar.width, 300);
        assert!(ignored.iter().any(|f| f.contains("theme")));
    }

    #[test]
    fn test_from_path_reads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatoc.toml");

        fs::write(&path, "[observe]\ndebounce_ms = 800\n").unwrap();
        let settings = Settings::from_path(&path).unwrap();
        assert_eq!(settings.observe.debounce_ms, 800);
        assert_eq!(settings.config_path.as_deref(), Some(path.as_path()));

        fs::write(&path, "[observe]\ndebounce_ms = 1\n").unwrap();
        assert!(matches!(
            Settings::from_path(&path),
            Err(ConfigError::Validation(_))
        ));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Settings::from_path(&missing),
            Err(ConfigError::Io(..))
        ));
    }

    #[test]
    fn test_debounce_for_prefers_adapter() {
        let settings = Settings::default();
        let registry = Registry::builtin();
        let chatgpt = registry.get("chatgpt").unwrap();
        let deepseek = registry.get("deepseek").unwrap();
        assert_eq!(settings.debounce_for(chatgpt), Duration::from_millis(1000));
        assert_eq!(settings.debounce_for(deepseek), Duration::from_millis(300));
    }
}
