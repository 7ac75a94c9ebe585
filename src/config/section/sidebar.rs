//! `[sidebar]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [sidebar]
//! auto_show = true    # Show the outline list when the widget mounts
//! width = 250         # Widget width in pixels
//! allow_drag = false  # Allow dragging the widget around the viewport
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarSettings {
    /// Initial drawer state.
    pub auto_show: bool,

    /// Widget width in pixels.
    pub width: u32,

    /// Honour drag-to-reposition.
    pub allow_drag: bool,
}

impl Default for SidebarSettings {
    fn default() -> Self {
        Self {
            auto_show: true,
            width: 250,
            allow_drag: false,
        }
    }
}

impl SidebarSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::Validation(
                "sidebar.width must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_sidebar_settings() {
        let config = test_parse_config("[sidebar]\nauto_show = false\nwidth = 320\nallow_drag = true");
        assert!(!config.sidebar.auto_show);
        assert_eq!(config.sidebar.width, 320);
        assert!(config.sidebar.allow_drag);
    }

    #[test]
    fn test_sidebar_defaults() {
        let config = test_parse_config("");
        assert!(config.sidebar.auto_show);
        assert_eq!(config.sidebar.width, 250);
        assert!(!config.sidebar.allow_drag);
    }

    #[test]
    fn test_zero_width_rejected() {
        let config = test_parse_config("[sidebar]\nwidth = 0");
        assert!(config.sidebar.validate().is_err());
    }
}
