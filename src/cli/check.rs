//! `chatoc check <URL>`: the host query.
//!
//! Answers whether the outline would activate on a URL, and which toolbar
//! icon a tab showing it gets. An unsupported URL is a normal answer, not an
//! error.

use anyhow::Result;
use owo_colors::OwoColorize;
use url::Url;

use crate::platform::Registry;
use crate::tabs::{IconState, TabId, TabRegistry};

pub fn check_url(registry: &Registry, url: &Url) -> Result<()> {
    let (line, icon) = describe(registry, url);
    println!("{line}");
    println!("{}", format!("icon: {icon}").dimmed());
    Ok(())
}

fn describe(registry: &Registry, url: &Url) -> (String, IconState) {
    let mut tabs = TabRegistry::new(registry.clone());
    let tab = TabId(1);
    tabs.on_created(tab, Some(url.as_str()));
    tabs.on_activated(tab);

    let line = match registry.resolve(url.as_str()) {
        Some(adapter) => format!(
            "{} {} → {} ({} v{})",
            "✓".green(),
            url,
            adapter.id().bold(),
            adapter.name(),
            adapter.version()
        ),
        None => format!("{} {} → unsupported", "✗".red(), url),
    };
    (line, tabs.icon())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        owo_colors::set_override(false);
        let registry = Registry::builtin();

        let url = Url::parse("https://yuanbao.tencent.com/chat/abc").unwrap();
        let (line, icon) = describe(&registry, &url);
        assert!(line.ends_with("yuanbao (Yuanbao v1)"));
        assert_eq!(icon, IconState::Enabled);

        let url = Url::parse("https://example.com/").unwrap();
        let (line, icon) = describe(&registry, &url);
        assert!(line.ends_with("unsupported"));
        assert_eq!(icon, IconState::Disabled);
    }
}
