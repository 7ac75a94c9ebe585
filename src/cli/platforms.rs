//! `chatoc platforms`: list registered adapters in match order.

use std::fmt::Write as _;

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::platform::Registry;

pub fn list_platforms(registry: &Registry) -> Result<()> {
    print!("{}", describe(registry));
    Ok(())
}

fn describe(registry: &Registry) -> String {
    let mut out = String::new();
    for (i, adapter) in registry.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {} {} v{}",
            i + 1,
            adapter.id().bold(),
            adapter.name(),
            adapter.version()
        );
        for pattern in adapter.patterns() {
            let _ = writeln!(out, "      {}", pattern.dimmed());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_lists_builtins_in_order() {
        owo_colors::set_override(false);
        let text = describe(&Registry::builtin());
        let deepseek = text.find("deepseek").unwrap();
        let chatgpt = text.find("chatgpt").unwrap();
        assert!(deepseek < chatgpt);
        assert!(text.contains("*://chat.openai.com/*"));
        assert!(text.contains("ChatGPT v2"));
    }
}
