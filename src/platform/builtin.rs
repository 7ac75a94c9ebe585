//! Built-in platform descriptors, in registration order.
//!
//! Question lookups use the nearest semantic turn container rather than a
//! fixed number of parent hops, so wrapper divs added by a site redesign do
//! not break them.

use super::AdapterSpec;

fn spec(id: &str, name: &str, patterns: &[&str]) -> AdapterSpec {
    AdapterSpec {
        id: id.to_string(),
        name: name.to_string(),
        version: 1,
        url_patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
        answer: String::new(),
        question_turn: String::new(),
        question: String::new(),
        heading: "h3".to_string(),
        observe_scope: None,
        mount: "body".to_string(),
        observe_character_data: false,
        debounce_ms: None,
    }
}

/// DeepSeek, ChatGPT and Tencent Yuanbao.
pub fn builtin_specs() -> Vec<AdapterSpec> {
    vec![
        AdapterSpec {
            answer: ".ds-markdown.ds-markdown--block".to_string(),
            // The user message is the element right before the assistant message
            question_turn: ".ds-message".to_string(),
            question: "*".to_string(),
            ..spec("deepseek", "DeepSeek", &["*://chat.deepseek.com/*"])
        },
        AdapterSpec {
            version: 2,
            answer: ".markdown.prose".to_string(),
            question_turn: "article".to_string(),
            question: ".whitespace-pre-wrap".to_string(),
            // Streaming answers patch text nodes in place
            observe_character_data: true,
            debounce_ms: Some(1000),
            ..spec("chatgpt", "ChatGPT", &["*://chatgpt.com/*", "*://chat.openai.com/*"])
        },
        AdapterSpec {
            answer: ".hyc-common-markdown".to_string(),
            question_turn: ".agent-chat__list__item".to_string(),
            question: ".hyc-content-text".to_string(),
            ..spec("yuanbao", "Yuanbao", &["*://yuanbao.tencent.com/*"])
        },
    ]
}
