//! Platform adapters.
//!
//! An adapter maps the generic outline concepts (answer, question, heading,
//! mount point) onto one chat site's markup. Every adapter is described by
//! the same data-only [`AdapterSpec`]; built-ins and config-declared platforms
//! go through the same compile step, so adding a platform never touches the
//! engine.
//!
//! # Question lookup
//!
//! ```text
//! answer ──closest(turn)──▶ turn ──prev siblings──▶ first sibling that is or
//!                                                   contains `question`
//! ```
//!
//! The walk stops at a sibling that holds an answer, so a missing question
//! never borrows the previous exchange's question.

mod builtin;
mod pattern;
mod registry;

pub use builtin::builtin_specs;
pub use pattern::UrlPattern;
pub use registry::Registry;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::{Document, NodeId, Selector, SelectorError};

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("platform `{id}`: invalid {field} selector")]
    Selector {
        id: String,
        field: &'static str,
        #[source]
        error: SelectorError,
    },
    #[error("platform `{id}`: invalid url pattern `{pattern}`")]
    Pattern {
        id: String,
        pattern: String,
        #[source]
        error: regex::Error,
    },
    #[error("platform `{0}` declares no url patterns")]
    NoPatterns(String),
    #[error("platform id `{0}` registered twice")]
    Duplicate(String),
}

// =============================================================================
// Descriptor
// =============================================================================

fn default_version() -> u32 {
    1
}

fn default_heading() -> String {
    "h3".to_string()
}

fn default_mount() -> String {
    "body".to_string()
}

/// Data-only platform descriptor, as written in `[[platform]]` config tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub url_patterns: Vec<String>,
    /// Answer container elements
    pub answer: String,
    /// Nearest ancestor-or-self of an answer that represents its turn
    pub question_turn: String,
    /// Question element, looked up among the turn's preceding siblings
    pub question: String,
    #[serde(default = "default_heading")]
    pub heading: String,
    /// Mutation relevance scope (defaults to `answer`)
    #[serde(default)]
    pub observe_scope: Option<String>,
    #[serde(default = "default_mount")]
    pub mount: String,
    /// Also watch attribute and text changes (streaming sites that patch text in place)
    #[serde(default)]
    pub observe_character_data: bool,
    #[serde(default)]
    pub debounce_ms: Option<u64>,
}

// =============================================================================
// Compiled adapter
// =============================================================================

/// A heading inside an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRef {
    pub text: String,
    pub target: NodeId,
}

/// Structural question lookup (see module docs).
#[derive(Debug, Clone)]
pub struct QuestionLocator {
    turn: Selector,
    question: Selector,
}

impl QuestionLocator {
    fn locate(&self, doc: &Document, answer: NodeId, answers: &Selector) -> Option<NodeId> {
        let turn = self.turn.closest(doc, answer)?;
        let mut sibling = doc.prev_element_sibling(turn);
        while let Some(candidate) = sibling {
            if answers.matches_within(doc, candidate) {
                return None;
            }
            if self.question.matches(doc, candidate) {
                return Some(candidate);
            }
            if let Some(inner) = self.question.query_first(doc, candidate) {
                return Some(inner);
            }
            sibling = doc.prev_element_sibling(candidate);
        }
        None
    }
}

/// Immutable, compiled platform adapter. One is active per page.
#[derive(Debug, Clone)]
pub struct PlatformAdapter {
    id: String,
    name: String,
    version: u32,
    patterns: Vec<UrlPattern>,
    answer: Selector,
    observe_scope: Selector,
    question: QuestionLocator,
    heading: Selector,
    mount: Selector,
    observe_character_data: bool,
    debounce: Option<Duration>,
}

impl PlatformAdapter {
    pub fn compile(spec: &AdapterSpec) -> Result<Self, AdapterError> {
        let id = spec.id.clone();
        let selector = |field: &'static str, source: &str| {
            Selector::parse(source).map_err(|error| AdapterError::Selector {
                id: id.clone(),
                field,
                error,
            })
        };

        if spec.url_patterns.is_empty() {
            return Err(AdapterError::NoPatterns(spec.id.clone()));
        }
        let patterns = spec
            .url_patterns
            .iter()
            .map(|p| {
                UrlPattern::new(p).map_err(|error| AdapterError::Pattern {
                    id: id.clone(),
                    pattern: p.clone(),
                    error,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let answer = selector("answer", &spec.answer)?;
        let observe_scope = match &spec.observe_scope {
            Some(scope) => selector("observe_scope", scope)?,
            None => answer.clone(),
        };

        Ok(Self {
            id: spec.id.clone(),
            name: if spec.name.is_empty() {
                spec.id.clone()
            } else {
                spec.name.clone()
            },
            version: spec.version,
            patterns,
            answer,
            observe_scope,
            question: QuestionLocator {
                turn: selector("question_turn", &spec.question_turn)?,
                question: selector("question", &spec.question)?,
            },
            heading: selector("heading", &spec.heading)?,
            mount: selector("mount", &spec.mount)?,
            observe_character_data: spec.observe_character_data,
            debounce: spec.debounce_ms.map(Duration::from_millis),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn patterns(&self) -> &[UrlPattern] {
        &self.patterns
    }

    pub fn observe_scope(&self) -> &Selector {
        &self.observe_scope
    }

    pub fn observes_character_data(&self) -> bool {
        self.observe_character_data
    }

    /// Adapter-specific quiet period, if it overrides the configured one.
    pub fn debounce(&self) -> Option<Duration> {
        self.debounce
    }

    /// Any pattern matches the whole URL.
    pub fn matches_url(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(url))
    }

    /// All answer containers in document order.
    pub fn answers(&self, doc: &Document) -> Vec<NodeId> {
        self.answer.query_all(doc, doc.body())
    }

    /// Question element for an answer, if the page has rendered one.
    pub fn question_of(&self, doc: &Document, answer: NodeId) -> Option<NodeId> {
        self.question.locate(doc, answer, &self.answer)
    }

    /// Question text for an answer; empty text counts as absent.
    pub fn question_text(&self, doc: &Document, answer: NodeId) -> Option<(String, NodeId)> {
        let question = self.question_of(doc, answer)?;
        let text = doc.normalized_text(question);
        (!text.is_empty()).then_some((text, question))
    }

    /// Headings inside an answer in document order, blank ones skipped.
    pub fn headings_of(&self, doc: &Document, answer: NodeId) -> Vec<HeadingRef> {
        self.heading
            .query_all(doc, answer)
            .into_iter()
            .filter_map(|target| {
                let text = doc.normalized_text(target);
                (!text.is_empty()).then_some(HeadingRef { text, target })
            })
            .collect()
    }

    /// Where the sidebar attaches; falls back to `<body>`.
    pub fn mount_point(&self, doc: &Document) -> NodeId {
        if self.mount.matches(doc, doc.body()) {
            return doc.body();
        }
        self.mount
            .query_first(doc, doc.body())
            .unwrap_or_else(|| doc.body())
    }
}
