//! Change detection and reconciliation.
//!
//! Compares the rendered outline with the desired one read from the page and
//! decides the smallest set of sidebar writes that makes them agree.
//!
//! # Strategy
//!
//! ```text
//! desired shorter than rendered ─┐
//!                                ├─▶ Rebuild (conversation changed)
//! fingerprint differs at any     │
//! overlapping position ──────────┘
//!
//! otherwise, per position:
//!   no rendered entry      ─▶ Append
//!   heading texts differ   ─▶ Replace (collapsed flag carried over)
//!   heading texts equal    ─▶ no write (page refs refreshed in the model)
//! ```
//!
//! Positional divergence cannot come from a single conversation growing at
//! its end, so reusing rendered nodes would pair unrelated entries.

use std::fmt;

use serde::Serialize;

use crate::dom::Document;
use crate::outline::{DesiredEntry, OutlineModel};
use crate::sidebar::Sidebar;

// =============================================================================
// Plan
// =============================================================================

/// Why the whole list is thrown away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RebuildReason {
    /// Fewer desired entries than rendered ones
    Shrunk { rendered: usize, desired: usize },
    /// Fingerprint mismatch at an overlapping position
    Diverged { index: usize },
}

impl fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shrunk { rendered, desired } => {
                write!(f, "outline shrank from {rendered} to {desired}")
            }
            Self::Diverged { index } => write!(f, "entry {index} changed identity"),
        }
    }
}

/// One incremental sidebar write, addressed by desired index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    Append { index: usize },
    Replace { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Rendered state already matches
    Unchanged,
    /// Incremental writes, in desired order
    Patch(Vec<PatchOp>),
    /// Discard and render everything fresh
    Rebuild(RebuildReason),
}

/// Decide how to bring `rendered` in line with `desired` (pure).
pub fn plan(rendered: &OutlineModel, desired: &[DesiredEntry]) -> Plan {
    if desired.len() < rendered.len() {
        return Plan::Rebuild(RebuildReason::Shrunk {
            rendered: rendered.len(),
            desired: desired.len(),
        });
    }

    let entries = rendered.entries();
    if let Some(index) = entries
        .iter()
        .zip(desired)
        .position(|(r, d)| r.fingerprint != d.fingerprint)
    {
        return Plan::Rebuild(RebuildReason::Diverged { index });
    }

    let mut ops: Vec<PatchOp> = entries
        .iter()
        .zip(desired)
        .enumerate()
        .filter(|(_, (r, d))| !r.same_headings(d))
        .map(|(index, _)| PatchOp::Replace { index })
        .collect();
    ops.extend((entries.len()..desired.len()).map(|index| PatchOp::Append { index }));

    if ops.is_empty() {
        Plan::Unchanged
    } else {
        Plan::Patch(ops)
    }
}

// =============================================================================
// Apply
// =============================================================================

/// What a reconciliation pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Unchanged,
    Patched { appended: usize, replaced: usize },
    Rebuilt { count: usize, reason: RebuildReason },
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => f.write_str("unchanged"),
            Self::Patched { appended, replaced } => {
                write!(f, "patched: {appended} appended, {replaced} replaced")
            }
            Self::Rebuilt { count, reason } => write!(f, "rebuilt {count} ({reason})"),
        }
    }
}

/// Plan and apply in one step, then refresh the global indicator.
pub fn reconcile(
    doc: &mut Document,
    sidebar: &mut Sidebar,
    desired: &[DesiredEntry],
) -> ReconcileOutcome {
    let plan = plan(sidebar.model(), desired);

    // Unchanged positions still get fresh page refs; the page may have
    // re-rendered identical content under new nodes.
    let overlap = sidebar.model().len().min(desired.len());
    if !matches!(plan, Plan::Rebuild(_)) {
        for (index, d) in desired.iter().enumerate().take(overlap) {
            sidebar.refresh_refs(index, d);
        }
    }

    let outcome = match plan {
        Plan::Unchanged => ReconcileOutcome::Unchanged,
        Plan::Rebuild(reason) => {
            sidebar.rebuild(doc, desired);
            ReconcileOutcome::Rebuilt {
                count: sidebar.model().len(),
                reason,
            }
        }
        Plan::Patch(ops) => {
            let (mut appended, mut replaced) = (0, 0);
            for op in ops {
                match op {
                    PatchOp::Append { index } => {
                        if sidebar.append_entry(doc, &desired[index]) {
                            appended += 1;
                        }
                    }
                    PatchOp::Replace { index } => {
                        sidebar.replace_entry(doc, index, &desired[index]);
                        replaced += 1;
                    }
                }
            }
            ReconcileOutcome::Patched { appended, replaced }
        }
    };

    sidebar.sync_indicator(doc);
    outcome
}
