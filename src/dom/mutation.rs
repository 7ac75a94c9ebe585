//! Mutation records delivered to an observer.

use super::NodeId;

/// Which kinds of mutation an observer wants besides child-list changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObserveOptions {
    pub attributes: bool,
    pub character_data: bool,
}

impl ObserveOptions {
    /// Child-list changes only.
    pub const fn child_list() -> Self {
        Self {
            attributes: false,
            character_data: false,
        }
    }

    /// Child-list plus attribute and text changes.
    pub const fn all() -> Self {
        Self {
            attributes: true,
            character_data: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Nodes were inserted into or removed from `target`
    ChildList {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    /// An attribute of `target` changed
    Attributes { name: String },
    /// The data of text node `target` changed
    CharacterData,
}

/// One observed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
}

impl MutationRecord {
    /// Added and removed nodes (empty for attribute/text records).
    pub fn touched_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        let (added, removed): (&[NodeId], &[NodeId]) = match &self.kind {
            MutationKind::ChildList { added, removed } => (added, removed),
            _ => (&[], &[]),
        };
        added.iter().chain(removed.iter()).copied()
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            MutationKind::ChildList { .. } => "childList",
            MutationKind::Attributes { .. } => "attributes",
            MutationKind::CharacterData => "characterData",
        }
    }
}
