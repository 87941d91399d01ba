//! Schema tree nodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::YangType;

/// The YANG statement a schema node was compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Structured record with named children.
    Container,

    /// Keyed collection of records.
    List,

    /// Scalar value.
    Leaf,

    /// Ordered collection of scalars.
    LeafList,
}

/// A node in the compiled YANG schema tree.
///
/// The tree is immutable after construction and shared by reference across
/// all request handlers. Children are keyed by element name; for leaves the
/// [`YangType`] dictates how character data is coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEntry {
    /// Element name as it appears in gNMI paths and NETCONF XML.
    pub name: String,

    /// Node kind.
    pub kind: NodeKind,

    /// Leaf type, present for `Leaf` and `LeafList` nodes.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub leaf_type: Option<YangType>,

    /// Child nodes, keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, SchemaEntry>,
}

impl SchemaEntry {
    /// Create a container node.
    pub fn container(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Container,
            leaf_type: None,
            children: BTreeMap::new(),
        }
    }

    /// Create a list node.
    pub fn list(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::List,
            leaf_type: None,
            children: BTreeMap::new(),
        }
    }

    /// Create a leaf node with the given type.
    pub fn leaf(name: impl Into<String>, leaf_type: YangType) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Leaf,
            leaf_type: Some(leaf_type),
            children: BTreeMap::new(),
        }
    }

    /// Create a leaf-list node with the given type.
    pub fn leaf_list(name: impl Into<String>, leaf_type: YangType) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::LeafList,
            leaf_type: Some(leaf_type),
            children: BTreeMap::new(),
        }
    }

    /// Add a child node, returning the modified entry.
    pub fn with_child(mut self, child: SchemaEntry) -> Self {
        self.children.insert(child.name.clone(), child);
        self
    }

    /// Whether this node holds named children (container or list).
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Container | NodeKind::List)
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }

    pub fn is_leaf_list(&self) -> bool {
        self.kind == NodeKind::LeafList
    }

    pub fn is_list(&self) -> bool {
        self.kind == NodeKind::List
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&SchemaEntry> {
        self.children.get(name)
    }

    /// Walk the tree by element names, returning the entry addressed by the
    /// last step, or `None` if any intermediate step is unknown.
    ///
    /// An empty iterator addresses the entry itself. List keys carried by a
    /// path are not consulted here; steps are matched by name only.
    pub fn descend<'a, I>(&self, names: I) -> Option<&SchemaEntry>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entry = self;
        for name in names {
            entry = entry.child(name)?;
        }
        Some(entry)
    }
}
