//! Leaf type descriptors.

use serde::{Deserialize, Serialize};

/// Base type of a YANG leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    String,
    Enumeration,
    Int32,
    Uint32,
    Union,
    Boolean,
    Empty,
}

/// Inclusive value range on an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

impl Range {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Type descriptor attached to a leaf or leaf-list schema entry.
///
/// For unions, `union` holds the member types in declared order; coercion
/// accepts the first member whose validator passes. For pattern-restricted
/// strings, `patterns` holds XSD regular expressions (implicitly anchored at
/// both ends, see [`crate::pattern`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YangType {
    pub kind: TypeKind,

    /// Member types of a union, in declared order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub union: Vec<YangType>,

    /// XSD patterns restricting a string type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,

    /// Value ranges restricting an integer type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<Range>,
}

impl YangType {
    fn bare(kind: TypeKind) -> Self {
        Self {
            kind,
            union: Vec::new(),
            patterns: Vec::new(),
            ranges: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::bare(TypeKind::String)
    }

    pub fn enumeration() -> Self {
        Self::bare(TypeKind::Enumeration)
    }

    pub fn int32() -> Self {
        Self::bare(TypeKind::Int32)
    }

    pub fn uint32() -> Self {
        Self::bare(TypeKind::Uint32)
    }

    pub fn boolean() -> Self {
        Self::bare(TypeKind::Boolean)
    }

    pub fn empty() -> Self {
        Self::bare(TypeKind::Empty)
    }

    pub fn union(members: Vec<YangType>) -> Self {
        Self {
            union: members,
            ..Self::bare(TypeKind::Union)
        }
    }

    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_ranges(mut self, ranges: Vec<Range>) -> Self {
        self.ranges = ranges;
        self
    }
}
