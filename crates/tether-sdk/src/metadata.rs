//! Metadata records consumed by type builders
//!
//! A metadata record is the immutable description of one type's shape for one
//! assembly generation. The record format is owned by whoever ships metadata
//! out of the external runtime; this crate only needs the questions below
//! answered about it.

use crate::assembly::Generation;
use std::fmt;

/// Kind of reflected type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Reference type with identity
    Class,
    /// Value type laid out inline
    Struct,
    /// Enumeration
    Enum,
    /// Interface
    Interface,
}

impl TypeKind {
    /// Lowercase name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
            TypeKind::Interface => "interface",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a type changed between two metadata versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Field or function layout changed; the reflection object needs a rebuild
    Structural,
    /// Only behavior changed (e.g. native call targets); layout is untouched
    Behavioral,
}

impl ChangeKind {
    /// Combine two changes; a structural change subsumes a behavioral one
    pub fn merge(self, other: ChangeKind) -> ChangeKind {
        match (self, other) {
            (ChangeKind::Behavioral, ChangeKind::Behavioral) => ChangeKind::Behavioral,
            _ => ChangeKind::Structural,
        }
    }
}

/// One type's metadata for one assembly generation
pub trait TypeMetadata {
    /// Name of the type, unique within its assembly
    fn type_name(&self) -> &str;

    /// Kind of type described
    fn kind(&self) -> TypeKind;

    /// Generation of the assembly this record was read from
    fn generation(&self) -> Generation;

    /// Classify the change from `self` to `newer`.
    ///
    /// Returns `None` when both describe the same type.
    fn classify_change(&self, newer: &Self) -> Option<ChangeKind>;
}
