//! Named references: branches, tags, and the detached pseudo-reference.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// Name of the pseudo-reference standing for a bare hash.
pub const DETACHED_REF_NAME: &str = "DETACHED";

/// The type of a named reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefType {
    Branch,
    Tag,
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch => write!(f, "branch"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// A reference name together with its type.
///
/// `Detached` has no name; it is accepted wherever a reference is read but
/// never as the target of a mutation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedRef {
    Branch(String),
    Tag(String),
    Detached,
}

impl NamedRef {
    pub fn branch(name: impl Into<String>) -> Self {
        Self::Branch(name.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    /// Build from a type and a name.
    pub fn of(ref_type: RefType, name: impl Into<String>) -> Self {
        match ref_type {
            RefType::Branch => Self::Branch(name.into()),
            RefType::Tag => Self::Tag(name.into()),
        }
    }

    /// The reference name (`DETACHED` for the pseudo-reference).
    pub fn name(&self) -> &str {
        match self {
            Self::Branch(name) | Self::Tag(name) => name,
            Self::Detached => DETACHED_REF_NAME,
        }
    }

    /// The reference type, `None` for detached.
    pub fn ref_type(&self) -> Option<RefType> {
        match self {
            Self::Branch(_) => Some(RefType::Branch),
            Self::Tag(_) => Some(RefType::Tag),
            Self::Detached => None,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(_))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Self::Detached)
    }
}

impl fmt::Display for NamedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(name) => write!(f, "branch '{name}'"),
            Self::Tag(name) => write!(f, "tag '{name}'"),
            Self::Detached => write!(f, "detached"),
        }
    }
}

/// A named reference and the commit hash it currently points to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub named_ref: NamedRef,
    pub hash: Hash,
}

impl Reference {
    pub fn new(named_ref: NamedRef, hash: Hash) -> Self {
        Self { named_ref, hash }
    }

    pub fn name(&self) -> &str {
        self.named_ref.name()
    }
}
