//! Reference specs: how callers name a point in history.
//!
//! Accepted forms:
//! - `main` -- the current head of a reference
//! - `main@<hash>` -- a specific commit, read through a reference
//! - `@<hash>` or a bare 64-character hex hash -- a detached commit

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cairn_types::Hash;

use crate::error::{RefError, Result};

/// A parsed reference spec.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefSpec {
    pub name: Option<String>,
    pub hash: Option<Hash>,
}

impl RefSpec {
    /// The head of reference `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            hash: None,
        }
    }

    /// Commit `hash` read through reference `name`.
    pub fn at(name: impl Into<String>, hash: Hash) -> Self {
        Self {
            name: Some(name.into()),
            hash: Some(hash),
        }
    }

    /// A detached commit.
    pub fn detached(hash: Hash) -> Self {
        Self {
            name: None,
            hash: Some(hash),
        }
    }

    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |reason: &str| RefError::InvalidSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        if spec.is_empty() {
            return Err(invalid("empty reference spec"));
        }

        if let Some((name, hash)) = spec.split_once('@') {
            let hash = Hash::from_hex(hash).map_err(|e| invalid(&e.to_string()))?;
            return Ok(if name.is_empty() {
                Self::detached(hash)
            } else {
                Self::at(name, hash)
            });
        }

        if Hash::looks_like_hash(spec) {
            let hash = Hash::from_hex(spec).map_err(|e| invalid(&e.to_string()))?;
            return Ok(Self::detached(hash));
        }

        Ok(Self::named(spec))
    }

    pub fn is_detached(&self) -> bool {
        self.name.is_none()
    }
}

impl FromStr for RefSpec {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RefSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.hash) {
            (Some(name), Some(hash)) => write!(f, "{name}@{hash}"),
            (Some(name), None) => write!(f, "{name}"),
            (None, Some(hash)) => write!(f, "@{hash}"),
            (None, None) => Ok(()),
        }
    }
}
