//! Reference management for the Cairn version store.
//!
//! References are the human-readable entry points into the commit graph.
//!
//! # Architecture
//!
//! - **Branches** are mutable pointers that advance as commits are made.
//! - **Tags** point at a fixed commit; they only move by explicit assignment.
//! - **Detached** specs name a commit by hash without any reference.
//!
//! Names are unique across branches and tags, and every move or delete is a
//! compare-and-swap against the hash the caller last saw.
//!
//! # Modules
//!
//! - [`error`] -- Error types for reference operations
//! - [`names`] -- Reference name validation
//! - [`spec`] -- [`RefSpec`] parsing (`name`, `name@hash`, `@hash`)
//! - [`manager`] -- The [`ReferenceManager`]
//! - [`types`] -- [`ReferenceMetadata`] and [`ReferenceInfo`]

pub mod error;
pub mod manager;
pub mod names;
pub mod spec;
pub mod types;

pub use error::{RefError, Result};
pub use manager::ReferenceManager;
pub use names::validate_reference_name;
pub use spec::RefSpec;
pub use types::{ReferenceInfo, ReferenceMetadata};
