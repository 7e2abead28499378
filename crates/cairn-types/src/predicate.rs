//! Opaque caller-supplied filters.
//!
//! The version store never parses filter expressions itself. Callers hand in
//! anything implementing [`Predicate`]; closures work through the blanket
//! impl. A predicate that fails to evaluate surfaces as a bad request.

use thiserror::Error;

/// Failure while evaluating a filter against a value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("filter evaluation failed: {0}")]
pub struct PredicateError(pub String);

impl PredicateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A fallible boolean test over `T`.
pub trait Predicate<T: ?Sized>: Send + Sync {
    fn test(&self, value: &T) -> Result<bool, PredicateError>;
}

impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> Result<bool, PredicateError> + Send + Sync,
{
    fn test(&self, value: &T) -> Result<bool, PredicateError> {
        self(value)
    }
}

/// Apply an optional predicate; `None` accepts everything.
pub fn matches<T: ?Sized>(
    filter: Option<&dyn Predicate<T>>,
    value: &T,
) -> Result<bool, PredicateError> {
    match filter {
        Some(predicate) => predicate.test(value),
        None => Ok(true),
    }
}
