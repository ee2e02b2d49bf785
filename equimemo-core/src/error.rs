//! Error types shared by the hook host and the memo hooks.

use thiserror::Error;

use crate::reactive::ScopeId;

/// Errors surfaced by rendering, committing, or flushing a component instance.
///
/// Panics raised by factories and effects are not represented here: they
/// unwind through the call that ran them, untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// A structural comparison could not encode one of its operands.
    #[error("structural comparison failed: {0}")]
    Compare(#[from] serde_value::SerializerError),

    /// A host configuration could not be parsed.
    #[error("invalid host configuration: {0}")]
    Config(#[source] serde_json::Error),

    /// A custom equivalence refused to compare its operands.
    #[error("equivalence check failed: {0}")]
    Equivalence(String),

    /// A single flush kept re-rendering past the configured budget.
    #[error("{scope} exceeded {limit} renders in one flush")]
    RenderLimit { scope: ScopeId, limit: usize },

    /// A render called a different number of hooks than the previous one.
    #[error("{scope} rendered {found} hooks, previous render had {expected}")]
    HookOrder {
        scope: ScopeId,
        expected: usize,
        found: usize,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
