//! Deep Equality
//!
//! The memo-result hooks decide whether to publish a recomputed value by
//! asking an [`Equivalence`] whether it matches the held one. Three are
//! provided:
//!
//! - [`PartialEqual`]: the type's own `PartialEq`. For plain data with derived
//!   `PartialEq` this is already structural: containers compare by contents,
//!   `Arc<T>` compares the pointee, and hash or B-tree maps ignore insertion
//!   order.
//! - [`Structural`]: encodes both values as `serde_value::Value` trees and
//!   compares those. Useful for loosely typed data; map keys are unordered.
//!   The tree keeps `()`, `None` and `Some(())` apart and compares floats
//!   exactly, except that `NaN` equals `NaN` and `0.0` equals `-0.0`. A value
//!   whose `Serialize` impl fails is an error, never "unequal".
//! - [`ByFn`]: any closure returning `bool`.

use std::fmt;

use serde::Serialize;

use crate::error::Result;

/// Decides whether a candidate value is content-equal to the held value.
///
/// An `Err` is a hard failure: the hook propagates it and keeps the held
/// value.
pub trait Equivalence<T: ?Sized>: Send + Sync + 'static {
    fn equivalent(&self, held: &T, candidate: &T) -> Result<bool>;
}

/// Equivalence through `PartialEq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialEqual;

impl<T: PartialEq + ?Sized> Equivalence<T> for PartialEqual {
    fn equivalent(&self, held: &T, candidate: &T) -> Result<bool> {
        Ok(held == candidate)
    }
}

/// Equivalence through the serialized structure of both values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Structural;

impl<T: Serialize + ?Sized> Equivalence<T> for Structural {
    fn equivalent(&self, held: &T, candidate: &T) -> Result<bool> {
        structural_eq(held, candidate)
    }
}

/// Equivalence through a caller-supplied predicate.
#[derive(Clone, Copy)]
pub struct ByFn<F>(pub F);

impl<T, F> Equivalence<T> for ByFn<F>
where
    T: ?Sized,
    F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    fn equivalent(&self, held: &T, candidate: &T) -> Result<bool> {
        Ok((self.0)(held, candidate))
    }
}

impl<F> fmt::Debug for ByFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByFn").finish_non_exhaustive()
    }
}

/// Compare two values by their serialized structure.
///
/// Both sides are encoded with `serde_value::to_value`; encoding failures are
/// returned as [`Error::Compare`](crate::Error::Compare).
pub fn structural_eq<T: Serialize + ?Sized>(a: &T, b: &T) -> Result<bool> {
    let a = serde_value::to_value(a)?;
    let b = serde_value::to_value(b)?;
    Ok(a == b)
}
