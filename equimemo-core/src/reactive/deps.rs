//! Dependency Sequences
//!
//! Effects and memos are keyed on an ordered sequence of dependencies that the
//! caller rebuilds on every render. After each render the new sequence is
//! compared slot by slot with the previous one; if any slot differs the
//! effect re-runs (or the memo recomputes).
//!
//! # Slot Comparison
//!
//! - Shared values (`Arc<T>`, `Option<Arc<T>>`) compare **by reference**.
//!   Two different allocations holding equal contents are different
//!   dependencies; re-supplying the same `Arc` is not a change.
//! - Scalars (`bool`, `char`, integers, `&'static str`, `String`) compare
//!   by value.
//! - Slots of different types never compare as the same, and a sequence whose
//!   length changed is always a change.
//!
//! Use the [`deps!`](crate::deps) macro to build a sequence:
//!
//! ```rust
//! use std::sync::Arc;
//! use equimemo_core::deps;
//!
//! let rows = Arc::new(vec![1, 2, 3]);
//! let page = 2_u32;
//! let deps = deps![&rows, page];
//! assert_eq!(deps.len(), 2);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

/// How a slot compares against its predecessor. Shown in `Debug` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepKind {
    /// Compared by allocation identity.
    Identity,
    /// Compared by value.
    Value,
}

/// One slot of a dependency sequence.
pub struct Dep {
    value: Box<dyn Any + Send + Sync>,
    same: fn(&dyn Any, &dyn Any) -> bool,
    kind: DepKind,
}

impl Dep {
    /// A slot that compares by reference to the shared allocation.
    ///
    /// The slot keeps the `Arc` alive, so a freed allocation can never be
    /// mistaken for the same dependency.
    pub fn identity<T>(value: &Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            value: Box::new(Arc::clone(value)),
            same: same_identity::<T>,
            kind: DepKind::Identity,
        }
    }

    /// A slot holding an optional shared value, compared by reference.
    ///
    /// Two `None`s are the same; `None` and `Some` never are.
    pub fn optional<T>(value: Option<&Arc<T>>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            value: Box::new(value.cloned()),
            same: same_optional_identity::<T>,
            kind: DepKind::Identity,
        }
    }

    /// A slot that compares by value.
    pub fn value<T>(value: T) -> Self
    where
        T: PartialEq + Send + Sync + 'static,
    {
        Self {
            value: Box::new(value),
            same: same_value::<T>,
            kind: DepKind::Value,
        }
    }

    /// Check whether this slot is the same dependency as `previous`.
    pub fn is_same(&self, previous: &Dep) -> bool {
        (self.same)(self.value.as_ref(), previous.value.as_ref())
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep").field("kind", &self.kind).finish()
    }
}

fn same_identity<T: ?Sized + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<Arc<T>>(), b.downcast_ref::<Arc<T>>()) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

fn same_optional_identity<T: ?Sized + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    match (
        a.downcast_ref::<Option<Arc<T>>>(),
        b.downcast_ref::<Option<Arc<T>>>(),
    ) {
        (Some(Some(a)), Some(Some(b))) => Arc::ptr_eq(a, b),
        (Some(None), Some(None)) => true,
        _ => false,
    }
}

fn same_value<T: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Conversion into a dependency slot.
///
/// Implemented for shared values (compared by reference) and scalars
/// (compared by value). Wrap anything else in an `Arc` first.
pub trait IntoDep {
    fn into_dep(self) -> Dep;
}

impl IntoDep for Dep {
    fn into_dep(self) -> Dep {
        self
    }
}

impl<T: ?Sized + Send + Sync + 'static> IntoDep for Arc<T> {
    fn into_dep(self) -> Dep {
        Dep::identity(&self)
    }
}

impl<T: ?Sized + Send + Sync + 'static> IntoDep for &Arc<T> {
    fn into_dep(self) -> Dep {
        Dep::identity(self)
    }
}

impl<T: ?Sized + Send + Sync + 'static> IntoDep for Option<Arc<T>> {
    fn into_dep(self) -> Dep {
        Dep::optional(self.as_ref())
    }
}

impl<T: ?Sized + Send + Sync + 'static> IntoDep for &Option<Arc<T>> {
    fn into_dep(self) -> Dep {
        Dep::optional(self.as_ref())
    }
}

macro_rules! value_deps {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoDep for $ty {
                fn into_dep(self) -> Dep {
                    Dep::value(self)
                }
            }

            impl IntoDep for &$ty {
                fn into_dep(self) -> Dep {
                    Dep::value(self.clone())
                }
            }
        )*
    };
}

value_deps!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
    &'static str, String,
);

/// An ordered dependency sequence.
///
/// Most sequences are short, so up to four slots live inline.
#[derive(Debug, Default)]
pub struct Deps(SmallVec<[Dep; 4]>);

impl Deps {
    /// An empty sequence. Keyed on nothing, an effect runs once after mount.
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    pub fn push(&mut self, dep: impl IntoDep) {
        self.0.push(dep.into_dep());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check whether this sequence differs from `previous` in any slot.
    pub fn changed_since(&self, previous: &Deps) -> bool {
        self.0.len() != previous.0.len()
            || self
                .0
                .iter()
                .zip(previous.0.iter())
                .any(|(next, prev)| !next.is_same(prev))
    }
}

impl FromIterator<Dep> for Deps {
    fn from_iter<I: IntoIterator<Item = Dep>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build a [`Deps`] sequence from a list of dependencies.
///
/// Each element goes through [`IntoDep`], so `&Arc<T>` compares by reference
/// and scalars compare by value.
#[macro_export]
macro_rules! deps {
    () => {
        $crate::reactive::Deps::new()
    };
    ($($dep:expr),+ $(,)?) => {{
        let mut deps = $crate::reactive::Deps::new();
        $(deps.push($dep);)+
        deps
    }};
}
