//! Memo Hook
//!
//! `use_memo` caches a value computed during render and recomputes it only
//! when its dependency sequence changed.
//!
//! # How Memos Work
//!
//! 1. On the first render the factory runs and its result is cached together
//!    with the dependency sequence.
//!
//! 2. On later renders, if every dependency slot is the same as last time,
//!    the cached value is returned and the factory is dropped unused.
//!
//! 3. Otherwise the factory runs and its result replaces the cache, whether or
//!    not it is equal to the previous value. Consumers keyed on the result see
//!    a new value every time the dependencies change.
//!
//! See [`use_memo_result`](crate::use_memo_result) for the variant that keeps
//! the previous value when the recomputed one is equal to it.

use std::cell::RefCell;
use std::rc::Rc;

use super::context::RenderContext;
use super::deps::Deps;

struct MemoSlot<T> {
    deps: Deps,
    value: T,
}

type MemoHandle<T> = Rc<RefCell<Option<MemoSlot<T>>>>;

/// Memoize `factory()` until `deps` changes.
///
/// The factory runs during render, synchronously. A panic in it unwinds
/// through the render.
#[track_caller]
pub fn use_memo<T, F>(factory: F, deps: Deps) -> T
where
    T: Clone + 'static,
    F: FnOnce() -> T,
{
    let scope = RenderContext::expect_current();
    let slot: MemoHandle<T> = scope.use_hook(|| Rc::new(RefCell::new(None)));

    let cached = match &*slot.borrow() {
        Some(memo) if !deps.changed_since(&memo.deps) => Some(memo.value.clone()),
        _ => None,
    };
    if let Some(value) = cached {
        return value;
    }

    let value = factory();
    tracing::trace!(scope = %scope.id(), "memo recomputed");
    *slot.borrow_mut() = Some(MemoSlot {
        deps,
        value: value.clone(),
    });
    value
}
