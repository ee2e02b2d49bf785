//! Equality-Gated Memo
//!
//! [`use_memo_result`] is a drop-in replacement for
//! [`use_memo`](crate::reactive::use_memo) with one refinement: when the
//! dependencies change but the recomputed value is deep-equal to the value it
//! already holds, the held value is kept. Consumers keyed on the result by
//! reference (an effect with `deps![&result]`, say) do not fire, and the
//! component is not re-rendered for it.
//!
//! # How It Works
//!
//! The hook composes two host primitives:
//!
//! 1. A state cell holds the published value. The render that creates it
//!    seeds it by calling the factory once.
//!
//! 2. An effect keyed on the caller's dependency sequence runs the factory
//!    after every commit whose dependencies changed, then queues an update on
//!    the state cell.
//!
//! 3. When the update is applied, the candidate is compared with the held
//!    value. If they differ the candidate is published; otherwise the update
//!    bails out and the candidate is dropped.
//!
//! Because the published value only changes on the update after a commit,
//! the render that observes new dependencies still returns the old value; the
//! follow-up render returns the new one.

use serde::Serialize;

use crate::equality::{Equivalence, PartialEqual, Structural};
use crate::reactive::{use_effect, use_state_seeded, Deps};

/// Memoize `factory()` on `deps`, publishing a new value only when it is not
/// `PartialEq`-equal to the held one.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use equimemo_core::{deps, use_memo_result, reactive::{use_state, RenderHook}};
///
/// let mut hook = RenderHook::new(|| {
///     let (ids, set_ids) = use_state(Arc::new(vec![3_u32, 1, 2]));
///     let sorted = use_memo_result(
///         { let ids = Arc::clone(&ids); move || { let mut v = (*ids).clone(); v.sort(); Arc::new(v) } },
///         deps![&ids],
///     );
///     (sorted, set_ids)
/// })?;
///
/// let before = Arc::clone(&hook.result().0);
/// hook.act(|(_, set_ids)| set_ids.set(Arc::new(vec![2, 3, 1])))?;
///
/// // Same sorted content: the held value was kept.
/// assert!(Arc::ptr_eq(&before, &hook.result().0));
/// # Ok::<(), equimemo_core::Error>(())
/// ```
#[track_caller]
pub fn use_memo_result<T, F>(factory: F, deps: Deps) -> T
where
    T: Clone + PartialEq + Send + 'static,
    F: FnOnce() -> T + 'static,
{
    use_memo_result_by(factory, deps, PartialEqual)
}

/// Memoize `factory()` on `deps`, comparing by serialized structure.
///
/// A value that cannot be serialized makes the flush fail with
/// [`Error::Compare`](crate::Error::Compare); the held value is kept.
#[track_caller]
pub fn use_memo_result_structural<T, F>(factory: F, deps: Deps) -> T
where
    T: Clone + Serialize + Send + 'static,
    F: FnOnce() -> T + 'static,
{
    use_memo_result_by(factory, deps, Structural)
}

/// Memoize `factory()` on `deps`, comparing with `equivalence`.
#[track_caller]
pub fn use_memo_result_by<T, F, E>(factory: F, deps: Deps, equivalence: E) -> T
where
    T: Clone + Send + 'static,
    F: FnOnce() -> T + 'static,
    E: Equivalence<T>,
{
    // The factory seeds the held value when this hook's state is created,
    // and is handed back on every later render.
    let (held, set_held, factory) = use_state_seeded(factory);
    let Some(factory) = factory else {
        // The effect only records the dependencies; the factory already ran
        // for them.
        use_effect(|| {}, deps);
        return held;
    };

    use_effect(
        move || {
            let candidate = factory();
            set_held.try_update(move |current| {
                if equivalence.equivalent(current, &candidate)? {
                    tracing::trace!("memo result unchanged, keeping held value");
                    Ok(None)
                } else {
                    tracing::trace!("memo result changed, publishing");
                    Ok(Some(candidate))
                }
            });
        },
        deps,
    );

    held
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps;
    use crate::equality::ByFn;
    use crate::error::Error;
    use crate::reactive::{use_state, RenderHook};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn mount_invokes_factory_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        let hook = RenderHook::new(move || {
            let counted = Arc::clone(&counted);
            use_memo_result(
                move || {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Arc::new(Vec::<String>::new())
                },
                deps![],
            )
        })
        .unwrap();

        assert!(hook.result().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(hook.render_count(), 1);
    }

    #[test]
    fn changed_content_is_published_on_follow_up_render() {
        let mut hook = RenderHook::new(|| {
            let (n, set_n) = use_state(1_u32);
            let doubled = use_memo_result(move || n * 2, deps![n]);
            (doubled, set_n)
        })
        .unwrap();
        assert_eq!(hook.result().0, 2);

        hook.act(|(_, set_n)| set_n.set(5)).unwrap();
        assert_eq!(hook.result().0, 10);
        // One render for the new input, one for the new result
        assert_eq!(hook.render_count(), 3);
    }

    #[test]
    fn equal_content_does_not_render_again() {
        let mut hook = RenderHook::new(|| {
            let (n, set_n) = use_state(4_i32);
            let parity = use_memo_result(move || n % 2 == 0, deps![n]);
            (parity, set_n)
        })
        .unwrap();

        hook.act(|(_, set_n)| set_n.set(6)).unwrap();
        assert!(hook.result().0);
        // Only the render for the new input
        assert_eq!(hook.render_count(), 2);
    }

    #[test]
    fn conditional_call_reports_hook_order() {
        let mut hook = RenderHook::new(|| {
            let (extra, set_extra) = use_state(false);
            if extra {
                use_memo_result(|| 1_u8, deps![]);
            }
            set_extra
        })
        .unwrap();

        let err = hook.act(|set_extra| set_extra.set(true)).unwrap_err();
        assert!(matches!(
            err,
            Error::HookOrder {
                expected: 1,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn custom_equivalence() {
        let mut hook = RenderHook::new(|| {
            let (name, set_name) = use_state(String::from("Name"));
            let label = use_memo_result_by(
                {
                    let name = name.clone();
                    move || Arc::new(name)
                },
                deps![name.clone()],
                ByFn(|a: &Arc<String>, b: &Arc<String>| a.eq_ignore_ascii_case(b)),
            );
            (label, set_name)
        })
        .unwrap();

        let before = Arc::clone(&hook.result().0);
        hook.act(|(_, set_name)| set_name.set(String::from("NAME"))).unwrap();

        assert!(Arc::ptr_eq(&before, &hook.result().0));
        assert_eq!(hook.result().0.as_str(), "Name");
    }
}
