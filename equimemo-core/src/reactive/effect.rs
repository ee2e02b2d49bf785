//! Effect Hook
//!
//! An effect is a side-effecting callback keyed on a dependency sequence.
//!
//! # How Effects Work
//!
//! 1. During render, `use_effect` compares the new dependency sequence with
//!    the one from the previous render. On the first render, or when any slot
//!    changed, the callback is staged.
//!
//! 2. After the render completes, the renderer commits: every staged effect
//!    runs, in declaration order.
//!
//! 3. Before an effect re-runs, the cleanup returned by its previous run (if
//!    any) is called. All outstanding cleanups run when the scope unmounts.
//!
//! # Differences from Memo
//!
//! - Memos return a value; effects do not.
//! - Memos run during render; effects run after it, so they may call setters
//!   freely.

use std::cell::RefCell;
use std::rc::Rc;

use super::context::RenderContext;
use super::deps::Deps;
use super::ScopeId;

type Cleanup = Box<dyn FnOnce()>;
type EffectFn = Box<dyn FnOnce() -> Option<Cleanup>>;

struct EffectSlot {
    /// Dependencies of the last staged run.
    deps: Option<Deps>,

    /// Callback staged by the latest render, waiting for commit.
    pending: Option<EffectFn>,

    /// Cleanup returned by the last run.
    cleanup: Option<Cleanup>,

    /// Number of times the effect has run.
    run_count: usize,

    disposed: bool,
}

/// Shared handle to an effect's hook slot.
#[derive(Clone)]
pub(crate) struct EffectHandle(Rc<RefCell<EffectSlot>>);

impl EffectHandle {
    fn new() -> Self {
        Self(Rc::new(RefCell::new(EffectSlot {
            deps: None,
            pending: None,
            cleanup: None,
            run_count: 0,
            disposed: false,
        })))
    }

    /// Stage `run` for the next commit if `deps` changed since the last render.
    fn stage(&self, deps: Deps, run: EffectFn) -> bool {
        let mut slot = self.0.borrow_mut();
        let changed = slot
            .deps
            .as_ref()
            .map_or(true, |previous| deps.changed_since(previous));

        if changed {
            slot.deps = Some(deps);
            slot.pending = Some(run);
        }
        changed
    }

    /// Run the staged callback, if any. Called by commit.
    pub(crate) fn flush(&self, scope: ScopeId) {
        let (run, cleanup) = {
            let mut slot = self.0.borrow_mut();
            if slot.disposed {
                return;
            }
            match slot.pending.take() {
                Some(run) => (run, slot.cleanup.take()),
                None => return,
            }
        };

        // User code runs without the slot borrowed
        if let Some(cleanup) = cleanup {
            cleanup();
        }
        let cleanup = run();

        let mut slot = self.0.borrow_mut();
        slot.cleanup = cleanup;
        slot.run_count += 1;
        tracing::trace!(%scope, run_count = slot.run_count, "effect ran");
    }

    /// Run the outstanding cleanup and stop the effect for good.
    pub(crate) fn dispose(&self) {
        let cleanup = {
            let mut slot = self.0.borrow_mut();
            slot.disposed = true;
            slot.pending = None;
            slot.cleanup.take()
        };

        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }
}

/// Run `effect` after commit whenever `deps` changed since the last render.
///
/// The effect always runs after the first render. With an empty sequence it
/// runs exactly once.
#[track_caller]
pub fn use_effect<F>(effect: F, deps: Deps)
where
    F: FnOnce() + 'static,
{
    stage_effect(
        Box::new(move || {
            effect();
            None
        }),
        deps,
    );
}

/// Like [`use_effect`], but the effect returns a cleanup.
///
/// The cleanup runs before the effect runs again and when the component
/// unmounts.
#[track_caller]
pub fn use_effect_with_cleanup<F, C>(effect: F, deps: Deps)
where
    F: FnOnce() -> C + 'static,
    C: FnOnce() + 'static,
{
    stage_effect(
        Box::new(move || Some(Box::new(effect()) as Cleanup)),
        deps,
    );
}

#[track_caller]
fn stage_effect(run: EffectFn, deps: Deps) {
    let scope = RenderContext::expect_current();
    let handle = scope.use_hook(|| {
        let handle = EffectHandle::new();
        scope.register_effect(handle.clone());
        handle
    });

    if handle.stage(deps, run) {
        tracing::trace!(scope = %scope.id(), deps = ?handle.0.borrow().deps, "effect staged");
    }
}
