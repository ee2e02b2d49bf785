//! Scope State
//!
//! A scope is one mounted component instance. It owns:
//!
//! - the ordered hook slots, read back by position on every render
//! - the registry of state cells, so a flush can apply queued updates
//! - the registry of effects, in declaration order, so commit can run them
//! - a [`Scheduler`], the thread-safe flag setters raise to request a flush
//!
//! # Rules of Hooks
//!
//! Slots are matched to hook calls purely by position. A hook called
//! conditionally shifts every slot after it, which surfaces either as a slot
//! type mismatch (a panic in [`ScopeState::use_hook`]) or as a changed hook
//! count ([`Error::HookOrder`] from [`ScopeState::finish_render`]).

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::HostConfig;
use crate::error::{Error, Result};

use super::context::RenderContext;
use super::effect::EffectHandle;
use super::ScopeId;

/// Something holding updates that a flush has to apply.
///
/// Implemented by state cells. `apply_pending` drains the queue and reports
/// whether the published value changed.
pub(crate) trait PendingUpdates {
    fn apply_pending(&self) -> Result<bool>;
}

/// Thread-safe handle used by setters to wake their scope.
#[derive(Clone)]
pub(crate) struct Scheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    scope: ScopeId,
    pending: AtomicBool,
    mounted: AtomicBool,
    warn_on_unmounted: bool,
}

impl Scheduler {
    fn new(scope: ScopeId, config: &HostConfig) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                scope,
                pending: AtomicBool::new(false),
                mounted: AtomicBool::new(true),
                warn_on_unmounted: config.warn_on_unmounted_updates,
            }),
        }
    }

    pub(crate) fn scope(&self) -> ScopeId {
        self.inner.scope
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    /// Request a flush. Returns false if the scope is already unmounted.
    pub(crate) fn schedule(&self) -> bool {
        if !self.is_mounted() {
            if self.inner.warn_on_unmounted {
                tracing::warn!(scope = %self.inner.scope, "state update on an unmounted scope was dropped");
            }
            return false;
        }
        self.inner.pending.store(true, Ordering::SeqCst);
        true
    }

    /// Consume the pending flag.
    pub(crate) fn take_pending(&self) -> bool {
        self.inner.pending.swap(false, Ordering::SeqCst)
    }

    fn unmount(&self) {
        self.inner.mounted.store(false, Ordering::SeqCst);
        self.inner.pending.store(false, Ordering::SeqCst);
    }
}

/// Per-instance hook storage and bookkeeping.
pub(crate) struct ScopeState {
    id: ScopeId,

    /// Hook slots, in call order.
    hooks: RefCell<Vec<Box<dyn Any>>>,

    /// Position of the next hook call in the current render.
    hook_index: Cell<usize>,

    /// Number of hooks the first render called. Every later render must match.
    mounted_hooks: Cell<Option<usize>>,

    /// Number of completed renders.
    generation: Cell<u64>,

    states: RefCell<Vec<Rc<dyn PendingUpdates>>>,
    effects: RefCell<Vec<EffectHandle>>,
    scheduler: Scheduler,
}

impl ScopeState {
    pub(crate) fn new(config: &HostConfig) -> Self {
        let id = ScopeId::new();
        Self {
            id,
            hooks: RefCell::new(Vec::new()),
            hook_index: Cell::new(0),
            mounted_hooks: Cell::new(None),
            generation: Cell::new(0),
            states: RefCell::new(Vec::new()),
            effects: RefCell::new(Vec::new()),
            scheduler: Scheduler::new(id, config),
        }
    }

    pub(crate) fn id(&self) -> ScopeId {
        self.id
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub(crate) fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Store a value between renders. Every other hook is built on this.
    ///
    /// `initializer` runs on the first call at this position; later renders
    /// get a clone of the stored value back.
    #[track_caller]
    pub(crate) fn use_hook<S: Clone + 'static>(&self, initializer: impl FnOnce() -> S) -> S {
        self.use_hook_seeded(initializer, |init| init()).0
    }

    /// Like [`use_hook`](Self::use_hook), with the slot built from `seed`.
    ///
    /// The seed is handed back when the slot already existed, so the caller
    /// can still use it.
    #[track_caller]
    pub(crate) fn use_hook_seeded<S, A>(&self, seed: A, build: impl FnOnce(A) -> S) -> (S, Option<A>)
    where
        S: Clone + 'static,
    {
        let index = self.hook_index.get();
        let mut hooks = self.hooks.try_borrow_mut().expect(
            "the hook list is already borrowed: a hook was called from inside another hook's initializer",
        );

        let unused = if index >= hooks.len() {
            hooks.push(Box::new(build(seed)));
            None
        } else {
            Some(seed)
        };

        let value = hooks
            .get(index)
            .and_then(|slot| {
                self.hook_index.set(index + 1);
                let raw: &dyn Any = slot.as_ref();
                raw.downcast_ref::<S>().cloned()
            })
            .expect(
                "unable to retrieve the hook stored at this position. \
                 Hooks rely on a consistent call order between renders; \
                 never call a hook conditionally or in a loop of varying length.",
            );
        (value, unused)
    }

    pub(crate) fn register_state(&self, cell: Rc<dyn PendingUpdates>) {
        self.states.borrow_mut().push(cell);
    }

    pub(crate) fn register_effect(&self, effect: EffectHandle) {
        self.effects.borrow_mut().push(effect);
    }

    pub(crate) fn begin_render(&self) {
        self.hook_index.set(0);
    }

    /// Close a render, checking the hook count against the first render.
    pub(crate) fn finish_render(&self) -> Result<()> {
        let found = self.hook_index.get();
        match self.mounted_hooks.get() {
            None => self.mounted_hooks.set(Some(found)),
            Some(expected) if expected != found => {
                return Err(Error::HookOrder {
                    scope: self.id,
                    expected,
                    found,
                });
            }
            Some(_) => {}
        }

        self.generation.set(self.generation.get() + 1);
        Ok(())
    }

    /// Apply every queued state update.
    ///
    /// Returns whether any value changed, along with the first updater error.
    /// A failing cell does not stop the cells registered after it.
    pub(crate) fn apply_pending_updates(&self) -> (bool, Result<()>) {
        let states: Vec<_> = self.states.borrow().iter().cloned().collect();

        let mut changed = false;
        let mut outcome = Ok(());
        for state in states {
            match state.apply_pending() {
                Ok(applied) => changed |= applied,
                Err(err) => {
                    tracing::debug!(scope = %self.id, error = %err, "state update failed");
                    if outcome.is_ok() {
                        outcome = Err(err);
                    }
                }
            }
        }
        (changed, outcome)
    }

    /// Run every effect whose dependencies changed in the last render.
    pub(crate) fn commit(&self) {
        let effects: Vec<_> = self.effects.borrow().iter().cloned().collect();

        for effect in effects {
            effect.flush(self.id);
        }
    }

    /// Tear the scope down: run effect cleanups and drop all hook state.
    pub(crate) fn unmount(&self) {
        self.scheduler.unmount();

        let effects = std::mem::take(&mut *self.effects.borrow_mut());
        for effect in &effects {
            effect.dispose();
        }

        self.states.borrow_mut().clear();
        let hooks = std::mem::take(&mut *self.hooks.borrow_mut());
        drop(hooks);

        tracing::trace!(scope = %self.id, "scope unmounted");
    }
}

/// Get the number of completed renders of the component currently rendering.
///
/// This is `0` during the first render.
#[track_caller]
pub fn generation() -> u64 {
    RenderContext::expect_current().generation()
}

/// Check whether the component currently rendering is on its first render.
#[track_caller]
pub fn is_first_render() -> bool {
    generation() == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_hook_initializes_once_per_position() {
        let scope = ScopeState::new(&HostConfig::default());

        scope.begin_render();
        assert_eq!(scope.use_hook(|| 1), 1);
        assert_eq!(scope.use_hook(|| "two"), "two");
        scope.finish_render().unwrap();

        // Initializers are ignored once the slots exist
        scope.begin_render();
        assert_eq!(scope.use_hook(|| 10), 1);
        assert_eq!(scope.use_hook(|| "twenty"), "two");
        scope.finish_render().unwrap();

        assert_eq!(scope.generation(), 2);
    }

    #[test]
    fn use_hook_seeded_returns_unused_seed() {
        let scope = ScopeState::new(&HostConfig::default());

        scope.begin_render();
        let (value, unused) = scope.use_hook_seeded(3_u32, |n| n * 2);
        assert_eq!((value, unused), (6, None));
        scope.finish_render().unwrap();

        scope.begin_render();
        let (value, unused) = scope.use_hook_seeded(5_u32, |n| n * 2);
        assert_eq!((value, unused), (6, Some(5)));
        scope.finish_render().unwrap();
    }

    #[test]
    #[should_panic(expected = "consistent call order")]
    fn use_hook_panics_on_type_mismatch() {
        let scope = ScopeState::new(&HostConfig::default());

        scope.begin_render();
        scope.use_hook(|| 1_u32);
        scope.finish_render().unwrap();

        scope.begin_render();
        scope.use_hook(|| String::from("not a u32"));
    }

    #[test]
    fn finish_render_detects_changed_hook_count() {
        let scope = ScopeState::new(&HostConfig::default());

        scope.begin_render();
        scope.use_hook(|| 1);
        scope.use_hook(|| 2);
        scope.finish_render().unwrap();

        scope.begin_render();
        scope.use_hook(|| 1);
        let err = scope.finish_render().unwrap_err();

        assert!(matches!(
            err,
            Error::HookOrder {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn scheduler_sets_and_consumes_pending() {
        let scope = ScopeState::new(&HostConfig::default());
        let scheduler = scope.scheduler().clone();

        assert!(!scheduler.take_pending());
        assert!(scheduler.schedule());
        assert!(scheduler.take_pending());
        assert!(!scheduler.take_pending());
    }

    #[test]
    fn scheduler_refuses_after_unmount() {
        let scope = ScopeState::new(&HostConfig::default().with_unmounted_warnings(false));
        let scheduler = scope.scheduler().clone();

        scope.unmount();

        assert!(!scheduler.is_mounted());
        assert!(!scheduler.schedule());
        assert!(!scheduler.take_pending());
    }
}
