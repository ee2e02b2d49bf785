//! State Hook
//!
//! `use_state` gives a component a value that survives re-renders together
//! with a setter that publishes a new one.
//!
//! # How Updates Flow
//!
//! 1. A setter call never touches the value directly. It queues an updater on
//!    the cell and raises the scope's scheduler flag.
//!
//! 2. The renderer's next flush drains the queue in order. Each updater sees
//!    the value produced by the one before it.
//!
//! 3. An updater may bail out by returning `None`, keeping the current value.
//!    If every updater bails out the component is not re-rendered at all.
//!
//! # Thread Safety
//!
//! Setters are `Send + Sync` and may be moved to other threads or tasks. The
//! queue is protected by a mutex; updaters run with the lock released so an
//! updater may itself call a setter.

use std::fmt::{self, Debug};
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;

use super::context::RenderContext;
use super::scope::{PendingUpdates, Scheduler};

type Updater<T> = Box<dyn FnOnce(&T) -> Result<Option<T>> + Send>;

struct StateInner<T> {
    value: T,
    queue: Vec<Updater<T>>,
}

/// The hook slot behind `use_state`.
pub(crate) struct StateCell<T> {
    inner: Arc<Mutex<StateInner<T>>>,
    scheduler: Scheduler,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> StateCell<T> {
    fn new(value: T, scheduler: Scheduler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StateInner {
                value,
                queue: Vec::new(),
            })),
            scheduler,
        }
    }

    fn get(&self) -> T {
        self.inner.lock().value.clone()
    }

    fn setter(&self) -> SetState<T> {
        SetState {
            inner: Arc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> PendingUpdates for StateCell<T> {
    fn apply_pending(&self) -> Result<bool> {
        let (mut value, queue) = {
            let mut inner = self.inner.lock();
            if inner.queue.is_empty() {
                return Ok(false);
            }
            (inner.value.clone(), std::mem::take(&mut inner.queue))
        };

        // An updater error discards the whole batch for this cell
        let mut changed = false;
        for updater in queue {
            if let Some(next) = updater(&value)? {
                value = next;
                changed = true;
            }
        }

        if changed {
            self.inner.lock().value = value;
        }
        Ok(changed)
    }
}

/// Setter returned by [`use_state`].
///
/// Cloning is cheap; all clones target the same state cell.
pub struct SetState<T> {
    inner: Arc<Mutex<StateInner<T>>>,
    scheduler: Scheduler,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T> SetState<T>
where
    T: Send + 'static,
{
    /// Publish a new value.
    pub fn set(&self, value: T) {
        self.enqueue(Box::new(move |_| Ok(Some(value))));
    }

    /// Publish a value computed from the current one.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T + Send + 'static,
    {
        self.enqueue(Box::new(move |current| Ok(Some(f(current)))));
    }

    /// Publish `Some(next)`, or bail out on `None` and keep the current value.
    pub fn update_if<F>(&self, f: F)
    where
        F: FnOnce(&T) -> Option<T> + Send + 'static,
    {
        self.enqueue(Box::new(move |current| Ok(f(current))));
    }

    /// Fallible [`update_if`](Self::update_if). An error aborts the flush that
    /// applies it and is returned from that flush.
    pub fn try_update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> Result<Option<T>> + Send + 'static,
    {
        self.enqueue(Box::new(f));
    }

    fn enqueue(&self, updater: Updater<T>) {
        if !self.scheduler.is_mounted() {
            // Let the scheduler log the dropped update
            self.scheduler.schedule();
            return;
        }
        self.inner.lock().queue.push(updater);
        self.scheduler.schedule();
        tracing::trace!(scope = %self.scheduler.scope(), "state update queued");
    }
}

impl<T> Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("scope", &self.scheduler.scope())
            .field("pending", &self.inner.lock().queue.len())
            .finish()
    }
}

/// Hold a value across renders.
///
/// Returns the current value and a setter. `initial` is only used on the
/// first render.
#[track_caller]
pub fn use_state<T>(initial: T) -> (T, SetState<T>)
where
    T: Clone + Send + 'static,
{
    use_state_with(move || initial)
}

/// Like [`use_state`], but the initial value is produced lazily.
///
/// `init` runs once, during the first render.
#[track_caller]
pub fn use_state_with<T, I>(init: I) -> (T, SetState<T>)
where
    T: Clone + Send + 'static,
    I: FnOnce() -> T,
{
    let (value, set_value, _) = use_state_seeded(init);
    (value, set_value)
}

/// Like [`use_state_with`], but hands `init` back when the state already
/// existed, so the caller can still run it.
#[track_caller]
pub(crate) fn use_state_seeded<T, I>(init: I) -> (T, SetState<T>, Option<I>)
where
    T: Clone + Send + 'static,
    I: FnOnce() -> T,
{
    let scope = RenderContext::expect_current();
    let (cell, unused) = scope.use_hook_seeded(init, |init| {
        let cell = StateCell::new(init(), scope.scheduler().clone());
        scope.register_state(Rc::new(cell.clone()));
        cell
    });

    (cell.get(), cell.setter(), unused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;
    use crate::error::Error;
    use crate::reactive::scope::ScopeState;

    fn cell(value: i32) -> (ScopeState, StateCell<i32>) {
        let scope = ScopeState::new(&HostConfig::default());
        let cell = StateCell::new(value, scope.scheduler().clone());
        (scope, cell)
    }

    #[test]
    fn set_is_deferred_until_applied() {
        let (scope, cell) = cell(0);
        let set = cell.setter();

        set.set(42);
        assert_eq!(cell.get(), 0);
        assert!(scope.scheduler().take_pending());

        assert!(cell.apply_pending().unwrap());
        assert_eq!(cell.get(), 42);
    }

    #[test]
    fn updaters_apply_in_order() {
        let (_scope, cell) = cell(10);
        let set = cell.setter();

        set.update(|v| v + 5);
        set.update(|v| v * 2);

        assert!(cell.apply_pending().unwrap());
        assert_eq!(cell.get(), 30);
    }

    #[test]
    fn bail_out_reports_no_change() {
        let (_scope, cell) = cell(7);
        let set = cell.setter();

        set.update_if(|_| None);

        assert!(!cell.apply_pending().unwrap());
        assert_eq!(cell.get(), 7);

        // Nothing queued, nothing changed
        assert!(!cell.apply_pending().unwrap());
    }

    #[test]
    fn failed_updater_discards_batch() {
        let (_scope, cell) = cell(1);
        let set = cell.setter();

        set.set(2);
        set.try_update(|_| Err(Error::Equivalence("boom".into())));
        set.set(3);

        assert!(matches!(cell.apply_pending(), Err(Error::Equivalence(_))));
        assert_eq!(cell.get(), 1);
        assert!(!cell.apply_pending().unwrap());
    }

    #[test]
    fn setter_is_ignored_after_unmount() {
        let scope = ScopeState::new(&HostConfig::default().with_unmounted_warnings(false));
        let cell = StateCell::new(0, scope.scheduler().clone());
        let set = cell.setter();

        scope.unmount();
        set.set(5);

        assert!(!cell.apply_pending().unwrap());
        assert_eq!(cell.get(), 0);
    }

    #[test]
    fn setter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SetState<Vec<String>>>();
    }
}
