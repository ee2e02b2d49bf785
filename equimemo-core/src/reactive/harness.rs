//! Test Renderer
//!
//! [`RenderHook`] mounts a single component (any `FnMut() -> O` that calls
//! hooks) and drives its render/commit cycle. It is the host the hooks in this
//! crate run on, shaped after `renderHook` + `act` from hook testing
//! libraries.
//!
//! # The Cycle
//!
//! 1. **Render**: the component runs inside a [`RenderContext`]. Hooks read
//!    their slots and stage effects.
//!
//! 2. **Commit**: staged effects run in declaration order. They may queue
//!    state updates.
//!
//! 3. **Flush**: while updates are pending, apply them; if any value changed,
//!    render and commit again. Updates that all bail out end the flush
//!    without a render. An updater error ends the flush after the other
//!    cells' updates have been applied and rendered; updates queued by that
//!    render stay pending for the next flush.
//!
//! Mounting performs render + commit + flush. [`RenderHook::act`] runs a
//! closure and then flushes.

use std::rc::Rc;

use crate::config::HostConfig;
use crate::error::{Error, Result};

use super::context::RenderContext;
use super::scope::ScopeState;
use super::ScopeId;

/// A mounted component instance.
///
/// The component is unmounted (effect cleanups run, setters go inert) when
/// this value is dropped.
pub struct RenderHook<O> {
    scope: Rc<ScopeState>,
    component: Box<dyn FnMut() -> O>,
    output: O,
    config: HostConfig,
    renders: usize,
}

impl<O> RenderHook<O> {
    /// Mount `component` with the default configuration.
    pub fn new<C>(component: C) -> Result<Self>
    where
        C: FnMut() -> O + 'static,
    {
        Self::with_config(component, HostConfig::default())
    }

    /// Mount `component`.
    ///
    /// Errors from the first flush are returned and the instance is
    /// unmounted.
    pub fn with_config<C>(component: C, config: HostConfig) -> Result<Self>
    where
        C: FnMut() -> O + 'static,
    {
        let scope = Rc::new(ScopeState::new(&config));
        let mut component: Box<dyn FnMut() -> O> = Box::new(component);

        tracing::debug!(scope = %scope.id(), "mounting");
        let output = render_once(&scope, &mut *component)?;

        let mut hook = Self {
            scope,
            component,
            output,
            config,
            renders: 1,
        };
        hook.scope.commit();
        hook.flush()?;
        Ok(hook)
    }

    /// The output of the latest render.
    pub fn result(&self) -> &O {
        &self.output
    }

    pub fn scope_id(&self) -> ScopeId {
        self.scope.id()
    }

    /// Number of renders performed since mount, the mount render included.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Run `f` against the latest output, then flush the updates it queued.
    pub fn act<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&O) -> R,
    {
        let value = f(&self.output);
        self.flush()?;
        Ok(value)
    }

    /// Render and commit again even if no state changed, then flush.
    pub fn rerender(&mut self) -> Result<()> {
        self.render_and_commit()?;
        self.flush()
    }

    /// Unmount the component: run effect cleanups and drop hook state.
    pub fn unmount(self) {
        // Drop does the work
    }

    fn render_and_commit(&mut self) -> Result<()> {
        self.output = render_once(&self.scope, &mut *self.component)?;
        self.renders += 1;
        self.scope.commit();
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let scope = self.scope.id();
        let mut renders = 0;

        while self.scope.scheduler().take_pending() {
            // A failed updater still lets the other cells' updates render
            let (changed, outcome) = self.scope.apply_pending_updates();
            if !changed {
                outcome?;
                tracing::trace!(%scope, "all updates bailed out");
                continue;
            }

            renders += 1;
            if renders > self.config.render_limit {
                return Err(Error::RenderLimit {
                    scope,
                    limit: self.config.render_limit,
                });
            }
            self.render_and_commit()?;
            outcome?;
        }

        tracing::debug!(%scope, renders, "flush settled");
        Ok(())
    }
}

impl<O> Drop for RenderHook<O> {
    fn drop(&mut self) {
        self.scope.unmount();
    }
}

impl<O: std::fmt::Debug> std::fmt::Debug for RenderHook<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderHook")
            .field("scope", &self.scope.id())
            .field("renders", &self.renders)
            .field("output", &self.output)
            .finish()
    }
}

fn render_once<O>(scope: &Rc<ScopeState>, component: &mut dyn FnMut() -> O) -> Result<O> {
    let _ctx = RenderContext::enter(Rc::clone(scope));
    scope.begin_render();
    let output = component();
    scope.finish_render()?;
    tracing::trace!(scope = %scope.id(), generation = scope.generation(), "rendered");
    Ok(output)
}
