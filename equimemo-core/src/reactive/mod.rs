//! Hook Host
//!
//! This module implements the minimal hook-based reactive host that the memo
//! hooks run on: per-instance hook storage, state, dependency-keyed effects,
//! the native memo, and a test renderer.
//!
//! # Concepts
//!
//! ## Scopes
//!
//! A scope is one mounted component instance. A component is any
//! `FnMut() -> O` that calls hooks; each hook call reads the next slot of the
//! scope's hook storage, so hooks must be called in the same order on every
//! render.
//!
//! ## State
//!
//! `use_state` holds a value across renders. Its setter queues an update that
//! the next flush applies; an update that keeps the current value does not
//! re-render.
//!
//! ## Effects
//!
//! `use_effect` runs a callback after commit whenever its dependency sequence
//! changed. Dependencies compare slot by slot: shared values by reference,
//! scalars by value.
//!
//! ## Memos
//!
//! `use_memo` recomputes a value during render whenever its dependency
//! sequence changed.
//!
//! # Implementation Notes
//!
//! Hooks locate the rendering scope through a thread-local context stack that
//! the renderer pushes before calling the component. There is no global
//! registry: each scope owns everything its hooks create, and dropping the
//! [`RenderHook`] tears it all down.

mod context;
mod deps;
mod effect;
mod harness;
mod id;
mod memo;
mod scope;
mod state;

pub use context::RenderContext;
pub use deps::{Dep, Deps, IntoDep};
pub use effect::{use_effect, use_effect_with_cleanup};
pub use harness::RenderHook;
pub use id::ScopeId;
pub use memo::use_memo;
pub use scope::{generation, is_first_render};
pub use state::{use_state, use_state_with, SetState};

pub(crate) use state::use_state_seeded;
