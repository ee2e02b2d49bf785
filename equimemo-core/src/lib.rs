//! Equimemo Core
//!
//! This crate provides an equality-gated memo hook: a memoized value that is
//! recomputed when its dependencies change but only *published* when the new
//! value differs from the old one by content. Consumers keyed on the result
//! stop firing for recomputations that produce the same data.
//!
//! It also provides the minimal hook host the memo runs on:
//!
//! - Hook storage and the render context
//! - State, dependency-keyed effects, and the native memo
//! - A test renderer that drives render, commit, and flush
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: the hook host and its primitives
//! - `equality`: deep-equality strategies
//! - `memo_result`: the equality-gated memo hooks
//! - `config`: host configuration
//! - `error`: error types
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use equimemo_core::{deps, use_memo_result};
//! use equimemo_core::reactive::{use_effect, use_state, RenderHook};
//!
//! let mut hook = RenderHook::new(|| {
//!     let (words, set_words) = use_state(Arc::new(vec!["b", "a"]));
//!     let count = use_memo_result(
//!         { let words = Arc::clone(&words); move || Arc::new(words.len()) },
//!         deps![&words],
//!     );
//!     use_effect(
//!         { let count = Arc::clone(&count); move || println!("count: {count}") },
//!         deps![&count],
//!     );
//!     set_words
//! })?;
//!
//! // Different words, same count: the effect above does not run again.
//! hook.act(|set_words| set_words.set(Arc::new(vec!["c", "d"])))?;
//! # Ok::<(), equimemo_core::Error>(())
//! ```

pub mod config;
pub mod equality;
pub mod error;
pub mod memo_result;
pub mod reactive;

pub use config::HostConfig;
pub use equality::{structural_eq, ByFn, Equivalence, PartialEqual, Structural};
pub use error::{Error, Result};
pub use memo_result::{use_memo_result, use_memo_result_by, use_memo_result_structural};
