//! Host Configuration
//!
//! Knobs for the test renderer. The defaults match what hook-based UI hosts
//! usually ship with, so most callers never build one by hand.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Render budget for a single flush. Mirrors the nested-update limit common
/// to hook hosts.
const DEFAULT_RENDER_LIMIT: usize = 50;

/// Configuration for a [`RenderHook`](crate::reactive::RenderHook).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Maximum number of re-renders a single flush may perform before it
    /// fails with [`Error::RenderLimit`](crate::Error::RenderLimit).
    pub render_limit: usize,

    /// Emit a `tracing` warning when a setter targets an unmounted instance.
    pub warn_on_unmounted_updates: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            render_limit: DEFAULT_RENDER_LIMIT,
            warn_on_unmounted_updates: true,
        }
    }
}

impl HostConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Config)
    }

    pub fn with_render_limit(mut self, limit: usize) -> Self {
        self.render_limit = limit;
        self
    }

    pub fn with_unmounted_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_unmounted_updates = enabled;
        self
    }
}
