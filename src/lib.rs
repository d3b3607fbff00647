//! `bpctl` - Bluray Poster control panel
//!
//! Client for a single Bluray Poster service: start, stop and reload it, edit its
//! configuration text, and follow its log as it is written.
//!
//! # Layers
//! - [`gateway`]: HTTP/JSON calls and the server-sent events connection
//! - [`stream`]: the live log channel and its single-owner [`stream::LogFeed`]
//! - [`buffer`]: bounded log storage with a separate display order
//! - [`orchestrator`]: busy/saving flags, transient messages, status refresh
//! - [`layout`]: panel heights that keep the scrollable panes inside the viewport
//! - `tui`: the interactive panel (feature `tui`)

pub mod buffer;
pub mod cli;
pub mod commands;
pub mod config;
pub mod gateway;
pub mod layout;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod stream;
pub mod style;
pub mod transient;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
pub(crate) mod test_utils;

/// Build-time information (version, git commit, target)
#[allow(dead_code, clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Version with the short git commit when built from a checkout
#[must_use]
pub fn version_string() -> String {
    match built_info::GIT_COMMIT_HASH_SHORT {
        Some(hash) => format!("v{} ({hash})", built_info::PKG_VERSION),
        None => format!("v{}", built_info::PKG_VERSION),
    }
}

// Re-export commonly used types for convenience
pub use cli::Args;
pub use config::Config;
pub use gateway::{GatewayError, HttpGateway};
pub use orchestrator::Orchestrator;
