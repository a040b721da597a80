//! Error types.

use thiserror::Error;

/// Error returned by a [`Loader`](crate::tree::Loader) when fetching children fails.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LoadError {
    /// Error message
    pub message: String,
}

impl LoadError {
    /// Create a new load error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<String> for LoadError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for LoadError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Errors surfaced by explicit tree operations.
///
/// Interactive actions (keys, clicks, toggles) never return these; they treat
/// a missing node as a no-op. Only operations the caller asked for directly,
/// such as [`Tree::load`](crate::tree::Tree::load), report them.
#[derive(Debug, Clone, Error)]
pub enum TreeError {
    #[error("node {0} not found")]
    NotFound(String),

    #[error("children of {0} are already loading")]
    AlreadyLoading(String),

    #[error("children of {0} are already loaded")]
    AlreadyLoaded(String),

    #[error("no loader configured")]
    NoLoader,

    /// The tree's items were replaced while the load was in flight.
    #[error("load of {0} was superseded")]
    Superseded(String),

    #[error("failed to load children of {id}: {source}")]
    Load {
        id: String,
        #[source]
        source: LoadError,
    },

    #[error("load task failed: {0}")]
    Join(String),

    #[error("tree state lock poisoned")]
    Poisoned,
}

/// Unknown selection mode name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown selection mode '{0}' (expected single, multiple or multiple-recursive)")]
pub struct ParseSelectionModeError(pub String);

/// Unknown key name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown key '{0}'")]
pub struct ParseKeyError(pub String);
