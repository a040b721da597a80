use arbor::error::{ParseKeyError, TreeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid tree file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid script step '{step}': {source}")]
    Step {
        step: String,
        #[source]
        source: ParseKeyError,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),
}
