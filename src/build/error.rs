//! Build error types.

use crate::config::ConfigError;
use std::{path::PathBuf, time::Duration};
use thiserror::Error;

/// Every way a build can end in `Failed`.
///
/// None of these are retried; the first one ends the build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{phase} compilation failed")]
    Compile {
        phase: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("timed out after {elapsed:?} waiting for `{}`", path.display())]
    Timeout { path: PathBuf, elapsed: Duration },

    #[error("failed to render route `{route}`")]
    Render {
        route: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("build aborted")]
    Aborted,
}
