//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
///
/// Everything here is detected before the first build phase starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),

    #[error("route `{route}` is not served under base path `{base_path}`")]
    InvalidRoute { route: String, base_path: String },

    #[error("route `{0}` is listed more than once")]
    DuplicateRoute(String),

    #[error("routes `{first}` and `{second}` collide at output path `{}`", path.display())]
    OutputCollision {
        path: PathBuf,
        first: String,
        second: String,
    },

    #[error("invalid manifest wait settings: {0}")]
    InvalidBarrier(String),

    #[error("invalid SSR template: {0}")]
    Template(String),
}
