//! Route to output path mapping.
//!
//! Turns a logical route into the file it is written to, relative to the
//! output directory.
//!
//! | Route                | Base     | Policy     | Output                   |
//! |----------------------|----------|------------|--------------------------|
//! | `/`                  | any      | any        | `index.html`             |
//! | `/docs/intro`        | `/`      | `always`   | `docs/intro/index.html`  |
//! | `/docs/intro/`       | `/`      | `never`    | `docs/intro.html`        |
//! | `/docs/intro/`       | `/`      | `preserve` | `docs/intro/index.html`  |
//! | `/docs/intro`        | `/`      | `preserve` | `docs/intro.html`        |
//! | `/docs/install.html` | `/`      | any        | `docs/install.html`      |
//! | `/docs/intro`        | `/docs/` | `always`   | `intro/index.html`       |
//! | `/docs/`             | `/docs/` | any        | `index.html`             |

use crate::config::{ConfigError, TrailingSlash};
use std::path::PathBuf;

/// File name used for directory-form output.
pub const INDEX_FILE: &str = "index.html";

/// A route with its lookup key and output path, computed once per build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRoute {
    /// Route as configured, passed to the renderer.
    pub route: String,
    /// Route with the base path replaced by `/`.
    pub key: String,
    /// Output file, relative to the output root.
    pub output: PathBuf,
}

impl MappedRoute {
    pub fn new(route: &str, base_path: &str, policy: TrailingSlash) -> Self {
        Self {
            route: route.to_owned(),
            key: route_key(route, base_path),
            output: map_route(route, base_path, policy),
        }
    }
}

/// Compute the output file for `route`, relative to the output root.
///
/// Routes whose last segment carries an extension are kept as-is; everything
/// else follows `policy`. An empty remainder (the root, or a route equal to
/// the base path) always maps to `index.html`.
pub fn map_route(route: &str, base_path: &str, policy: TrailingSlash) -> PathBuf {
    let relative = strip_base(route, base_path).trim_start_matches('/');

    if relative.is_empty() {
        return PathBuf::from(INDEX_FILE);
    }
    if has_extension(relative) {
        return PathBuf::from(relative);
    }

    let directory_form = match policy {
        TrailingSlash::Always => true,
        TrailingSlash::Never => false,
        TrailingSlash::Preserve => route.ends_with('/'),
    };

    let relative = relative.trim_end_matches('/');
    if directory_form {
        PathBuf::from(relative).join(INDEX_FILE)
    } else {
        PathBuf::from(format!("{relative}.html"))
    }
}

/// Key used to look up a route's render entry: the route with its base path
/// swapped for a single `/`.
pub fn route_key(route: &str, base_path: &str) -> String {
    if base_path == "/" {
        return route.to_owned();
    }
    format!("/{}", strip_base(route, base_path).trim_start_matches('/'))
}

/// Strip the leading base path once. `/` strips nothing.
///
/// A route equal to the base path without its trailing slash (`/docs` under
/// `/docs/`) strips to the empty path.
fn strip_base<'a>(route: &'a str, base_path: &str) -> &'a str {
    if base_path == "/" {
        return route;
    }
    if let Some(rest) = route.strip_prefix(base_path) {
        rest
    } else if route == base_path.trim_end_matches('/') {
        ""
    } else {
        route
    }
}

/// Whether the final path segment contains a dot.
fn has_extension(relative: &str) -> bool {
    relative
        .rsplit('/')
        .next()
        .is_some_and(|segment| segment.contains('.'))
}

/// Check that `route` is served under `base_path` and maps inside the
/// output root: no `.` or `..` segment may follow the base path.
pub fn validate_route(route: &str, base_path: &str) -> Result<(), ConfigError> {
    let under_base = route == "/"
        || route.starts_with(base_path)
        || route == base_path.trim_end_matches('/');
    let escapes = strip_base(route, base_path)
        .split('/')
        .any(|segment| segment == "." || segment == "..");

    if under_base && route.starts_with('/') && !escapes {
        Ok(())
    } else {
        Err(ConfigError::InvalidRoute {
            route: route.to_owned(),
            base_path: base_path.to_owned(),
        })
    }
}

/// Normalize a configured base path so it starts and ends with `/`.
///
/// `""`, `"/"` → `/`; `docs` → `/docs/`; `/docs` → `/docs/`.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".into()
    } else {
        format!("/{trimmed}/")
    }
}

// ============================================================================
// Tests
// ============================================================================
