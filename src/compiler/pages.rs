//! Render every route and write its document.
//!
//! # Flow
//!
//! ```text
//! routes ──par_iter──► render_route() ──► compose ──► write_page()
//!                            │                             │
//!                            └──── RouteMetadata ◄─────────┘
//!                                        │
//!              collect (input order) ──► AggregatedMetadata::insert()
//! ```
//!
//! Workers share nothing mutable. Results come back in input order and a
//! single loop merges them, so the metadata never depends on scheduling.

use super::meta::{AggregatedMetadata, RenderResult, RouteMetadata};
use super::renderer::Renderer;
use super::template::SsrTemplate;
use crate::build::BuildError;
use crate::utils::{abort::AbortSignal, route::MappedRoute};
use rayon::prelude::*;
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

/// Suffix of the staging file a page is written to before being renamed.
const STAGING_SUFFIX: &str = ".prerender-tmp";

/// Render one route, attributing any failure to it.
pub fn render_route<R>(route: &str, renderer: &R) -> Result<RenderResult, BuildError>
where
    R: Renderer + ?Sized,
{
    renderer
        .render(route)
        .map(RenderResult::from)
        .map_err(|source| BuildError::Render {
            route: route.to_owned(),
            source,
        })
}

/// Render all routes into `output_root` and collect their metadata.
///
/// The earliest failing route in input order fails the whole pass. Routes
/// after a known failure are skipped, but every route before it is still
/// rendered, so which error is reported never depends on scheduling. Files
/// already written stay where they are.
pub fn render_all<R>(
    routes: &[MappedRoute],
    renderer: &R,
    template: Option<&SsrTemplate>,
    output_root: &Path,
    abort: &AbortSignal,
    on_progress: impl Fn() + Sync,
) -> Result<AggregatedMetadata, BuildError>
where
    R: Renderer + ?Sized,
{
    // Index of the earliest failed route seen so far.
    let first_failure = AtomicUsize::new(usize::MAX);

    // `None` marks a route skipped because an earlier one already failed.
    let outcomes: Vec<Option<Result<RouteMetadata, BuildError>>> = routes
        .par_iter()
        .enumerate()
        .map(|(index, mapped)| {
            if index > first_failure.load(Ordering::Relaxed) {
                return None;
            }
            if abort.is_raised() {
                return Some(Err(BuildError::Aborted));
            }

            let outcome = render_page(mapped, renderer, template, output_root);
            if outcome.is_err() {
                first_failure.fetch_min(index, Ordering::Relaxed);
            }
            on_progress();
            Some(outcome)
        })
        .collect();

    let mut metadata = AggregatedMetadata::default();
    for outcome in outcomes.into_iter().flatten() {
        metadata.insert(outcome?);
    }
    Ok(metadata)
}

fn render_page<R>(
    mapped: &MappedRoute,
    renderer: &R,
    template: Option<&SsrTemplate>,
    output_root: &Path,
) -> Result<RouteMetadata, BuildError>
where
    R: Renderer + ?Sized,
{
    let result = render_route(&mapped.route, renderer)?;

    let document = match template {
        Some(template) => template.compose(&result),
        None => result.markup.clone(),
    };
    write_page(&output_root.join(&mapped.output), &document)?;

    Ok(result.metadata(&mapped.route))
}

/// Write `contents` to `path` via a staging file, so a reader never sees a
/// half-written page.
fn write_page(path: &Path, contents: &str) -> Result<(), BuildError> {
    let io_error = |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let staging = staging_path(path);
    fs::write(&staging, contents).map_err(io_error)?;
    fs::rename(&staging, path).map_err(|err| {
        fs::remove_file(&staging).ok();
        io_error(err)
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(STAGING_SUFFIX);
    path.with_file_name(name)
}

// ============================================================================
// Tests
// ============================================================================
