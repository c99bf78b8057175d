//! Build orchestration.
//!
//! Drives one build through its phases and owns the build state.
//!
//! # Architecture
//!
//! ```text
//! BuildPlan::new()  ── route validation, duplicate and collision checks
//!     │
//! Orchestrator::run()
//!     │
//!     ├── client.compile()          ClientPhaseRunning
//!     │
//!     ├── wait_for_artifact()       WaitingForManifest
//!     │       │
//!     │       └── manifest written by the client phase releases the barrier
//!     │
//!     ├── server.compile()          ServerPhaseRunning ──► Renderer
//!     │
//!     └── render_all()              Rendering ──► HTML files + metadata
//! ```
//!
//! Any error moves the build to `Failed` and is returned unchanged.

mod error;
mod state;

pub use error::BuildError;
pub use state::BuildState;

use crate::{
    compiler::{
        Compilation, meta::AggregatedMetadata, pages::render_all, renderer::Renderer,
        template::SsrTemplate,
    },
    config::{ConfigError, SiteConfig, TrailingSlash},
    log,
    utils::{
        abort::AbortSignal,
        log::ProgressBars,
        route::{MappedRoute, normalize_base_path, validate_route},
        wait::{ArtifactStore, BarrierConfig, wait_for_artifact},
    },
};
use anyhow::Result;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Serialize, Serializer};
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

// ============================================================================
// Build Plan
// ============================================================================

/// Everything a build needs, checked before any phase runs.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    routes: Vec<MappedRoute>,
    manifest_path: PathBuf,
    output_root: PathBuf,
    barrier: BarrierConfig,
    template: Option<SsrTemplate>,
}

impl BuildPlan {
    /// Map every route and reject the set if any route lies outside
    /// `base_path`, appears twice, or needs an output path another route
    /// already uses (the same file, or a file where a directory must go).
    pub fn new(
        routes: &[String],
        base_path: &str,
        policy: TrailingSlash,
        manifest_path: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        barrier: BarrierConfig,
    ) -> Result<Self, ConfigError> {
        let base_path = normalize_base_path(base_path);
        let mut seen = FxHashSet::default();
        let mut outputs: FxHashMap<PathBuf, usize> = FxHashMap::default();
        let mut mapped: Vec<MappedRoute> = Vec::with_capacity(routes.len());

        for route in routes {
            validate_route(route, &base_path)?;
            if !seen.insert(route.as_str()) {
                return Err(ConfigError::DuplicateRoute(route.clone()));
            }

            let entry = MappedRoute::new(route, &base_path, policy);
            if let Some(&first) = outputs.get(&entry.output) {
                return Err(ConfigError::OutputCollision {
                    path: entry.output,
                    first: mapped[first].route.clone(),
                    second: route.clone(),
                });
            }
            outputs.insert(entry.output.clone(), mapped.len());
            mapped.push(entry);
        }

        // A page file may not sit where another page needs a directory.
        for (index, entry) in mapped.iter().enumerate() {
            for ancestor in entry.output.ancestors().skip(1) {
                if let Some(&owner) = outputs.get(ancestor) {
                    let (first, second) = (owner.min(index), owner.max(index));
                    return Err(ConfigError::OutputCollision {
                        path: ancestor.to_path_buf(),
                        first: mapped[first].route.clone(),
                        second: mapped[second].route.clone(),
                    });
                }
            }
        }

        Ok(Self {
            routes: mapped,
            manifest_path: manifest_path.into(),
            output_root: output_root.into(),
            barrier,
            template: None,
        })
    }

    /// Build the plan described by a loaded config.
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let build = &config.build;
        let barrier =
            BarrierConfig::new(build.manifest.poll_interval(), build.manifest.timeout())?;
        let template = SsrTemplate::from_config(&config.template)?;

        let plan = Self::new(
            &config.load_routes()?,
            &build.base_path,
            build.trailing_slash,
            &build.manifest.path,
            &build.output,
            barrier,
        )?;
        Ok(plan.with_template(template))
    }

    pub fn with_template(mut self, template: Option<SsrTemplate>) -> Self {
        self.template = template;
        self
    }

    /// Routes in build order.
    pub fn routes(&self) -> &[MappedRoute] {
        &self.routes
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}

// ============================================================================
// Build Report
// ============================================================================

/// Outcome of a successful build.
#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub routes_rendered: usize,
    pub timings: PhaseTimings,
    pub metadata: AggregatedMetadata,
}

/// Wall time spent per phase, serialized in milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PhaseTimings {
    #[serde(serialize_with = "as_millis")]
    pub client: Duration,
    #[serde(serialize_with = "as_millis")]
    pub manifest_wait: Duration,
    #[serde(serialize_with = "as_millis")]
    pub server: Duration,
    #[serde(serialize_with = "as_millis")]
    pub render: Duration,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Runs builds and records the states each one passes through.
#[derive(Debug)]
pub struct Orchestrator {
    state: BuildState,
    history: Vec<BuildState>,
    abort: AbortSignal,
    progress: bool,
}

impl Orchestrator {
    pub fn new(abort: AbortSignal) -> Self {
        Self {
            state: BuildState::Idle,
            history: vec![BuildState::Idle],
            abort,
            progress: false,
        }
    }

    /// Draw a progress bar while rendering.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub const fn state(&self) -> BuildState {
        self.state
    }

    /// States of the last build, in order, starting at `Idle`.
    pub fn history(&self) -> &[BuildState] {
        &self.history
    }

    /// Run one build: client phase, manifest wait, server phase, render.
    ///
    /// Ends in `Done` with a report, or in `Failed` with the first error.
    pub fn run<C, S>(
        &mut self,
        plan: &BuildPlan,
        client: &C,
        server: &S,
        store: &dyn ArtifactStore,
    ) -> Result<BuildReport, BuildError>
    where
        C: Compilation<Output = ()>,
        S: Compilation,
        S::Output: Renderer,
    {
        self.state = BuildState::Idle;
        self.history = vec![BuildState::Idle];

        match self.drive(plan, client, server, store) {
            Ok(report) => {
                self.advance(BuildState::Done);
                Ok(report)
            }
            Err(err) => {
                self.advance(BuildState::Failed);
                Err(err)
            }
        }
    }

    fn drive<C, S>(
        &mut self,
        plan: &BuildPlan,
        client: &C,
        server: &S,
        store: &dyn ArtifactStore,
    ) -> Result<BuildReport, BuildError>
    where
        C: Compilation<Output = ()>,
        S: Compilation,
        S::Output: Renderer,
    {
        let mut timings = PhaseTimings::default();
        self.check_abort()?;

        self.advance(BuildState::ClientPhaseRunning);
        let start = Instant::now();
        run_phase(client)?;
        timings.client = start.elapsed();
        self.check_abort()?;

        self.advance(BuildState::WaitingForManifest);
        log!("manifest"; "waiting for `{}`", plan.manifest_path.display());
        timings.manifest_wait =
            wait_for_artifact(store, &plan.manifest_path, plan.barrier, &self.abort)?;
        log!("manifest"; "ready after {:?}", timings.manifest_wait);

        self.advance(BuildState::ServerPhaseRunning);
        let start = Instant::now();
        let renderer = run_phase(server)?;
        timings.server = start.elapsed();
        self.check_abort()?;

        self.advance(BuildState::Rendering);
        log!("render"; "rendering {} routes", plan.routes.len());
        let start = Instant::now();
        let metadata = self.render(plan, &renderer)?;
        timings.render = start.elapsed();

        if metadata.is_empty() {
            log!("render"; "warning: no routes were rendered");
        }

        Ok(BuildReport {
            routes_rendered: metadata.len(),
            timings,
            metadata,
        })
    }

    fn render<R: Renderer>(
        &self,
        plan: &BuildPlan,
        renderer: &R,
    ) -> Result<AggregatedMetadata, BuildError> {
        let progress = self
            .progress
            .then(|| ProgressBars::new(&[("render", plan.routes.len())]));

        let result = render_all(
            &plan.routes,
            renderer,
            plan.template.as_ref(),
            &plan.output_root,
            &self.abort,
            || {
                if let Some(progress) = &progress {
                    progress.inc(0);
                }
            },
        );

        if let Some(progress) = &progress {
            progress.finish();
        }
        result
    }

    fn advance(&mut self, next: BuildState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        self.state = next;
        self.history.push(next);
    }

    fn check_abort(&self) -> Result<(), BuildError> {
        if self.abort.is_raised() {
            return Err(BuildError::Aborted);
        }
        Ok(())
    }
}

fn run_phase<P: Compilation>(phase: &P) -> Result<P::Output, BuildError> {
    phase.compile().map_err(|source| BuildError::Compile {
        phase: phase.name().to_owned(),
        source,
    })
}

// ============================================================================
// Tests
// ============================================================================
