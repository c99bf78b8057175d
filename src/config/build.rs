//! `[build]` section configuration.
//!
//! Contains route list, base path, output layout, manifest handshake and the
//! two compilation phase commands.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

// ============================================================================
// Enums
// ============================================================================

/// Output naming convention for routes without a file extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlash {
    /// Directory form: `foo` → `foo/index.html`.
    Always,
    /// File form: `foo/` → `foo.html`.
    Never,
    /// Follow the route itself: trailing `/` → directory form (default).
    #[default]
    Preserve,
}

// ============================================================================
// Main BuildConfig
// ============================================================================

/// `[build]` section in prerender.toml.
///
/// # Example
/// ```toml
/// [build]
/// base_path = "/docs/"
/// trailing_slash = "always"
/// output = "build"
/// routes = ["/docs/", "/docs/intro"]
///
/// [build.manifest]
/// path = ".prerender/client-manifest.json"
/// timeout_ms = 60000
///
/// [build.client]
/// command = ["npm", "run", "build:client"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// URL prefix every route is served under.
    #[serde(default = "defaults::build::base_path")]
    #[educe(Default = defaults::build::base_path())]
    pub base_path: String,

    /// Directory vs. file naming for extension-less routes.
    pub trailing_slash: TrailingSlash,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Routes to render, in build order.
    pub routes: Vec<String>,

    /// Optional file with one route per line, appended after `routes`.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub routes_file: Option<PathBuf>,

    /// Client manifest handshake.
    pub manifest: ManifestConfig,

    /// Client (browser bundle) compilation phase.
    pub client: PhaseConfig,

    /// Server (rendering bundle) compilation phase.
    pub server: PhaseConfig,
}

/// `[build.manifest]` - the artifact the server phase waits for.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Manifest file written by the client phase.
    #[serde(default = "defaults::build::manifest::path")]
    #[educe(Default = defaults::build::manifest::path())]
    pub path: PathBuf,

    /// Maximum time to wait for the manifest, in milliseconds.
    #[serde(default = "defaults::build::manifest::timeout_ms")]
    #[educe(Default = defaults::build::manifest::timeout_ms())]
    pub timeout_ms: u64,

    /// Delay between existence checks, in milliseconds.
    #[serde(default = "defaults::build::manifest::poll_interval_ms")]
    #[educe(Default = defaults::build::manifest::poll_interval_ms())]
    pub poll_interval_ms: u64,
}

impl ManifestConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// `[build.client]` / `[build.server]` - one compilation phase.
///
/// An empty command makes the phase a no-op, for setups where another tool
/// produces the bundles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhaseConfig {
    pub command: Vec<String>,
}
