//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::config::TrailingSlash;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Two-phase static site prerenderer
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: prerender.toml)
    #[arg(short = 'C', long, default_value = "prerender.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Route mapping overrides shared by every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct MappingArgs {
    /// Override the base path all routes are served under (e.g. `/docs/`)
    #[arg(long = "base-path")]
    pub base_path: Option<String>,

    /// Override the trailing-slash policy
    #[arg(long = "trailing-slash", value_enum)]
    pub trailing_slash: Option<TrailingSlash>,
}

/// Arguments of the `build` command
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Remove the output directory and any stale client manifest before building
    #[arg(long)]
    pub clean: bool,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the build report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[command(flatten)]
    pub mapping: MappingArgs,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the client phase, the server phase and render every route
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Print where each route would be written, without building
    Routes {
        #[command(flatten)]
        mapping: MappingArgs,
    },
}

impl Cli {
    /// Mapping overrides of whichever command is running.
    pub const fn mapping(&self) -> &MappingArgs {
        match &self.command {
            Commands::Build { build_args } => &build_args.mapping,
            Commands::Routes { mapping } => mapping,
        }
    }
}
