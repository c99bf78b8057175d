//! prerender - render every route of a client/server bundled site to static HTML.

mod build;
mod cli;
mod compiler;
mod config;
mod utils;

use anyhow::{Context, Result, bail};
use build::{BuildPlan, BuildState, Orchestrator};
use clap::Parser;
use cli::{BuildArgs, Cli, Commands};
use compiler::{CommandPhase, ServerPhase, renderer::CommandRenderer};
use config::SiteConfig;
use std::{fs, path::Path, process};
use utils::{abort::AbortSignal, wait::FsStore};

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        log!("error"; "{err:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Build { build_args } => build_site(&config, build_args),
        Commands::Routes { .. } => print_routes(&config),
    }
}

/// Load configuration and apply CLI overrides
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    if !config_path.exists() {
        bail!("Config file not found: `{}`", config_path.display());
    }

    let mut config = SiteConfig::from_path(&config_path)?;
    config.update_with_cli(cli);
    Ok(config)
}

fn build_site(config: &SiteConfig, args: &BuildArgs) -> Result<()> {
    config.validate()?;
    let plan = BuildPlan::from_config(config)?;

    if args.clean {
        clean_output(config)?;
    }

    let abort = AbortSignal::new();
    let handler = abort.clone();
    ctrlc::set_handler(move || handler.raise()).context("Failed to install Ctrl-C handler")?;

    let root = config.get_root();
    let client = CommandPhase::new("client", config.build.client.command.clone(), root);
    let server = ServerPhase::new(
        CommandPhase::new("server", config.build.server.command.clone(), root),
        CommandRenderer::new(config.render.command.clone(), root),
    );

    let mut orchestrator = Orchestrator::new(abort).with_progress(true);
    let report = match orchestrator.run(&plan, &client, &server, &FsStore) {
        Ok(report) => report,
        Err(err) => {
            log!("build"; "{} after {}", orchestrator.state(), trace(orchestrator.history()));
            return Err(err.into());
        }
    };

    log!(
        "done";
        "rendered {} routes with {} links into `{}`",
        report.routes_rendered,
        report.metadata.link_count(),
        plan.output_root().display()
    );

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report `{}`", path.display()))?;
        log!("done"; "report written to `{}`", path.display());
    }

    Ok(())
}

/// Render a state history as `idle -> client phase -> ...`.
fn trace(history: &[BuildState]) -> String {
    history
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Remove the output directory and a manifest left over from an earlier build.
///
/// A stale manifest would release the wait before the client phase rewrote it.
fn clean_output(config: &SiteConfig) -> Result<()> {
    let output = &config.build.output;
    if config.get_root().starts_with(output) {
        bail!(
            "Refusing to clean `{}`: it contains the project root",
            output.display()
        );
    }

    if output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to remove `{}`", output.display()))?;
        log!("clean"; "removed `{}`", output.display());
    }

    let manifest = &config.build.manifest.path;
    if manifest.is_file() {
        fs::remove_file(manifest)
            .with_context(|| format!("Failed to remove `{}`", manifest.display()))?;
        log!("clean"; "removed stale manifest `{}`", manifest.display());
    }

    Ok(())
}

/// Print where each route would be written, without building.
fn print_routes(config: &SiteConfig) -> Result<()> {
    let plan = BuildPlan::from_config(config)?;

    for mapped in plan.routes() {
        log!(
            "routes";
            "{} ({}) -> {}",
            mapped.route,
            mapped.key,
            mapped.output.display()
        );
    }
    log!("routes"; "{} routes under `{}`", plan.routes().len(), config.build.base_path);

    Ok(())
}
