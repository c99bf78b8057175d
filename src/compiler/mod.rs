//! Compilation phases and page rendering.
//!
//! - **mod**: the [`Compilation`] seam and the command-backed client/server phases
//! - **renderer**: the render function capability
//! - **template**: SSR document template
//! - **meta**: per-route results and aggregated metadata
//! - **pages**: render every route and write its document
//!
//! # Build Flow
//!
//! ```text
//! CommandPhase (client) ──► manifest ──► ServerPhase ──► CommandRenderer
//!                                                              │
//!                                           render_all() ◄─────┘
//!                                                │
//!                                     HTML files + AggregatedMetadata
//! ```

pub mod meta;
pub mod pages;
pub mod renderer;
pub mod template;

use crate::{exec, log};
use anyhow::Result;
use renderer::CommandRenderer;
use std::path::PathBuf;

/// One independently scheduled compilation unit.
///
/// The client phase yields nothing the orchestrator needs; the server phase
/// yields the [`renderer::Renderer`] for the render pass.
pub trait Compilation {
    type Output;

    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    fn compile(&self) -> Result<Self::Output>;
}

/// A phase backed by an external command (e.g. a bundler invocation).
///
/// An empty command makes the phase a no-op.
#[derive(Debug, Clone)]
pub struct CommandPhase {
    name: &'static str,
    command: Vec<String>,
    root: PathBuf,
}

impl CommandPhase {
    pub fn new(name: &'static str, command: Vec<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name,
            command,
            root: root.into(),
        }
    }
}

impl Compilation for CommandPhase {
    type Output = ();

    fn name(&self) -> &str {
        self.name
    }

    fn compile(&self) -> Result<()> {
        if self.command.is_empty() {
            log!(self.name; "no command configured, skipping");
            return Ok(());
        }

        log!(self.name; "running `{}`", self.command.join(" "));
        exec!(&self.root; &self.command;)?;
        Ok(())
    }
}

/// Server phase: run its command, then hand out the renderer.
#[derive(Debug, Clone)]
pub struct ServerPhase {
    phase: CommandPhase,
    renderer: CommandRenderer,
}

impl ServerPhase {
    pub const fn new(phase: CommandPhase, renderer: CommandRenderer) -> Self {
        Self { phase, renderer }
    }
}

impl Compilation for ServerPhase {
    type Output = CommandRenderer;

    fn name(&self) -> &str {
        self.phase.name()
    }

    fn compile(&self) -> Result<CommandRenderer> {
        self.phase.compile()?;
        Ok(self.renderer.clone())
    }
}
