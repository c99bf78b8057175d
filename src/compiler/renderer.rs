//! The render function: one route in, markup plus head tags and links out.
//!
//! The component rendering layer lives outside this crate. [`Renderer`] is the
//! seam; the binary plugs in [`CommandRenderer`], tests plug in closures.

use crate::exec;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Raw output of one render call. Tags and links may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RenderOutput {
    pub markup: String,
    #[serde(default)]
    pub head_tags: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

#[cfg(test)]
impl RenderOutput {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            ..Self::default()
        }
    }

    pub fn with_head_tag(mut self, tag: impl Into<String>) -> Self {
        self.head_tags.push(tag.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.links.push(link.into());
        self
    }
}

/// Renders a single route. Called concurrently from render workers.
pub trait Renderer: Sync {
    fn render(&self, route: &str) -> Result<RenderOutput>;
}

impl<F> Renderer for F
where
    F: Fn(&str) -> Result<RenderOutput> + Sync,
{
    fn render(&self, route: &str) -> Result<RenderOutput> {
        self(route)
    }
}

/// Runs `command... <route>` and reads a JSON [`RenderOutput`] from stdout.
///
/// ```json
/// {"markup": "<main>…</main>", "head_tags": ["<title>Intro</title>"], "links": ["/docs/next"]}
/// ```
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    command: Vec<String>,
    root: PathBuf,
}

impl CommandRenderer {
    pub fn new(command: Vec<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            command,
            root: root.into(),
        }
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, route: &str) -> Result<RenderOutput> {
        let output = exec!(&self.root; &self.command; route)?;
        parse_render_output(&output.stdout)
    }
}

fn parse_render_output(stdout: &[u8]) -> Result<RenderOutput> {
    serde_json::from_slice(stdout).context("render command did not print a valid JSON result")
}
