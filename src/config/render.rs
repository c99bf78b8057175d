//! `[render]` and `[template]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[render]` section - the external render function.
///
/// The command is invoked once per route with the route appended as the last
/// argument and must print a JSON render result on stdout.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    #[serde(default = "defaults::render::command")]
    #[educe(Default = defaults::render::command())]
    pub command: Vec<String>,
}

/// `[template]` section - the SSR document wrapping each rendered route.
///
/// # Example
/// ```toml
/// [template]
/// path = "ssr.html"
/// head = ['<meta charset="utf-8">']
/// post_body = ['<script src="/assets/main.js"></script>']
/// no_index = false
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateConfig {
    /// Wrap rendered markup in a template. Disable when the renderer already
    /// returns complete documents.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Template file; the built-in template is used when unset.
    pub path: Option<PathBuf>,

    /// Tags added to every page's `<head>`, before the route's own tags.
    pub head: Vec<String>,

    /// Tags inserted right after `<body>`.
    pub pre_body: Vec<String>,

    /// Tags inserted right before `</body>`.
    pub post_body: Vec<String>,

    /// Ask crawlers not to index the site.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub no_index: bool,
}
