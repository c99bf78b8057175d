//! SSR document template.
//!
//! Wraps a route's rendered markup into a full HTML document.
//!
//! | Placeholder     | Replaced with                                        |
//! |-----------------|------------------------------------------------------|
//! | `{{ head }}`    | global head tags, route head tags, robots meta       |
//! | `{{ pre_body }}`| tags configured to follow `<body>`                   |
//! | `{{ app }}`     | the rendered markup (required)                       |
//! | `{{ post_body }}`| tags configured to precede `</body>`                |

use crate::config::{ConfigError, TemplateConfig};
use regex::{Captures, Regex};
use std::{fs, sync::OnceLock};

use super::meta::RenderResult;

/// Template used when `[template.path]` is unset.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
{{ head }}
</head>
<body>
{{ pre_body }}
<div id="__app">{{ app }}</div>
{{ post_body }}
</body>
</html>
"#;

const NO_INDEX_META: &str = r#"<meta name="robots" content="noindex, nofollow">"#;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{[ \t]*(head|pre_body|app|post_body)[ \t]*\}\}").unwrap())
}

#[derive(Debug, Clone)]
pub struct SsrTemplate {
    source: String,
    head_tags: Vec<String>,
    pre_body_tags: Vec<String>,
    post_body_tags: Vec<String>,
    no_index: bool,
}

impl SsrTemplate {
    /// Build a template from its source. Fails without an `{{ app }}` slot.
    pub fn new(source: impl Into<String>) -> Result<Self, ConfigError> {
        let source = source.into();
        let has_app = placeholder()
            .captures_iter(&source)
            .any(|caps| &caps[1] == "app");
        if !has_app {
            return Err(ConfigError::Template(
                "missing the `{{ app }}` placeholder".into(),
            ));
        }

        Ok(Self {
            source,
            head_tags: Vec::new(),
            pre_body_tags: Vec::new(),
            post_body_tags: Vec::new(),
            no_index: false,
        })
    }

    /// Load the `[template]` section. `None` when templating is disabled.
    pub fn from_config(config: &TemplateConfig) -> Result<Option<Self>, ConfigError> {
        if !config.enable {
            return Ok(None);
        }

        let source = match &config.path {
            Some(path) => {
                fs::read_to_string(path).map_err(|err| ConfigError::Io(path.clone(), err))?
            }
            None => DEFAULT_TEMPLATE.to_owned(),
        };

        let mut template = Self::new(source)?;
        template.head_tags = config.head.clone();
        template.pre_body_tags = config.pre_body.clone();
        template.post_body_tags = config.post_body.clone();
        template.no_index = config.no_index;
        Ok(Some(template))
    }

    /// Produce the document for one route.
    pub fn compose(&self, result: &RenderResult) -> String {
        placeholder()
            .replace_all(&self.source, |caps: &Captures| match &caps[1] {
                "head" => self.head(result),
                "pre_body" => self.pre_body_tags.join("\n"),
                "post_body" => self.post_body_tags.join("\n"),
                _ => result.markup.clone(),
            })
            .into_owned()
    }

    fn head(&self, result: &RenderResult) -> String {
        let robots = self.no_index.then_some(NO_INDEX_META);
        self.head_tags
            .iter()
            .chain(&result.head_tags)
            .map(String::as_str)
            .chain(robots)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
