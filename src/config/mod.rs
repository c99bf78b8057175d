//! Project configuration management for `prerender.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                         |
//! |--------------|-------------------------------------------------|
//! | `[build]`    | Routes, base path, output, manifest, phases     |
//! | `[render]`   | External render command                         |
//! | `[template]` | SSR document template and global tags           |
//!
//! # Example
//!
//! ```toml
//! [build]
//! base_path = "/docs/"
//! trailing_slash = "always"
//! routes = ["/docs/", "/docs/intro"]
//!
//! [build.client]
//! command = ["npm", "run", "build:client"]
//!
//! [render]
//! command = ["node", "render.js"]
//! ```

mod build;
pub mod defaults;
mod error;
mod render;

pub use build::{BuildConfig, TrailingSlash};
pub use error::ConfigError;
pub use render::{RenderConfig, TemplateConfig};

use crate::cli::{Cli, Commands, MappingArgs};
use crate::utils::route::{normalize_base_path, validate_route};
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing prerender.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Render command settings
    #[serde(default)]
    pub render: RenderConfig,

    /// SSR template settings
    #[serde(default)]
    pub template: TemplateConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: SiteConfig = toml::from_str(content)?;
        config.build.base_path = normalize_base_path(&config.build.base_path);
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// All routes in build order: `routes` first, then `routes_file` lines.
    pub fn load_routes(&self) -> Result<Vec<String>, ConfigError> {
        let mut routes = self.build.routes.clone();

        if let Some(path) = &self.build.routes_file {
            let content =
                fs::read_to_string(path).map_err(|err| ConfigError::Io(path.clone(), err))?;
            routes.extend(parse_routes_file(&content));
        }

        Ok(routes)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());
        self.update_path_with_root(&root, cli);
        self.update_mapping(cli.mapping());
    }

    fn update_mapping(&mut self, mapping: &MappingArgs) {
        Self::update_option(&mut self.build.trailing_slash, mapping.trailing_slash.as_ref());
        if let Some(base_path) = &mapping.base_path {
            self.build.base_path = normalize_base_path(base_path);
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, cli: &Cli) {
        if let Commands::Build { build_args } = &cli.command {
            Self::update_option(&mut self.build.output, build_args.output.as_ref());
        }

        let root = Self::normalize_path(&Self::expand_tilde(root));
        self.set_root(&root);
        self.config_path = Self::normalize_path(&root.join(&cli.config));

        let resolve = |path: &Path| Self::normalize_path(&root.join(Self::expand_tilde(path)));
        self.build.output = resolve(&self.build.output);
        self.build.manifest.path = resolve(&self.build.manifest.path);
        self.build.routes_file = self.build.routes_file.as_deref().map(resolve);
        self.template.path = self.template.path.as_deref().map(resolve);
    }

    /// Expand a leading `~` to the home directory.
    fn expand_tilde(path: &Path) -> PathBuf {
        match path.to_str() {
            Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
            None => path.to_path_buf(),
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration before any build phase runs.
    pub fn validate(&self) -> Result<()> {
        if !self.config_path.exists() {
            bail!("Config file not found");
        }

        self.validate_routes()?;
        self.validate_manifest()?;

        if let Some(path) = &self.template.path
            && self.template.enable
            && !path.is_file()
        {
            bail!(ConfigError::Validation(format!(
                "[template.path] `{}` is not a file",
                path.display()
            )));
        }

        Self::check_command_installed("[render.command]", &self.render.command)?;
        if !self.build.client.command.is_empty() {
            Self::check_command_installed("[build.client.command]", &self.build.client.command)?;
        }
        if !self.build.server.command.is_empty() {
            Self::check_command_installed("[build.server.command]", &self.build.server.command)?;
        }

        Ok(())
    }

    /// Every route must exist under the base path.
    fn validate_routes(&self) -> Result<(), ConfigError> {
        let routes = self.load_routes()?;
        if routes.is_empty() {
            return Err(ConfigError::Validation(
                "no routes configured, set [build.routes] or [build.routes_file]".into(),
            ));
        }
        routes
            .iter()
            .try_for_each(|route| validate_route(route, &self.build.base_path))
    }

    fn validate_manifest(&self) -> Result<(), ConfigError> {
        let manifest = &self.build.manifest;
        if manifest.timeout_ms == 0 || manifest.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidBarrier(
                "[build.manifest] timeout_ms and poll_interval_ms must be positive".into(),
            ));
        }
        if manifest.poll_interval_ms > manifest.timeout_ms {
            return Err(ConfigError::InvalidBarrier(
                "[build.manifest] poll_interval_ms must not exceed timeout_ms".into(),
            ));
        }
        Ok(())
    }

    /// Check if a command is installed and available
    fn check_command_installed(field: &str, command: &[String]) -> Result<()> {
        let Some(cmd) = command.first() else {
            bail!(ConfigError::Validation(format!(
                "{field} must have at least one element"
            )));
        };

        which::which(cmd)
            .with_context(|| format!("`{cmd}` not found. Please install it first."))?;

        Ok(())
    }
}

/// Parse a routes file: one route per line, `#` comments and blank lines skipped.
fn parse_routes_file(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> SiteConfig {
        let path = dir.join("prerender.toml");
        fs::write(&path, content).unwrap();
        let mut config = SiteConfig::from_path(&path).unwrap();
        config.config_path = path;
        config.set_root(dir);
        config
    }

    #[test]
    fn test_from_str() {
        let config = SiteConfig::from_str(
            r#"
            [build]
            base_path = "/docs/"
            trailing_slash = "always"
            routes = ["/docs/", "/docs/intro"]

            [render]
            command = ["node", "ssr.js"]
        "#,
        )
        .unwrap();

        assert_eq!(config.build.base_path, "/docs/");
        assert_eq!(config.build.trailing_slash, TrailingSlash::Always);
        assert_eq!(config.build.routes, vec!["/docs/", "/docs/intro"]);
        assert_eq!(config.render.command, vec!["node", "ssr.js"]);
    }

    #[test]
    fn test_from_str_normalizes_base_path() {
        let config = SiteConfig::from_str(
            r#"
            [build]
            base_path = "docs"
        "#,
        )
        .unwrap();
        assert_eq!(config.build.base_path, "/docs/");
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SiteConfig::from_str("[build\nroutes = []");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_from_str_invalid_trailing_slash() {
        let result = SiteConfig::from_str(
            r#"
            [build]
            trailing_slash = "both"
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = SiteConfig::from_path(Path::new("/nonexistent/prerender.toml"));
        assert!(matches!(result, Err(ConfigError::Io(..))));
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let result = SiteConfig::from_str(
            r#"
            [serve]
            port = 8080
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.build.base_path, "/");
        assert!(config.template.enable);
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_set_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/custom/path"));
        assert_eq!(config.get_root(), Path::new("/custom/path"));
    }

    #[test]
    fn test_parse_routes_file() {
        let routes: Vec<_> = parse_routes_file(
            "# generated by the docs plugin\n/\n\n  /docs/intro  \n#/skipped\n/blog/",
        )
        .collect();
        assert_eq!(routes, vec!["/", "/docs/intro", "/blog/"]);
    }

    #[test]
    fn test_load_routes_appends_file() {
        let dir = TempDir::new().unwrap();
        let routes_path = dir.path().join("routes.txt");
        fs::write(&routes_path, "/b\n/c\n").unwrap();

        let mut config = SiteConfig::default();
        config.build.routes = vec!["/a".into()];
        config.build.routes_file = Some(routes_path);

        assert_eq!(config.load_routes().unwrap(), vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_validate_rejects_route_outside_base() {
        let dir = TempDir::new().unwrap();
        let config = write_config(
            dir.path(),
            r#"
            [build]
            base_path = "/docs/"
            routes = ["/docs/intro", "/blog/post"]

            [render]
            command = ["sh"]
        "#,
        );

        let err = config.validate().unwrap_err();
        let err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(err, ConfigError::InvalidRoute { route, .. } if route == "/blog/post"));
    }

    #[test]
    fn test_validate_rejects_empty_routes() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "[render]\ncommand = [\"sh\"]\n");

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no routes configured"));
    }

    #[test]
    fn test_validate_rejects_poll_interval_above_timeout() {
        let dir = TempDir::new().unwrap();
        let config = write_config(
            dir.path(),
            r#"
            [build]
            routes = ["/"]

            [build.manifest]
            timeout_ms = 100
            poll_interval_ms = 500

            [render]
            command = ["sh"]
        "#,
        );

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidBarrier(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_render_command() {
        let dir = TempDir::new().unwrap();
        let config = write_config(
            dir.path(),
            r#"
            [build]
            routes = ["/"]

            [render]
            command = []
        "#,
        );

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("[render.command]"));
    }

    #[test]
    fn test_validate_accepts_minimal_config() {
        let dir = TempDir::new().unwrap();
        let config = write_config(
            dir.path(),
            r#"
            [build]
            routes = ["/", "/docs/intro"]

            [render]
            command = ["sh"]
        "#,
        );

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_update_with_cli_overrides() {
        use clap::Parser;

        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from([
            "prerender",
            "--root",
            root,
            "build",
            "--base-path",
            "guide",
            "--trailing-slash",
            "never",
            "--output",
            "dist",
        ]);

        let mut config = SiteConfig::default();
        config.update_with_cli(&cli);

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.build.base_path, "/guide/");
        assert_eq!(config.build.trailing_slash, TrailingSlash::Never);
        assert_eq!(config.build.output, root.join("dist"));
        assert_eq!(config.config_path, root.join("prerender.toml"));
        assert_eq!(
            config.build.manifest.path,
            root.join(".prerender/client-manifest.json")
        );
    }
}
