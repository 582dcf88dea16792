//! Pipeline configuration management for `gantry.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[paths]`   | Source and output directory contract             |
//! | `[serve]`   | Development server (port, interface, watch)      |
//! | `[lint]`    | Style lint rule file location                    |
//! | `[rewrite]` | Markup reference rewriting (script/style lists)  |

pub mod section;
mod types;

pub use section::{LintSection, PathsConfig, RewriteConfig, ServeConfig};
pub use types::{ConfigError, cfg, init_config};

use crate::cli::Cli;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing gantry.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GantryConfig {
    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Directory contract between pipeline stages
    pub paths: PathsConfig,

    /// Development server settings
    pub serve: ServeConfig,

    /// Style lint settings
    pub lint: LintSection,

    /// Markup reference rewriting
    pub rewrite: RewriteConfig,
}

impl GantryConfig {
    /// Load configuration from the CLI-selected path.
    ///
    /// A missing config file is not an error: the directory contract has
    /// sensible defaults matching the conventional project layout.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = &cli.config;

        let mut config = if config_path.is_file() {
            Self::parse_file(config_path)?
        } else {
            Self::default()
        };

        config.root = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(
                || std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
                Path::to_path_buf,
            );

        config.apply_cli_overrides(cli);
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).map_err(Into::into)
    }

    /// Parse config content, warning about unrecognized keys.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let de = toml::de::Deserializer::new(content);
        let mut unknown = Vec::new();
        let config: Self = serde_ignored::deserialize(de, |path| {
            unknown.push(path.to_string());
        })
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

        for key in &unknown {
            crate::log!("config"; "unknown key `{}` ignored", key);
        }

        Ok(config)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        use crate::cli::Commands;

        if let Commands::Dev {
            interface,
            port,
            watch,
        }
        | Commands::Build {
            interface,
            port,
            watch,
            ..
        } = &cli.command
        {
            if let Some(interface) = interface {
                self.serve.interface = *interface;
            }
            if let Some(port) = port {
                self.serve.port = *port;
            }
            if let Some(watch) = watch {
                self.serve.watch = *watch;
            }
        }
    }

    // ------------------------------------------------------------------
    // Directory contract (absolute paths)
    // ------------------------------------------------------------------

    /// Root-relative join helper.
    pub fn root_join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }

    /// Flat directory of style source files.
    pub fn styles_dir(&self) -> PathBuf {
        self.root_join(&self.paths.styles)
    }

    /// The single application script entry file.
    pub fn script_entry(&self) -> PathBuf {
        self.root_join(&self.paths.script)
    }

    /// Directory holding top-level script sources (watched, linted).
    pub fn scripts_dir(&self) -> PathBuf {
        self.root_join(&self.paths.scripts)
    }

    /// Vendor stylesheet directory (concatenated before the app stylesheet).
    pub fn vendor_styles_dir(&self) -> PathBuf {
        self.root_join(&self.paths.vendor_styles)
    }

    /// Output tree root. Owned by the pipeline, safe to delete and rebuild.
    pub fn output_dir(&self) -> PathBuf {
        self.root_join(&self.paths.output)
    }

    /// Compiled stylesheet output directory.
    pub fn output_styles_dir(&self) -> PathBuf {
        self.output_dir().join("assets/css")
    }

    /// Transpiled/minified script output directory.
    pub fn output_scripts_dir(&self) -> PathBuf {
        self.output_dir().join("assets/js")
    }

    /// The compiled application stylesheet (style-minifier input).
    pub fn app_stylesheet(&self) -> PathBuf {
        self.output_styles_dir().join("main.css")
    }

    /// The transpiled application script (script-minifier input).
    pub fn transpiled_script(&self) -> PathBuf {
        let name = self
            .script_entry()
            .file_name()
            .map_or_else(|| "app.js".into(), |n| n.to_os_string());
        self.output_scripts_dir().join(name)
    }

    /// Style lint rule file.
    pub fn lint_rules_path(&self) -> PathBuf {
        self.root_join(&self.lint.style_rules)
    }
}

#[cfg(test)]
pub(crate) fn test_parse_config(content: &str) -> GantryConfig {
    GantryConfig::parse(content).expect("test config must parse")
}
