//! Site configuration management for `lichen.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                      |
//! |-------------|----------------------------------------------|
//! | `[build]`   | Site root, dist/theme names, clean flag      |
//! | `[serve]`   | HTTP server (port, interface)                |
//!
//! # Example
//!
//! ```toml
//! [build]
//! dist = "dist"
//! theme = "theme"
//!
//! [serve]
//! port = 8000
//! ```
//!
//! The config file is optional: every field has a default, so a bare
//! content tree can be served or built with no setup at all.

mod build;
pub mod defaults;
mod error;
mod serve;

// Internal imports used in this module
use build::BuildConfig;
use error::ConfigError;
use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

/// File extension treated as markdown content.
pub const MARKDOWN_EXT: &str = "md";

/// Namespace segment for delegate scripts (`/cms/render/...`, `/cms/build`).
/// Reserved in the build walk even though no scripts live on disk.
pub const SCRIPT_DIR: &str = "cms";

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing lichen.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the site root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the site root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Dist mirror directory (absolute once the root is normalized)
    pub fn dist_dir(&self) -> PathBuf {
        self.get_root().join(&self.build.dist)
    }

    /// Theme directory holding the layout template
    pub fn theme_dir(&self) -> PathBuf {
        self.get_root().join(&self.build.theme)
    }

    /// Path of the page shell template
    pub fn layout_path(&self) -> PathBuf {
        self.theme_dir().join("layout.html")
    }

    /// Directory names excluded from the build walk, at any depth.
    ///
    /// Fixed set: the theme, the script namespace and the dist mirror
    /// itself. Files under these never become build inputs.
    pub fn reserved_dirs(&self) -> [&OsStr; 3] {
        [
            self.build.theme.as_os_str(),
            OsStr::new(SCRIPT_DIR),
            self.build.dist.as_os_str(),
        ]
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        let root = Self::normalize_path(&root);
        self.set_root(&root);

        match &cli.command {
            Commands::Build { build_args } => {
                self.build.clean |= build_args.clean;
            }
            Commands::Serve { interface, port } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
            }
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
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

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        if !self.get_root().is_dir() {
            bail!(ConfigError::Validation(format!(
                "site root `{}` is not a directory",
                self.get_root().display()
            )));
        }

        // The dist/theme names double as walk-exclusion entries, so they
        // must stay single path components under the root.
        for (field, path) in [("dist", &self.build.dist), ("theme", &self.build.theme)] {
            if path.components().count() != 1 || path.is_absolute() {
                bail!(ConfigError::Validation(format!(
                    "[build.{field}] must be a plain directory name, got `{}`",
                    path.display()
                )));
            }
        }

        if self.serve.interface.parse::<std::net::IpAddr>().is_err() {
            bail!(ConfigError::Validation(format!(
                "[serve.interface] `{}` is not a valid IP address",
                self.serve.interface
            )));
        }

        Ok(())
    }
}
