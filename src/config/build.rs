//! `[build]` section configuration.
//!
//! Build paths and rebuild behavior. The site root doubles as the content
//! root: markdown and static files live directly in it, next to the
//! reserved `theme/`, `cms/` and `dist/` directories.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in lichen.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// dist = "dist"       # Mirror output directory (under root)
/// theme = "theme"     # Layout template directory (under root)
/// clean = false       # Wipe dist before each build
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Site root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Dist mirror directory name, relative to the root.
    #[serde(default = "defaults::build::dist")]
    #[educe(Default = defaults::build::dist())]
    pub dist: PathBuf,

    /// Theme directory name, relative to the root. Holds `layout.html`.
    #[serde(default = "defaults::build::theme")]
    #[educe(Default = defaults::build::theme())]
    pub theme: PathBuf,

    /// Clear the dist directory before each build.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,
}
