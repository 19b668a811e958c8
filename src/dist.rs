//! Per-file dist commit.
//!
//! Each source file lands in the dist mirror one of two ways: markdown is
//! rendered through the full page pipeline and written as `.html`, anything
//! else becomes a symlink back to the canonical source so the mirror never
//! owns independent asset bytes. Both paths are convergent: re-running with
//! the same source yields byte-identical pages and the same link target.

use crate::config::{MARKDOWN_EXT, SiteConfig};
use crate::error::BuildError;
use crate::render::PageComposer;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Per-file build policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Recompute HTML and write it under dist.
    Render,
    /// Reference the original bytes with a link.
    Link,
}

/// One committed source → destination mapping.
#[derive(Debug)]
pub struct DistEntry {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub strategy: Strategy,
}

/// Writes single files into the dist mirror.
pub struct DistWriter<'a> {
    config: &'a SiteConfig,
    composer: PageComposer<'a>,
}

impl<'a> DistWriter<'a> {
    pub const fn new(config: &'a SiteConfig) -> Self {
        Self {
            config,
            composer: PageComposer::new(config),
        }
    }

    /// Commit one source file (path relative to the site root) into dist.
    pub fn write_one(&self, rel: &Path) -> Result<DistEntry, BuildError> {
        let source = self.config.get_root().join(rel);

        if rel.extension().is_some_and(|ext| ext == MARKDOWN_EXT) {
            let html = self.composer.render_page(&source)?;
            let dest = self.config.dist_dir().join(rel).with_extension("html");
            ensure_dir(&dest)?;
            // Unconditional overwrite; there is no staleness tracking
            fs::write(&dest, html).map_err(|err| BuildError::Write(dest.clone(), err))?;
            Ok(DistEntry {
                source,
                dest,
                strategy: Strategy::Render,
            })
        } else {
            let dest = self.config.dist_dir().join(rel);
            ensure_dir(&dest)?;
            link_to_source(&source, &dest);
            Ok(DistEntry {
                source,
                dest,
                strategy: Strategy::Link,
            })
        }
    }
}

/// Create the destination's parent directory tree.
///
/// Racing builders may both see the directory as missing; "already exists"
/// is success, not failure.
fn ensure_dir(dest: &Path) -> Result<(), BuildError> {
    let Some(parent) = dest.parent() else {
        return Ok(());
    };
    match fs::create_dir_all(parent) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(err) => Err(BuildError::Write(parent.to_path_buf(), err)),
    }
}

/// Best-effort link from dist back to the canonical source file.
///
/// Failure (most commonly: the link survived from a previous build) leaves
/// the destination as-is and the build moves on.
#[cfg(unix)]
fn link_to_source(source: &Path, dest: &Path) {
    std::os::unix::fs::symlink(source, dest).ok();
}

/// Windows symlinks need elevated rights; fall back to copying the bytes.
#[cfg(windows)]
fn link_to_source(source: &Path, dest: &Path) {
    fs::copy(source, dest).ok();
}
