//! Full-tree dist rebuild.
//!
//! Walks the whole content tree and commits every file through the dist
//! writer. There is no cache and no dependency graph: a build is a pure
//! function of the current source tree, so it can be re-triggered at any
//! time (CLI, cron, or the `/cms/build` endpoint) and always converges to
//! the same dist contents.
//!
//! ```text
//! build_site()
//!     │
//!     ├── collect_source_files() ── walkdir, reserved subtrees pruned
//!     │
//!     └── par_iter ──► DistWriter::write_one per file
//!                        (markdown → render, everything else → link)
//! ```

use crate::config::SiteConfig;
use crate::dist::DistWriter;
use crate::error::BuildError;
use crate::log;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Rebuild the dist mirror from the content tree.
///
/// Fails fast: the first unrecoverable error aborts the remaining walk and
/// is surfaced alone. Returns the number of files processed.
pub fn build_site(config: &SiteConfig) -> Result<usize, BuildError> {
    if config.build.clean {
        clean_dist(&config.dist_dir())?;
    }

    let files = collect_source_files(config)?;
    log!("build"; "processing {} files", files.len());

    let writer = DistWriter::new(config);
    files.par_iter().try_for_each(|rel| {
        writer.write_one(rel)?;
        Ok::<_, BuildError>(())
    })?;

    Ok(files.len())
}

/// The success line shared by the CLI and the HTTP build endpoint.
pub fn success_message(config: &SiteConfig) -> String {
    format!("++ saved build output to {}", config.dist_dir().display())
}

/// Enumerate build inputs as root-relative paths.
///
/// Depth-first, files only. Any subtree rooted at a reserved directory
/// name (theme, cms, dist) is pruned wherever it appears in the tree.
fn collect_source_files(config: &SiteConfig) -> Result<Vec<PathBuf>, BuildError> {
    let root = config.get_root().to_path_buf();
    let reserved = config.reserved_dirs();

    let mut files = Vec::new();
    let walker = WalkDir::new(&root).into_iter().filter_entry(|entry| {
        !(entry.file_type().is_dir() && reserved.contains(&entry.file_name()))
    });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_str().unwrap_or_default();
        if IGNORED_FILES.contains(&name) {
            continue;
        }
        // strip_prefix cannot fail: every entry sits under the walk root
        if let Ok(rel) = entry.path().strip_prefix(&root) {
            files.push(rel.to_path_buf());
        }
    }

    Ok(files)
}

/// Remove the dist directory wholesale before a clean build.
fn clean_dist(dist: &Path) -> Result<(), BuildError> {
    if dist.exists() {
        fs::remove_dir_all(dist).map_err(|err| BuildError::Clean(dist.to_path_buf(), err))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn site_with(files: &[(&str, &str)]) -> (TempDir, SiteConfig) {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            let path = tmp.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let mut config = SiteConfig::default();
        config.set_root(tmp.path());
        (tmp, config)
    }

    #[test]
    fn test_build_renders_and_links() {
        let (tmp, config) = site_with(&[
            ("header.md", "# Site"),
            ("index.md", "<!-- TITLE:Home -->\n\nbody text"),
            ("css/style.css", "body {}"),
        ]);

        let count = build_site(&config).unwrap();
        assert_eq!(count, 3);

        let index = fs::read_to_string(tmp.path().join("dist/index.html")).unwrap();
        assert!(index.contains("<title>Home</title>"));
        assert!(index.contains("<h1>Site</h1>"));
        assert!(index.contains("body text"));
        assert!(tmp.path().join("dist/css/style.css").exists());
        // Fragments render as standalone pages too
        assert!(tmp.path().join("dist/header.html").exists());
    }

    #[test]
    fn test_reserved_directories_excluded() {
        let (tmp, config) = site_with(&[
            ("page.md", "# Page"),
            ("theme/layout.html", "<main>{body}</main>"),
            ("cms/notes.md", "internal"),
            ("dist/stale.html", "old"),
            ("sub/theme/inner.md", "nested reserved"),
        ]);

        let count = build_site(&config).unwrap();
        assert_eq!(count, 1);

        assert!(!tmp.path().join("dist/theme").exists());
        assert!(!tmp.path().join("dist/cms").exists());
        assert!(!tmp.path().join("dist/dist").exists());
        assert!(!tmp.path().join("dist/sub").exists());
    }

    #[test]
    fn test_build_twice_is_idempotent() {
        let (tmp, config) = site_with(&[
            ("index.md", "# Home"),
            ("data/info.txt", "plain"),
        ]);

        build_site(&config).unwrap();
        let first = fs::read(tmp.path().join("dist/index.html")).unwrap();
        #[cfg(unix)]
        let first_target = fs::read_link(tmp.path().join("dist/data/info.txt")).unwrap();

        build_site(&config).unwrap();
        let second = fs::read(tmp.path().join("dist/index.html")).unwrap();
        assert_eq!(first, second);
        #[cfg(unix)]
        assert_eq!(
            fs::read_link(tmp.path().join("dist/data/info.txt")).unwrap(),
            first_target
        );
    }

    #[test]
    fn test_clean_removes_stale_output() {
        let (tmp, mut config) = site_with(&[("index.md", "# Home")]);
        fs::create_dir_all(tmp.path().join("dist")).unwrap();
        fs::write(tmp.path().join("dist/orphan.html"), "stale").unwrap();

        config.build.clean = true;
        build_site(&config).unwrap();

        assert!(!tmp.path().join("dist/orphan.html").exists());
        assert!(tmp.path().join("dist/index.html").exists());
    }

    #[test]
    fn test_success_message_names_dist() {
        let (tmp, config) = site_with(&[]);
        let msg = success_message(&config);
        assert!(msg.starts_with("++ saved build output to "));
        assert!(msg.contains(tmp.path().join("dist").to_str().unwrap()));
    }
}
