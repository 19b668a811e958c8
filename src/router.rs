//! Request path resolution.
//!
//! Maps a decoded, query-stripped request path onto one of four outcomes.
//! The rules run in a fixed order and the first match wins:
//!
//! 1. directory request → source `index.html`, dist `index.html`,
//!    source `index.md` (handed to the render delegate)
//! 2. literal file under the source root
//! 3. sibling `<path>.html` under source, then dist, then `<path>.md`
//!    (handed to the render delegate)
//! 4. `cms/<script>[/<path-info>]` against the dispatch table
//! 5. not found
//!
//! A literal static file therefore always beats the `.html`/`.md`
//! fallbacks, and `.md` only participates when no compiled `.html` exists
//! at either location.

use crate::config::{SCRIPT_DIR, SiteConfig};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Registered delegate scripts. Unknown names fall through to `NotFound`;
/// there is no dynamic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// On-demand markdown rendering (`cms/render/<path>.md`).
    Render,
    /// Full dist rebuild (`cms/build`).
    Build,
}

/// Dispatch table from URL segment to script handler.
const SCRIPTS: &[(&str, Script)] = &[("render", Script::Render), ("build", Script::Build)];

/// Routing outcome for one request.
#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    /// Serve this literal file from disk; the server layer attaches
    /// `Last-Modified` from its mtime.
    File(PathBuf),
    /// HTML bytes the router already read (index and `.html` fallbacks).
    Fixed(Vec<u8>),
    /// Transfer control to a script handler with the residual path info.
    Delegate { script: Script, path_info: String },
    NotFound,
}

/// Resolves request paths against the source tree and the dist mirror.
pub struct Router<'a> {
    config: &'a SiteConfig,
}

impl<'a> Router<'a> {
    pub const fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    /// Resolve one request path (decoded, query already stripped).
    pub fn route(&self, request_path: &str) -> Route {
        let rel = request_path.trim_start_matches('/');
        if escapes_root(rel) {
            return Route::NotFound;
        }

        self.index_rule(request_path, rel)
            .or_else(|| self.literal_rule(rel))
            .or_else(|| self.fallback_rule(rel))
            .or_else(|| self.delegate_rule(rel))
            .unwrap_or(Route::NotFound)
    }

    /// Rule 1: directory requests look for index files.
    fn index_rule(&self, request_path: &str, rel: &str) -> Option<Route> {
        if !request_path.ends_with('/') && !request_path.is_empty() {
            return None;
        }

        let src_index = self.config.get_root().join(rel).join("index.html");
        if src_index.is_file() {
            return read_fixed(&src_index);
        }

        let dist_index = self.config.dist_dir().join(rel).join("index.html");
        if dist_index.is_file() {
            return read_fixed(&dist_index);
        }

        if self.config.get_root().join(rel).join("index.md").is_file() {
            return Some(Route::Delegate {
                script: Script::Render,
                path_info: format!("{request_path}index.md"),
            });
        }

        None
    }

    /// Rule 2: an existing file at the literal path is served as-is,
    /// unless it lives in the script namespace.
    fn literal_rule(&self, rel: &str) -> Option<Route> {
        if rel.is_empty() || in_script_namespace(rel) {
            return None;
        }
        let path = self.config.get_root().join(rel);
        path.is_file().then_some(Route::File(path))
    }

    /// Rule 3: sibling `.html` (source, then dist), then sibling `.md`.
    fn fallback_rule(&self, rel: &str) -> Option<Route> {
        if rel.is_empty() || in_script_namespace(rel) {
            return None;
        }

        let src_html = self.config.get_root().join(format!("{rel}.html"));
        if src_html.is_file() {
            return read_fixed(&src_html);
        }

        let dist_html = self.config.dist_dir().join(format!("{rel}.html"));
        if dist_html.is_file() {
            return read_fixed(&dist_html);
        }

        if self.config.get_root().join(format!("{rel}.md")).is_file() {
            return Some(Route::Delegate {
                script: Script::Render,
                path_info: format!("/{rel}.md"),
            });
        }

        None
    }

    /// Rule 4: `cms/<name>[/<path-info>]` against the dispatch table.
    fn delegate_rule(&self, rel: &str) -> Option<Route> {
        let rest = rel.strip_prefix(SCRIPT_DIR)?.strip_prefix('/')?;
        let (name, path_info) = match rest.split_once('/') {
            Some((name, sub)) => (name, format!("/{sub}")),
            None => (rest, String::new()),
        };
        let script = SCRIPTS
            .iter()
            .find_map(|(n, script)| (*n == name).then_some(*script))?;
        Some(Route::Delegate { script, path_info })
    }
}

/// Reject any path whose components could climb out of the source tree.
fn escapes_root(rel: &str) -> bool {
    Path::new(rel)
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir))
}

/// Does this path sit under the delegate namespace?
fn in_script_namespace(rel: &str) -> bool {
    rel == SCRIPT_DIR
        || rel
            .strip_prefix(SCRIPT_DIR)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Read a fallback file the router resolved itself.
/// An unreadable file lets the next rule have a try.
fn read_fixed(path: &Path) -> Option<Route> {
    fs::read(path).ok().map(Route::Fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
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
    fn test_literal_file_served_directly() {
        let (tmp, config) = site_with(&[("css/style.css", "body {}")]);
        let router = Router::new(&config);

        assert_eq!(
            router.route("/css/style.css"),
            Route::File(tmp.path().join("css/style.css"))
        );
    }

    #[test]
    fn test_literal_html_beats_markdown_fallback() {
        let (_tmp, config) = site_with(&[
            ("about.html", "<p>compiled</p>"),
            ("about.md", "# About"),
        ]);
        let router = Router::new(&config);

        assert_eq!(router.route("/about"), Route::Fixed(b"<p>compiled</p>".to_vec()));
    }

    #[test]
    fn test_markdown_fallback_delegates_to_render() {
        let (_tmp, config) = site_with(&[("about.md", "# About")]);
        let router = Router::new(&config);

        assert_eq!(
            router.route("/about"),
            Route::Delegate {
                script: Script::Render,
                path_info: "/about.md".into(),
            }
        );
    }

    #[test]
    fn test_dist_html_fallback() {
        let (_tmp, config) = site_with(&[
            ("dist/about.html", "<p>cached</p>"),
            ("about.md", "# About"),
        ]);
        let router = Router::new(&config);

        // compiled dist copy wins over re-rendering the markdown
        assert_eq!(router.route("/about"), Route::Fixed(b"<p>cached</p>".to_vec()));
    }

    #[test]
    fn test_root_index_html() {
        let (_tmp, config) = site_with(&[("index.html", "<p>home</p>")]);
        let router = Router::new(&config);

        assert_eq!(router.route("/"), Route::Fixed(b"<p>home</p>".to_vec()));
    }

    #[test]
    fn test_root_index_dist_fallback() {
        let (_tmp, config) = site_with(&[("dist/index.html", "<p>built</p>")]);
        let router = Router::new(&config);

        assert_eq!(router.route("/"), Route::Fixed(b"<p>built</p>".to_vec()));
    }

    #[test]
    fn test_root_index_md_delegates() {
        let (_tmp, config) = site_with(&[("index.md", "# Home")]);
        let router = Router::new(&config);

        assert_eq!(
            router.route("/"),
            Route::Delegate {
                script: Script::Render,
                path_info: "/index.md".into(),
            }
        );
    }

    #[test]
    fn test_subdirectory_index_md() {
        let (_tmp, config) = site_with(&[("notes/index.md", "# Notes")]);
        let router = Router::new(&config);

        assert_eq!(
            router.route("/notes/"),
            Route::Delegate {
                script: Script::Render,
                path_info: "/notes/index.md".into(),
            }
        );
    }

    #[test]
    fn test_known_scripts_dispatch() {
        let (_tmp, config) = site_with(&[]);
        let router = Router::new(&config);

        assert_eq!(
            router.route("/cms/build"),
            Route::Delegate {
                script: Script::Build,
                path_info: String::new(),
            }
        );
        assert_eq!(
            router.route("/cms/render/blue.md"),
            Route::Delegate {
                script: Script::Render,
                path_info: "/blue.md".into(),
            }
        );
    }

    #[test]
    fn test_unknown_script_is_not_found() {
        let (_tmp, config) = site_with(&[]);
        let router = Router::new(&config);

        assert_eq!(router.route("/cms/edit/blue.md"), Route::NotFound);
    }

    #[test]
    fn test_script_namespace_never_served_literally() {
        let (_tmp, config) = site_with(&[("cms/secrets.txt", "keys")]);
        let router = Router::new(&config);

        assert_eq!(router.route("/cms/secrets.txt"), Route::NotFound);
    }

    #[test]
    fn test_no_match_is_not_found() {
        let (_tmp, config) = site_with(&[]);
        let router = Router::new(&config);

        assert_eq!(router.route("/missing"), Route::NotFound);
    }

    #[test]
    fn test_parent_components_rejected() {
        let (_tmp, config) = site_with(&[]);
        let router = Router::new(&config);

        assert_eq!(router.route("/../etc/passwd"), Route::NotFound);
        assert_eq!(router.route("/a/../../b"), Route::NotFound);
    }
}
