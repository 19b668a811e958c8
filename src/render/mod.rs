//! Page composition.
//!
//! A page is assembled from three independently-sourced fragments: the
//! requested content itself plus optional shared `header.md` / `footer.md`
//! files at the content root. Fragments are read fresh on every render;
//! the dist mirror is the only cache.

pub mod layout;
pub mod title;

use crate::config::SiteConfig;
use crate::error::RenderError;
use crate::markdown::markdown_to_html;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Shared header fragment file name at the content root.
pub const HEADER_FRAGMENT: &str = "header.md";

/// Shared footer fragment file name at the content root.
pub const FOOTER_FRAGMENT: &str = "footer.md";

/// A fully composed page, ready for layout substitution.
///
/// Transient: consumed immediately by [`layout::apply`], never persisted.
#[derive(Debug)]
pub struct RenderedPage {
    pub title: String,
    pub header: String,
    pub body: String,
    pub footer: String,
}

/// Composes pages from a content stream plus the shared fragments.
pub struct PageComposer<'a> {
    config: &'a SiteConfig,
}

impl<'a> PageComposer<'a> {
    pub const fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    /// Compose a page from an open content stream.
    ///
    /// `content_path` is only consulted for the fragment guard; the bytes
    /// come from `content`. Missing fragments yield empty strings.
    pub fn compose(
        &self,
        content_path: &Path,
        mut content: impl Read,
    ) -> Result<RenderedPage, RenderError> {
        let mut source = String::new();
        content
            .read_to_string(&mut source)
            .map_err(|err| RenderError::Read(content_path.to_path_buf(), err))?;
        let body = markdown_to_html(&source);

        // When the header or footer itself is rendered as a page, skip the
        // fragments: loading them again would nest the fragment inside its
        // own render.
        let (header, footer) = if is_fragment(content_path) {
            (String::new(), String::new())
        } else {
            (
                self.load_fragment(HEADER_FRAGMENT)?,
                self.load_fragment(FOOTER_FRAGMENT)?,
            )
        };

        let title = title::resolve_title(&header, &body);

        Ok(RenderedPage {
            title,
            header,
            body,
            footer,
        })
    }

    /// Open `content_path`, compose, and wrap in the site layout.
    ///
    /// This is the whole render pipeline for one markdown file; both the
    /// dist writer and the on-demand render handler go through it.
    pub fn render_page(&self, content_path: &Path) -> Result<String, RenderError> {
        // Directories and missing files alike are "not found" for a render
        if !content_path.is_file() {
            return Err(RenderError::NotFound(content_path.to_path_buf()));
        }
        let file = File::open(content_path)
            .map_err(|err| RenderError::Read(content_path.to_path_buf(), err))?;
        let page = self.compose(content_path, file)?;
        layout::apply(self.config, &page)
    }

    /// Convert one shared fragment; absent file means an empty fragment.
    fn load_fragment(&self, name: &str) -> Result<String, RenderError> {
        let path = self.config.get_root().join(name);
        if !path.is_file() {
            return Ok(String::new());
        }
        let source =
            std::fs::read_to_string(&path).map_err(|err| RenderError::Read(path.clone(), err))?;
        Ok(markdown_to_html(&source))
    }
}

/// Is this path one of the shared fragments?
fn is_fragment(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name == HEADER_FRAGMENT || name == FOOTER_FRAGMENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site_with(files: &[(&str, &str)]) -> (TempDir, SiteConfig) {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(tmp.path().join(name), content).unwrap();
        }
        let mut config = SiteConfig::default();
        config.set_root(tmp.path());
        (tmp, config)
    }

    #[test]
    fn test_compose_with_fragments() {
        let (tmp, config) = site_with(&[
            ("header.md", "# Site"),
            ("footer.md", "contact us"),
            ("index.md", "<!-- TITLE:Home -->\n\nbody text"),
        ]);
        let composer = PageComposer::new(&config);
        let path = tmp.path().join("index.md");
        let file = File::open(&path).unwrap();

        let page = composer.compose(&path, file).unwrap();
        assert_eq!(page.title, "Home");
        assert!(page.header.contains("<h1>Site</h1>"));
        assert!(page.body.contains("body text"));
        assert!(page.footer.contains("contact us"));
    }

    #[test]
    fn test_missing_fragments_are_empty() {
        let (tmp, config) = site_with(&[("page.md", "# Standalone")]);
        let composer = PageComposer::new(&config);
        let path = tmp.path().join("page.md");
        let file = File::open(&path).unwrap();

        let page = composer.compose(&path, file).unwrap();
        assert_eq!(page.header, "");
        assert_eq!(page.footer, "");
        // Falls through to the body heading tier
        assert_eq!(page.title, "Standalone");
    }

    #[test]
    fn test_fragment_renders_without_recursion() {
        let (tmp, config) = site_with(&[("header.md", "# Site")]);
        let composer = PageComposer::new(&config);
        let path = tmp.path().join("header.md");
        let file = File::open(&path).unwrap();

        let page = composer.compose(&path, file).unwrap();
        // The header fragment is the body here, not a fragment of itself
        assert_eq!(page.header, "");
        assert!(page.body.contains("<h1>Site</h1>"));
    }

    #[test]
    fn test_header_title_beats_body_heading() {
        let (tmp, config) = site_with(&[
            ("header.md", "# Site"),
            ("page.md", "## Page Heading\n\ntext"),
        ]);
        let composer = PageComposer::new(&config);
        let path = tmp.path().join("page.md");
        let file = File::open(&path).unwrap();

        let page = composer.compose(&path, file).unwrap();
        assert_eq!(page.title, "Site");
    }

    #[test]
    fn test_render_page_missing_file() {
        let (tmp, config) = site_with(&[]);
        let composer = PageComposer::new(&config);

        let err = composer.render_page(&tmp.path().join("nope.md")).unwrap_err();
        assert!(matches!(err, RenderError::NotFound(_)));
    }

    #[test]
    fn test_render_page_full_shell() {
        let (tmp, config) = site_with(&[
            ("header.md", "# Site"),
            ("index.md", "<!-- TITLE:Home -->\n\nbody text"),
        ]);
        let composer = PageComposer::new(&config);

        let html = composer.render_page(&tmp.path().join("index.md")).unwrap();
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains("<h1>Site</h1>"));
        assert!(html.contains("body text"));
    }
}
