//! Page shell application.
//!
//! Wraps a composed page in the site layout. The shell is read from
//! `<theme>/layout.html` when the site provides one, otherwise the embedded
//! default is used. Placeholders: `{title}`, `{header}`, `{body}`,
//! `{footer}`.

use crate::config::SiteConfig;
use crate::error::RenderError;
use crate::render::RenderedPage;
use std::fs;

/// Default page shell (embedded at compile time)
const DEFAULT_LAYOUT: &str = include_str!("../embed/layout.html");

/// Substitute a rendered page into the site layout.
pub fn apply(config: &SiteConfig, page: &RenderedPage) -> Result<String, RenderError> {
    let layout_path = config.layout_path();
    let shell = if layout_path.is_file() {
        fs::read_to_string(&layout_path).map_err(|err| RenderError::Layout(layout_path, err))?
    } else {
        DEFAULT_LAYOUT.to_string()
    };

    // {title} and friends are template placeholders, not format args
    #[allow(clippy::literal_string_with_formatting_args)]
    let page = shell
        .replace("{title}", &page.title)
        .replace("{header}", &page.header)
        .replace("{body}", &page.body)
        .replace("{footer}", &page.footer);
    Ok(page)
}
