//! Markdown to HTML conversion boundary.
//!
//! The rest of the crate only ever needs this one function; any conforming
//! markdown engine could be substituted behind it. HTML blocks (including
//! comments, which carry the explicit `<!-- TITLE:... -->` marker) pass
//! through to the output untouched.

use pulldown_cmark::{Options, Parser, html};

/// Convert markdown text to an HTML fragment.
pub fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_paragraph() {
        let html = markdown_to_html("# Site\n\nhello *world*");
        assert!(html.contains("<h1>Site</h1>"));
        assert!(html.contains("<em>world</em>"));
    }

    #[test]
    fn test_html_comment_passthrough() {
        let html = markdown_to_html("<!-- TITLE:Home -->\n\nbody text");
        assert!(html.contains("<!-- TITLE:Home -->"));
        assert!(html.contains("body text"));
    }

    #[test]
    fn test_table_extension_enabled() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(markdown_to_html(""), "");
    }
}
