//! Typed error values for rendering and building.
//!
//! The server layer maps these to HTTP status codes; the CLI lets them
//! bubble up through `anyhow` and exit non-zero.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while composing a single page.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to read layout `{0}`")]
    Layout(PathBuf, #[source] std::io::Error),
}

/// Errors raised during a full dist rebuild.
///
/// The build fails fast: the first unrecoverable error aborts the walk and
/// is surfaced alone.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to walk source tree")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to write `{0}`")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("failed to clean `{0}`")]
    Clean(PathBuf, #[source] std::io::Error),
}
