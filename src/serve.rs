//! HTTP server over the content tree.
//!
//! A lightweight server built on `tiny_http`:
//!
//! - routing per request via the [`Router`] rule chain
//! - on-demand markdown rendering through the render delegate
//! - full dist rebuild through the build delegate (`GET /cms/build`)
//! - `Last-Modified` headers from source mtimes
//! - graceful shutdown on Ctrl+C
//!
//! Requests are handled one at a time on the main thread; every request
//! opens and drops its own file handles, and no state is shared between
//! requests. A request that fails is logged and answered, never allowed
//! to take the process down.

use crate::{
    build::{build_site, success_message},
    config::SiteConfig,
    error::RenderError,
    log,
    render::PageComposer,
    router::{Route, Router, Script},
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{
    fs,
    io::Cursor,
    net::SocketAddr,
    path::Path,
    sync::Arc,
    time::SystemTime,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the server and block until Ctrl+C.
pub fn serve_site(config: &'static SiteConfig) -> Result<()> {
    let interface: std::net::IpAddr = config.serve.interface.parse()?;
    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => {
                continue;
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

// ============================================================================
// Request Handling
// ============================================================================

/// Handle a single HTTP request.
fn handle_request(request: Request, config: &SiteConfig) -> Result<()> {
    // Decode URL-encoded characters (e.g., %20 → space)
    let url_path = urlencoding::decode(request.url())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    // Strip query string before resolving the path
    let request_path = url_path.split('?').next().unwrap_or(&url_path);

    match Router::new(config).route(request_path) {
        Route::File(path) => serve_source_file(request, &path),
        Route::Fixed(bytes) => serve_html(request, bytes),
        Route::Delegate {
            script: Script::Render,
            path_info,
        } => handle_render(request, config, &path_info),
        Route::Delegate {
            script: Script::Build,
            ..
        } => handle_build(request, config),
        Route::NotFound => serve_not_found(request),
    }
}

/// Render one markdown file on demand.
fn handle_render(request: Request, config: &SiteConfig, path_info: &str) -> Result<()> {
    // Page files use underscores where their URLs show spaces
    let path_info = path_info.replace(' ', "_");
    let source = config.get_root().join(path_info.trim_start_matches('/'));

    match PageComposer::new(config).render_page(&source) {
        Ok(html) => {
            let mut response = Response::from_string(html)
                .with_header(content_type_header("text/html; charset=utf-8"));
            if let Some(header) = last_modified_header(&source) {
                response = response.with_header(header);
            }
            request.respond(response)?;
        }
        Err(err @ RenderError::NotFound(_)) => {
            respond_plain(request, 404, &err.to_string())?;
        }
        Err(err) => {
            log!("error"; "render failed: {err:#}");
            respond_plain(request, 500, &format!("An error occurred: {err}"))?;
        }
    }
    Ok(())
}

/// Run a full rebuild on behalf of an HTTP request.
///
/// The same action as `lichen build`; the response carries the same
/// success line, or a 500 with the error message. Either way the server
/// keeps running.
fn handle_build(request: Request, config: &SiteConfig) -> Result<()> {
    match build_site(config) {
        Ok(count) => {
            log!("build"; "{count} files processed");
            respond_plain(request, 200, &format!("{}\n", success_message(config)))
        }
        Err(err) => {
            log!("error"; "build failed: {err:#}");
            respond_plain(request, 500, &format!("An error occurred: {err}"))
        }
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Serve a literal source file with content type and `Last-Modified`.
fn serve_source_file(request: Request, path: &Path) -> Result<()> {
    let content = match fs::read(path) {
        Ok(content) => content,
        // Raced away between routing and reading
        Err(_) => return respond_plain(request, 404, &format!("File not found: {}", path.display())),
    };

    let mut response = Response::from_data(content)
        .with_header(content_type_header(guess_content_type(path)));
    if let Some(header) = last_modified_header(path) {
        response = response.with_header(header);
    }

    request.respond(response)?;
    Ok(())
}

/// Serve HTML bytes the router already resolved.
fn serve_html(request: Request, bytes: Vec<u8>) -> Result<()> {
    let response = Response::from_data(bytes)
        .with_header(content_type_header("text/html; charset=utf-8"));
    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    respond_plain(request, 404, "404 Not Found")
}

/// Plaintext response with an explicit status code.
fn respond_plain(request: Request, status: u16, body: &str) -> Result<()> {
    let response = Response::new(
        StatusCode(status),
        vec![content_type_header("text/plain; charset=utf-8")],
        Cursor::new(body.as_bytes().to_vec()),
        Some(body.len()),
        None,
    );
    request.respond(response)?;
    Ok(())
}

fn content_type_header(value: &str) -> Header {
    Header::from_bytes("Content-Type", value).unwrap()
}

/// `Last-Modified` from the file's mtime, when it is known.
fn last_modified_header(path: &Path) -> Option<Header> {
    let mtime = fs::metadata(path).and_then(|meta| meta.modified()).ok()?;
    Header::from_bytes("Last-Modified", http_date(mtime)).ok()
}

/// Format a timestamp the way HTTP wants it (RFC 1123, always GMT).
fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",

        // Documents
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        // Default binary
        _ => "application/octet-stream",
    }
}
