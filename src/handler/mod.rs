//! Request routing
//!
//! Every request ends up at exactly one of three handlers:
//!
//! - **`static_files`**: files under the static root
//! - **`cgi`**: executables under the script root
//! - **`error_page`**: canned pages for everything else

pub mod cgi;
pub mod error_page;
pub mod static_files;

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::http::mime::TEXT_HTML;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

/// Routes a request to the handler that answers it.
///
/// An empty path serves the index page. Otherwise the path is looked up under
/// the static root first and the script root second; the first existing
/// non-directory wins. Anything else, including any path with a `..`
/// segment, is 404.
pub async fn route(request: &Request, peer: SocketAddr, cfg: &Config) -> anyhow::Result<Response> {
    if request.path.is_empty() {
        let index = cfg.staticfiles.join("index.html");
        return static_files::serve(request, &index, Some(TEXT_HTML), cfg).await;
    }

    if escapes_root(&request.path) {
        tracing::warn!(peer = %peer, path = %request.path, "Rejected path outside root");
        return error_page::respond(StatusCode::NOT_FOUND, cfg).await;
    }

    let file = resolve(&cfg.staticfiles, &request.path);
    if is_file(&file).await {
        tracing::debug!(path = %request.path, "Serving static file");
        return static_files::serve(request, &file, request.content_type, cfg).await;
    }

    let script = resolve(&cfg.cgibin, &request.path);
    if is_file(&script).await {
        tracing::debug!(path = %request.path, "Running CGI script");
        return cgi::serve(request, &script, peer, cfg).await;
    }

    tracing::debug!(path = %request.path, "No such resource");
    error_page::respond(StatusCode::NOT_FOUND, cfg).await
}

/// Joins a request path onto `root`. A leading `/` left in the path does not
/// make it absolute.
pub fn resolve(root: &Path, path: &str) -> PathBuf {
    root.join(path.trim_start_matches('/'))
}

fn escapes_root(path: &str) -> bool {
    Path::new(path)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| !meta.is_dir())
        .unwrap_or(false)
}
