use std::path::Path;

use crate::config::Config;
use crate::handler::error_page;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

/// Serves `file` with the given content type.
///
/// A file without a known content type is never served (404). A read failure
/// answers 501.
pub async fn serve(
    request: &Request,
    file: &Path,
    content_type: Option<&str>,
    cfg: &Config,
) -> anyhow::Result<Response> {
    let Some(content_type) = content_type else {
        tracing::debug!(path = %file.display(), "No content type for file");
        return error_page::respond(StatusCode::NOT_FOUND, cfg).await;
    };

    let contents = match tokio::fs::read(file).await {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(path = %file.display(), error = %e, "Failed to read static file");
            return error_page::respond(StatusCode::NOT_IMPLEMENTED, cfg).await;
        }
    };

    let response = Response::new(StatusCode::OK)
        .header("Content-Type", content_type)
        .encoded_body(request, contents)?
        .build();

    Ok(response)
}
