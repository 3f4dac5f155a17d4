//! Canned error responses read from `<staticfiles>/<code>.html`.

use anyhow::Context;

use crate::config::Config;
use crate::http::response::{Response, StatusCode};

/// Builds the error response for `status`.
///
/// There is no built-in fallback: when the page cannot be read the error is
/// returned to the caller and the connection ends without a response.
pub async fn respond(status: StatusCode, cfg: &Config) -> anyhow::Result<Response> {
    let page = cfg.staticfiles.join(format!("{}.html", status.as_u16()));

    let body = tokio::fs::read(&page)
        .await
        .with_context(|| format!("error page {} unreadable", page.display()))?;

    Ok(Response::html(status, body))
}
