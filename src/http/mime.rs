//! Extension based MIME type detection.

use std::path::Path;

/// Every file type the server will serve statically.
pub const MIME_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("js", "application/javascript"),
    ("css", "text/css"),
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("xml", "text/xml"),
];

pub const TEXT_HTML: &str = "text/html";

/// Looks up the content type for the extension of the last path component.
///
/// Returns `None` for a missing or unknown extension. The lookup is
/// case-sensitive, so `INDEX.HTML` has no content type.
pub fn from_path(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension()?.to_str()?;

    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}
