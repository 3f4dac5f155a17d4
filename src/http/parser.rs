use crate::http::headers::Headers;
use crate::http::request::{Request, RequestBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Request line missing its target, or head is not UTF-8
    InvalidRequest,
    /// Header line without a `": "` separator
    InvalidHeader,
    /// Query pair without `=`
    InvalidQuery,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidRequest => write!(f, "malformed request line"),
            ParseError::InvalidHeader => write!(f, "malformed header line"),
            ParseError::InvalidQuery => write!(f, "malformed query string"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses a complete request buffer.
///
/// Everything after the blank line that ends the head is the body; there is
/// no framing check here, the connection decides when it has read enough.
pub fn parse_http_request(buf: &[u8]) -> Result<Request, ParseError> {
    let (header_bytes, body_bytes) = match find_headers_end(buf) {
        Some((end, sep_len)) => (&buf[..end], &buf[end + sep_len..]),
        None => (buf, &[][..]),
    };

    let head = std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = head.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split(' ');

    let method = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().unwrap_or("HTTP/1.1");

    // Headers
    let mut headers = Headers::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(": ").ok_or(ParseError::InvalidHeader)?;
        headers.insert(key, value);
    }

    RequestBuilder::new()
        .method(method)
        .target(target)
        .version(version)
        .headers(headers)
        .body(String::from_utf8_lossy(body_bytes))
        .build()
        .map_err(|_| ParseError::InvalidRequest)
}

/// Total byte length of the request in `buf`, once that can be known.
///
/// Returns `None` until the head separator has arrived. After that the length
/// is the head plus `Content-Length` bytes of body (zero when the header is
/// absent or unreadable). A length too large to represent saturates at
/// `usize::MAX`.
pub fn expected_length(buf: &[u8]) -> Option<usize> {
    let (end, sep_len) = find_headers_end(buf)?;

    let content_length = std::str::from_utf8(&buf[..end])
        .ok()
        .and_then(|head| {
            head.split('\n')
                .skip(1)
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .filter_map(|l| l.split_once(": "))
                .filter(|(k, _)| *k == "Content-Length")
                .last()
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        })
        .unwrap_or(0);

    Some(
        (end + sep_len)
            .checked_add(content_length)
            .unwrap_or(usize::MAX),
    )
}

/// Finds the blank line ending the head: `\r\n\r\n`, or `\n\n` from clients
/// that use bare line feeds. Returns its offset and length.
fn find_headers_end(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n");
    let lf = buf.windows(2).position(|w| w == b"\n\n");

    match (crlf, lf) {
        (Some(c), Some(l)) if l < c => Some((l, 2)),
        (Some(c), _) => Some((c, 4)),
        (None, Some(l)) => Some((l, 2)),
        (None, None) => None,
    }
}
