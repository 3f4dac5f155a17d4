use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::http::headers::Headers;
use crate::http::request::Request;

/// HTTP status code.
///
/// CGI scripts may answer with any three digit code, so this is an open set
/// with named constants for the codes the server produces itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const FOUND: StatusCode = StatusCode(302);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const NOT_IMPLEMENTED: StatusCode = StatusCode(501);

    /// Accepts any three digit code.
    pub fn from_u16(code: u16) -> Option<Self> {
        (100..=999).contains(&code).then_some(StatusCode(code))
    }

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use cgiserv::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the reason phrase the server uses for this code, or an empty
    /// string for codes it never produces on its own.
    ///
    /// # Example
    ///
    /// ```
    /// # use cgiserv::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NOT_FOUND.reason_phrase(), "File not found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            302 => "Found",
            400 => "Bad Request",
            404 => "File not found",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            _ => "",
        }
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    /// Text after the code on the status line
    pub reason: String,
    /// Headers in the order they go on the wire
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::OK)
///     .header("Content-Type", "text/html")
///     .encoded_body(&request, contents)?
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    reason: Option<String>,
    headers: Headers,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason: None,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Replaces the standard reason phrase, e.g. with a CGI script's message.
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Adds or replaces a header. New headers go after existing ones.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Appends every header from `headers`, keeping their order.
    pub fn headers(mut self, headers: &Headers) -> Self {
        for (k, v) in headers.iter() {
            self.headers.insert(k, v);
        }
        self
    }

    /// Sets the response body as is.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Sets the body, gzip-compressing it when the request accepts gzip.
    ///
    /// A compressed body gets `Content-Encoding: gzip` appended after the
    /// headers already set.
    pub fn encoded_body(self, request: &Request, body: Vec<u8>) -> std::io::Result<Self> {
        if request.accepts_gzip() {
            let compressed = gzip(&body)?;
            Ok(self.header("Content-Encoding", "gzip").body(compressed))
        } else {
            Ok(self.body(body))
        }
    }

    pub fn build(self) -> Response {
        let reason = self
            .reason
            .unwrap_or_else(|| self.status.reason_phrase().to_string());

        Response {
            status: self.status,
            reason,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    pub fn new(status: StatusCode) -> ResponseBuilder {
        ResponseBuilder::new(status)
    }

    /// A `text/html` page, as used for the canned error pages.
    pub fn html(status: StatusCode, body: Vec<u8>) -> Self {
        ResponseBuilder::new(status)
            .header("Content-Type", "text/html")
            .body(body)
            .build()
    }
}

/// Compresses `data` into a single gzip member.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
