use std::collections::HashMap;

use crate::http::headers::Headers;
use crate::http::mime;
use crate::http::parser::ParseError;

/// HTTP request methods.
///
/// The server never rejects a method: anything it does not know by name is
/// kept verbatim in `Extension` and handed on to CGI scripts unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    OPTIONS,
    PATCH,
    Extension(String),
}

/// A parsed HTTP request.
///
/// Built once per connection and never modified afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The raw request target, path and query (e.g. "/site/index.html?a=1")
    pub target: String,
    /// Routing path derived from the target, see [`extract_path`]
    pub path: String,
    /// Protocol version as sent by the client
    pub version: String,
    /// Request headers, case-sensitive names
    pub headers: Headers,
    /// Request body, if any bytes followed the head
    pub body: Option<String>,
    /// Content type resolved from the path's extension
    pub content_type: Option<&'static str>,
}

/// Builder for constructing Request objects.
///
/// The routing path and content type are derived from the target in `build`.
pub struct RequestBuilder {
    method: Option<Method>,
    target: Option<String>,
    version: Option<String>,
    headers: Headers,
    body: Option<String>,
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Extension(other) => other,
        }
    }
}

impl From<&str> for Method {
    /// Case-sensitive: `"get"` becomes `Method::Extension("get")`.
    fn from(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            other => Method::Extension(other.to_string()),
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            target: None,
            version: None,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn method(mut self, method: impl Into<Method>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = (!body.is_empty()).then_some(body);
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let target = self.target.ok_or("target missing")?;
        let path = extract_path(&target);
        let content_type = mime::from_path(&path);

        Ok(Request {
            method: self.method.ok_or("method missing")?,
            target,
            path,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            body: self.body,
            content_type,
        })
    }
}

impl Request {
    /// Retrieves a header value by its exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Raw query string: everything after the first `?` of the target, or
    /// `""` when the target has none.
    pub fn query(&self) -> &str {
        self.target
            .split_once('?')
            .map(|(_, query)| query)
            .unwrap_or("")
    }

    /// Parses the query string into a map.
    ///
    /// Pairs are split on `&` and then on the first `=`, so `a=b=c` maps
    /// `a` to `b=c`. Later duplicates win. A pair without `=` is an error.
    pub fn query_map(&self) -> Result<HashMap<String, String>, ParseError> {
        let query = self.query();
        if query.is_empty() {
            return Ok(HashMap::new());
        }

        query
            .split('&')
            .map(|pair| {
                pair.split_once('=')
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .ok_or(ParseError::InvalidQuery)
            })
            .collect()
    }

    /// True when the client lists gzip anywhere in `Accept-Encoding`.
    pub fn accepts_gzip(&self) -> bool {
        self.header("Accept-Encoding")
            .map(|v| v.contains("gzip"))
            .unwrap_or(false)
    }
}

/// Derives the routing path from a request target.
///
/// The query is cut off and one leading and one trailing `/` removed. The
/// first remaining segment is a mount prefix and is dropped, so
/// `/site/css/main.css` routes to `css/main.css`. A target with a single
/// segment keeps it: `/index.html` routes to `index.html`.
pub fn extract_path(target: &str) -> String {
    let path = target.split('?').next().unwrap_or("");
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);

    match path.split_once('/') {
        Some((_, rest)) => rest.to_string(),
        None => path.to_string(),
    }
}
