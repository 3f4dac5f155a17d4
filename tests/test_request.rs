use cgiserv::http::parser::ParseError;
use cgiserv::http::request::{Method, Request, RequestBuilder, extract_path};
use std::collections::HashMap;

fn get(target: &str) -> Request {
    RequestBuilder::new()
        .method("GET")
        .target(target)
        .build()
        .unwrap()
}

#[test]
fn test_extract_path_drops_mount_prefix() {
    assert_eq!(extract_path("/site/index.html"), "index.html");
    assert_eq!(extract_path("/site/css/main.css"), "css/main.css");
    assert_eq!(extract_path("/cgi/run.sh?x=1"), "run.sh");
}

#[test]
fn test_extract_path_single_segment_is_kept() {
    assert_eq!(extract_path("/index.html"), "index.html");
    assert_eq!(extract_path("/site/"), "site");
}

#[test]
fn test_extract_path_root_is_empty() {
    assert_eq!(extract_path("/"), "");
    assert_eq!(extract_path("/?a=1"), "");
    assert_eq!(extract_path(""), "");
}

#[test]
fn test_extract_path_strips_only_one_slash_each_side() {
    assert_eq!(extract_path("/site/docs/"), "docs");
    assert_eq!(extract_path("/site/docs//"), "docs/");
    assert_eq!(extract_path("//site/a.txt"), "site/a.txt");
}

#[test]
fn test_request_content_type_from_extension() {
    assert_eq!(get("/s/a.txt").content_type, Some("text/plain"));
    assert_eq!(get("/s/a.html").content_type, Some("text/html"));
    assert_eq!(get("/s/a.js").content_type, Some("application/javascript"));
    assert_eq!(get("/s/a.css").content_type, Some("text/css"));
    assert_eq!(get("/s/a.png").content_type, Some("image/png"));
    assert_eq!(get("/s/a.jpeg").content_type, Some("image/jpeg"));
    assert_eq!(get("/s/a.jpg").content_type, Some("image/jpeg"));
    assert_eq!(get("/s/a.xml").content_type, Some("text/xml"));
}

#[test]
fn test_request_content_type_unknown_or_missing() {
    assert_eq!(get("/s/archive.zip").content_type, None);
    assert_eq!(get("/s/README").content_type, None);
    assert_eq!(get("/").content_type, None);
}

#[test]
fn test_request_content_type_uses_last_component() {
    assert_eq!(get("/s/v1.2/page.html").content_type, Some("text/html"));
    assert_eq!(get("/s/v1.2/page").content_type, None);
}

#[test]
fn test_request_raw_query() {
    assert_eq!(get("/s/run.sh?a=1&b=2").query(), "a=1&b=2");
    assert_eq!(get("/s/run.sh").query(), "");
    assert_eq!(get("/s/run.sh?").query(), "");
    assert_eq!(get("/s/run.sh?a=1?b").query(), "a=1?b");
}

#[test]
fn test_request_query_map() {
    let map = get("/s/run.sh?a=1&b=2").query_map().unwrap();

    let expected: HashMap<String, String> = [("a", "1"), ("b", "2")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(map, expected);
}

#[test]
fn test_request_query_map_absent_query() {
    assert!(get("/s/run.sh").query_map().unwrap().is_empty());
}

#[test]
fn test_request_query_map_last_duplicate_wins() {
    let map = get("/s/run.sh?a=1&a=2").query_map().unwrap();
    assert_eq!(map.get("a").unwrap(), "2");
}

#[test]
fn test_request_query_map_value_with_equals() {
    let map = get("/s/run.sh?expr=x=y&empty=").query_map().unwrap();

    assert_eq!(map.get("expr").unwrap(), "x=y");
    assert_eq!(map.get("empty").unwrap(), "");
}

#[test]
fn test_request_query_map_pair_without_equals() {
    let result = get("/s/run.sh?a=1&flag").query_map();
    assert!(matches!(result, Err(ParseError::InvalidQuery)));
}

#[test]
fn test_request_header_retrieval() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .target("/")
        .header("Host", "example.com")
        .header("Content-Type", "application/json")
        .build()
        .unwrap();

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("host"), None);
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_accepts_gzip() {
    let with = |value: &str| {
        RequestBuilder::new()
            .method("GET")
            .target("/")
            .header("Accept-Encoding", value)
            .build()
            .unwrap()
    };

    assert!(with("gzip").accepts_gzip());
    assert!(with("deflate, gzip;q=0.5").accepts_gzip());
    assert!(!with("deflate, br").accepts_gzip());
    assert!(!get("/").accepts_gzip());
}

#[test]
fn test_request_builder_requires_method_and_target() {
    assert!(RequestBuilder::new().target("/").build().is_err());
    assert!(RequestBuilder::new().method("GET").build().is_err());
}

#[test]
fn test_request_builder_defaults() {
    let req = get("/");

    assert_eq!(req.version, "HTTP/1.1");
    assert!(req.headers.is_empty());
    assert!(req.body.is_none());
}

#[test]
fn test_request_builder_empty_body_is_none() {
    let req = RequestBuilder::new()
        .method("POST")
        .target("/")
        .body("")
        .build()
        .unwrap();
    assert!(req.body.is_none());
}

#[test]
fn test_request_method_from_string() {
    assert_eq!(Method::from("GET"), Method::GET);
    assert_eq!(Method::from("POST"), Method::POST);
    assert_eq!(Method::from("get"), Method::Extension("get".to_string()));
    assert_eq!(Method::from("PROPFIND").as_str(), "PROPFIND");
    assert_eq!(Method::DELETE.as_str(), "DELETE");
}
