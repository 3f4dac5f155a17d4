//! cgiserv - static file and CGI server
//!
//! Serves files from a document root and runs scripts from a CGI directory,
//! one request per connection.

pub mod config;
pub mod handler;
pub mod http;
pub mod server;
