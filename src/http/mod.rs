//! HTTP protocol implementation.
//!
//! A deliberately small subset of HTTP/1.1: one request per connection, no
//! keep-alive, no chunked bodies.
//!
//! # Architecture
//!
//! - **`connection`**: Reads one request, routes it, writes the response, closes
//! - **`parser`**: Parses request bytes into a [`request::Request`]
//! - **`request`**: Request representation, routing path and query helpers
//! - **`headers`**: Ordered, case-sensitive header collection
//! - **`response`**: Response representation, builder and gzip negotiation
//! - **`writer`**: Serializes and writes responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for the full request
//!        └──────┬──────┘
//!               │
//!        ┌──────┴────────────┐
//!        ▼                   ▼
//!  ┌────────────┐     ┌────────────┐
//!  │ Processing │     │  Rejected  │ ← Malformed or oversized request
//!  └─────┬──────┘     └─────┬──────┘
//!        └────────┬─────────┘
//!                 ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```
//!
//! # Wire format
//!
//! Response lines end in a bare `\n`. Requests may use `\r\n` or `\n`.

pub mod connection;
pub mod headers;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
