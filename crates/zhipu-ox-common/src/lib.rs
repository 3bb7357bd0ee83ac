#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Shared HTTP plumbing for the zhipu-ox client
//!
//! Request building with bearer auth and per-call deadlines, the error
//! taxonomy every call reports through, and the lenient Server-Sent Events
//! decoder used by the streaming chat endpoint.

pub mod error;
pub mod request_builder;
pub mod streaming;
pub mod usage;

pub use error::CommonRequestError;
pub use request_builder::{Endpoint, HttpMethod, RequestBuilder, RequestConfig, StreamOptions};
pub use streaming::{Frame, LineKind, SseParser, classify_line, decode_line};
pub use usage::TokenUsage;

/// Re-export common types for convenience
pub use futures_util::stream::BoxStream;
