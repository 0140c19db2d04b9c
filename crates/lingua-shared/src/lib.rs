//! # Lingua Shared
//!
//! Wire types of the blog API: request and response bodies, query
//! parameters and RFC 7807 error documents.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
