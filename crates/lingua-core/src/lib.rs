//! # Lingua Core
//!
//! The domain layer of the Lingua blog.
//! Post model, search engine and the blog facade, with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod search;
pub mod seo;
pub mod service;

pub use error::DomainError;
pub use service::BlogService;
