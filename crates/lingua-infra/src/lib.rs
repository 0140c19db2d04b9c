//! # Lingua Infrastructure
//!
//! Concrete implementations of the ports defined in `lingua-core`:
//! post stores, the markdown renderer and authentication.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory and flat-file stores only
//! - `postgres` - PostgreSQL post store via SeaORM

pub mod auth;
pub mod database;
pub mod render;
pub mod store;

pub use auth::{AdminAuthenticator, AdminCredentials, Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::DatabaseConfig;
pub use render::MarkdownRenderer;
pub use store::{FilePostRepository, InMemoryPostRepository};

#[cfg(feature = "postgres")]
pub use database::SeaOrmPostRepository;
