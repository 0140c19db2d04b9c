//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod renderer;
mod repository;

pub use auth::{AuthError, Authenticator, PasswordService, TokenClaims, TokenService};
pub use renderer::ContentRenderer;
pub use repository::{PostRepository, newest_first};
