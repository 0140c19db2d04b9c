//! Application state - shared across all handlers.

use std::sync::Arc;

use lingua_core::BlogService;
use lingua_core::ports::{Authenticator, ContentRenderer, PostRepository, TokenService};
use lingua_infra::{
    AdminAuthenticator, Argon2PasswordService, FilePostRepository, InMemoryPostRepository,
    JwtTokenService, MarkdownRenderer,
};

#[cfg(feature = "postgres")]
use lingua_infra::SeaOrmPostRepository;
#[cfg(feature = "postgres")]
use lingua_infra::database::connect;

use crate::config::{AppConfig, SiteConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: BlogService,
    pub authenticator: Arc<dyn Authenticator>,
    pub tokens: Arc<dyn TokenService>,
    pub site: SiteConfig,
    /// Which post store is live: `postgres`, `files` or `memory`.
    pub store: &'static str,
}

impl AppState {
    /// Build the application state from configuration, choosing the post store.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let (repo, store) = open_store(config).await?;
        let renderer: Arc<dyn ContentRenderer> = Arc::new(MarkdownRenderer::new());

        let authenticator = Arc::new(AdminAuthenticator::new(
            config.admin.clone(),
            Arc::new(Argon2PasswordService::new()),
        ));
        let tokens = Arc::new(JwtTokenService::new(config.jwt.clone()));

        tracing::info!(store, "Application state initialized");

        Ok(Self {
            blog: BlogService::new(repo, renderer),
            authenticator,
            tokens,
            site: config.site.clone(),
            store,
        })
    }
}

async fn open_store(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn PostRepository>, &'static str)> {
    #[cfg(feature = "postgres")]
    if let Some(db) = &config.database {
        let conn = connect(db).await?;
        return Ok((Arc::new(SeaOrmPostRepository::new(conn)), "postgres"));
    }

    #[cfg(not(feature = "postgres"))]
    if config.database.is_some() {
        tracing::warn!("DATABASE_URL is set but the postgres feature is disabled; ignoring it");
    }

    if let Some(dir) = &config.content_dir {
        let repo = FilePostRepository::open(dir).await?;
        return Ok((Arc::new(repo), "files"));
    }

    tracing::warn!(
        "Neither DATABASE_URL nor CONTENT_DIR is set. Posts are kept in memory and lost on restart."
    );
    Ok((Arc::new(InMemoryPostRepository::new()), "memory"))
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use lingua_core::ports::PasswordService;
    use lingua_infra::{AdminCredentials, JwtConfig};

    pub const ADMIN_EMAIL: &str = "admin@lingua.test";
    pub const ADMIN_PASSWORD: &str = "correct horse battery";

    /// In-memory state with a known administrator.
    pub fn state() -> AppState {
        let passwords = Arc::new(Argon2PasswordService::new());
        let hash = passwords.hash(ADMIN_PASSWORD).unwrap();

        AppState {
            blog: BlogService::new(
                Arc::new(InMemoryPostRepository::new()),
                Arc::new(MarkdownRenderer::new()),
            ),
            authenticator: Arc::new(AdminAuthenticator::new(
                Some(AdminCredentials::new(ADMIN_EMAIL, hash)),
                passwords,
            )),
            tokens: Arc::new(JwtTokenService::new(JwtConfig {
                secret: "test-secret".to_string(),
                ..JwtConfig::default()
            })),
            site: SiteConfig {
                url: "https://lingua.test".to_string(),
                name: "Lingua".to_string(),
            },
            store: "memory",
        }
    }

    pub fn admin_bearer(state: &AppState) -> String {
        let token = state
            .tokens
            .generate_token(ADMIN_EMAIL, vec![lingua_core::domain::ADMIN_ROLE.to_string()])
            .unwrap();
        format!("Bearer {}", token)
    }
}
