//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use lingua_infra::{AdminCredentials, DatabaseConfig, JwtConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub site: SiteConfig,
    /// `DATABASE_URL`; takes precedence over `content_dir`.
    pub database: Option<DatabaseConfig>,
    /// `CONTENT_DIR`; markdown files with front matter.
    pub content_dir: Option<PathBuf>,
    pub admin: Option<AdminCredentials>,
    pub jwt: JwtConfig,
}

/// Public identity of the site, used for canonical URLs and JSON-LD.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub url: String,
    pub name: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let database = non_empty("DATABASE_URL").map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
            {
                config.max_connections = max;
            }
            if let Some(min) = env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
            {
                config.min_connections = min;
            }
            config
        });

        let site = SiteConfig {
            url: non_empty("SITE_URL")
                .unwrap_or_else(|| format!("http://{}:{}", host, port))
                .trim_end_matches('/')
                .to_string(),
            name: non_empty("SITE_NAME").unwrap_or_else(|| "Lingua".to_string()),
        };

        Self {
            host,
            port,
            site,
            database,
            content_dir: non_empty("CONTENT_DIR").map(PathBuf::from),
            admin: AdminCredentials::from_env(),
            jwt: JwtConfig::from_env(),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
