//! Single-administrator login backed by an Argon2 hash from the environment.

use std::sync::Arc;

use async_trait::async_trait;

use lingua_core::domain::AuthContext;
use lingua_core::ports::{AuthError, Authenticator, PasswordService};

/// Administrator email and password hash.
#[derive(Debug, Clone, Default)]
pub struct AdminCredentials {
    pub email: String,
    pub password_hash: String,
}

impl AdminCredentials {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Read `ADMIN_EMAIL` and `ADMIN_PASSWORD_HASH`. `None` when either is unset or blank.
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("ADMIN_EMAIL").ok()?;
        let password_hash = std::env::var("ADMIN_PASSWORD_HASH").ok()?;
        let credentials = Self::new(email.trim(), password_hash.trim());
        credentials.is_complete().then_some(credentials)
    }

    fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.password_hash.is_empty()
    }
}

/// Checks a login against the configured administrator.
pub struct AdminAuthenticator {
    credentials: Option<AdminCredentials>,
    passwords: Arc<dyn PasswordService>,
}

impl AdminAuthenticator {
    pub fn new(credentials: Option<AdminCredentials>, passwords: Arc<dyn PasswordService>) -> Self {
        if credentials.is_none() {
            tracing::warn!("No administrator configured; login is disabled");
        }
        Self {
            credentials: credentials.filter(AdminCredentials::is_complete),
            passwords,
        }
    }
}

#[async_trait]
impl Authenticator for AdminAuthenticator {
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthContext, AuthError> {
        let admin = self.credentials.as_ref().ok_or(AuthError::NotConfigured)?;

        // Hash first so a wrong email costs the same as a wrong password.
        let password_ok = self.passwords.verify(password, &admin.password_hash)?;
        let email_ok = email.trim().eq_ignore_ascii_case(&admin.email);

        if password_ok && email_ok {
            tracing::info!("Administrator logged in");
            Ok(AuthContext::admin(admin.email.clone()))
        } else {
            tracing::warn!("Rejected login attempt");
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2PasswordService;

    fn authenticator() -> AdminAuthenticator {
        let passwords = Arc::new(Argon2PasswordService::new());
        let hash = passwords.hash("correct horse").unwrap();
        AdminAuthenticator::new(
            Some(AdminCredentials::new("admin@lingua.test", hash)),
            passwords,
        )
    }

    #[tokio::test]
    async fn test_valid_login_yields_admin() {
        let ctx = authenticator()
            .authenticate("Admin@Lingua.test", "correct horse")
            .await
            .unwrap();

        assert!(ctx.is_admin());
        assert_eq!(ctx.subject.as_deref(), Some("admin@lingua.test"));
    }

    #[tokio::test]
    async fn test_wrong_password_or_email() {
        let auth = authenticator();

        assert!(matches!(
            auth.authenticate("admin@lingua.test", "battery staple").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("someone@lingua.test", "correct horse").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_login() {
        let auth = AdminAuthenticator::new(None, Arc::new(Argon2PasswordService::new()));
        assert!(matches!(
            auth.authenticate("admin@lingua.test", "x").await,
            Err(AuthError::NotConfigured)
        ));

        let blank = AdminAuthenticator::new(
            Some(AdminCredentials::new("", "")),
            Arc::new(Argon2PasswordService::new()),
        );
        assert!(matches!(
            blank.authenticate("", "").await,
            Err(AuthError::NotConfigured)
        ));
    }
}
