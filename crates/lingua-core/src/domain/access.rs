use serde::{Deserialize, Serialize};

/// Role granted to the site administrator.
pub const ADMIN_ROLE: &str = "admin";

/// Who is calling the facade. Built by the HTTP layer from a verified token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub subject: Option<String>,
    pub roles: Vec<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(subject: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            roles,
        }
    }

    pub fn admin(subject: impl Into<String>) -> Self {
        Self::new(subject, vec![ADMIN_ROLE.to_string()])
    }

    pub fn is_authenticated(&self) -> bool {
        self.subject.is_some()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.has_role(ADMIN_ROLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        assert!(!AuthContext::anonymous().is_authenticated());
        assert!(AuthContext::admin("a@b.c").is_admin());

        let editor = AuthContext::new("e@b.c", vec!["editor".to_string()]);
        assert!(editor.is_authenticated());
        assert!(!editor.is_admin());

        let forged = AuthContext {
            subject: None,
            roles: vec![ADMIN_ROLE.to_string()],
        };
        assert!(!forged.is_admin());
    }
}
