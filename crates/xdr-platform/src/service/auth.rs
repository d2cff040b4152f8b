//! Authentication Service
//!
//! Password login and session token issuance. Identities come from an
//! [`IdentityStore`]; request authentication itself is stateless and only
//! needs the [`TokenService`].

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::User;
use crate::error::{PlatformError, Result};
use crate::repository::IdentityStore;
use crate::service::authorization::AuthContext;
use crate::service::password::PasswordService;
use crate::service::token::TokenService;

const BAD_CREDENTIALS: &str = "Incorrect username or password";

/// A freshly issued bearer token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    identities: Arc<dyn IdentityStore>,
    passwords: PasswordService,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        passwords: PasswordService,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            identities,
            passwords,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Check credentials. Unknown user and wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .identities
            .find(username)
            .await?
            .ok_or_else(|| PlatformError::unauthorized(BAD_CREDENTIALS))?;

        if !self.passwords.verify_password(password, &user.password_hash)? {
            debug!(username = %username, "Password mismatch");
            return Err(PlatformError::unauthorized(BAD_CREDENTIALS));
        }

        if !user.active {
            return Err(PlatformError::unauthorized("Inactive user"));
        }

        info!(username = %user.username, role = %user.role, "User authenticated");
        Ok(user)
    }

    pub fn issue_token(&self, user: &User) -> Result<IssuedToken> {
        let access_token = self.tokens.issue_default(&user.username, user.role)?;
        Ok(IssuedToken {
            access_token,
            expires_in: self.tokens.default_ttl().num_seconds(),
        })
    }

    /// Load the caller's current account. Fails if it has since been
    /// removed or deactivated.
    pub async fn current_user(&self, auth: &AuthContext) -> Result<User> {
        let user = self
            .identities
            .find(&auth.username)
            .await?
            .ok_or_else(|| PlatformError::unauthorized("User no longer exists"))?;

        if !user.active {
            return Err(PlatformError::unauthorized("Inactive user"));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::service::password::Argon2Config;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::collections::HashMap;

    struct InMemoryIdentities(HashMap<String, User>);

    #[async_trait]
    impl IdentityStore for InMemoryIdentities {
        async fn find(&self, username: &str) -> Result<Option<User>> {
            Ok(self.0.get(username).cloned())
        }
    }

    fn service() -> AuthService {
        let passwords = PasswordService::new(Argon2Config {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();

        let mut users = HashMap::new();
        let hash = passwords.hash_password("analyst123").unwrap();
        users.insert(
            "analyst".to_string(),
            User::new("USR-002", "analyst", "analyst@xdr.local", "Security Analyst", Role::Analyst, hash.clone()),
        );
        let mut inactive = User::new("USR-004", "gone", "gone@xdr.local", "Gone", Role::Viewer, hash);
        inactive.deactivate();
        users.insert("gone".to_string(), inactive);

        AuthService::new(
            Arc::new(InMemoryIdentities(users)),
            passwords,
            Arc::new(TokenService::new("test-secret", Duration::minutes(60))),
        )
    }

    #[tokio::test]
    async fn test_authenticate_and_issue() {
        let svc = service();
        let user = svc.authenticate("analyst", "analyst123").await.unwrap();
        let issued = svc.issue_token(&user).unwrap();

        assert_eq!(issued.expires_in, 3600);
        let identity = svc.tokens().verify(&issued.access_token).unwrap();
        assert_eq!(identity.username, "analyst");
        assert_eq!(identity.role, Role::Analyst);
    }

    #[tokio::test]
    async fn test_bad_credentials_are_unauthorized() {
        let svc = service();
        for (username, password) in [("analyst", "wrong"), ("nobody", "analyst123")] {
            let err = svc.authenticate(username, password).await.unwrap_err();
            assert!(matches!(err, PlatformError::Unauthorized { ref message } if message == BAD_CREDENTIALS));
        }
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_log_in() {
        let err = service().authenticate("gone", "analyst123").await.unwrap_err();
        assert!(matches!(err, PlatformError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_current_user() {
        let svc = service();
        let user = svc
            .current_user(&AuthContext::new("analyst", Role::Analyst))
            .await
            .unwrap();
        assert_eq!(user.id, "USR-002");

        assert!(svc.current_user(&AuthContext::new("ghost", Role::Admin)).await.is_err());
        assert!(svc.current_user(&AuthContext::new("gone", Role::Viewer)).await.is_err());
    }
}
