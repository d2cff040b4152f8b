//! Account Registration

use crate::domain::{Role, User};
use crate::error::{PlatformError, Result};
use crate::repository::UserRepository;
use crate::service::password::PasswordService;

/// Input for a new account, validated before anything is stored.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
}

impl NewAccount {
    pub fn validate(&self) -> Result<()> {
        let len = self.username.chars().count();
        if !(3..=50).contains(&len) {
            return Err(PlatformError::validation("Username must be 3-50 characters"));
        }
        if !self
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(PlatformError::validation(
                "Username may only contain letters, digits, '_', '.' and '-'",
            ));
        }

        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(PlatformError::validation("Invalid email address")),
        }

        if self.full_name.trim().is_empty() {
            return Err(PlatformError::validation("Full name is required"));
        }
        if self.password.chars().count() < 8 {
            return Err(PlatformError::validation("Password must be at least 8 characters"));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct AccountService {
    users: UserRepository,
    passwords: PasswordService,
}

impl AccountService {
    pub fn new(users: UserRepository, passwords: PasswordService) -> Self {
        Self { users, passwords }
    }

    pub async fn register(&self, account: NewAccount) -> Result<User> {
        account.validate()?;

        if self.users.find_by_username(&account.username).await?.is_some() {
            return Err(PlatformError::conflict("Username already registered"));
        }
        if self.users.find_by_email(&account.email).await?.is_some() {
            return Err(PlatformError::conflict("Email already registered"));
        }

        let hash = self.passwords.hash_password(&account.password)?;
        self.users
            .create(|id| {
                User::new(
                    id,
                    account.username,
                    account.email,
                    account.full_name,
                    account.role,
                    hash,
                )
            })
            .await
    }
}
