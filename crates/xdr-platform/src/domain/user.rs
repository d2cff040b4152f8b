//! User Identity

use chrono::{DateTime, Utc};

use super::Role;

/// An account that can authenticate against the platform.
///
/// Only role, active flag and password change after creation, and only
/// through administrative action.
#[derive(Debug, Clone)]
pub struct User {
    /// `USR-NNN`
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Argon2id PHC string
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
        role: Role,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            full_name: full_name.into(),
            role,
            password_hash: password_hash.into(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.updated_at = Utc::now();
    }
}
