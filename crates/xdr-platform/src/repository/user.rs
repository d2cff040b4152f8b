//! User Repository

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tokio::sync::Mutex;

use super::{format_id, next_sequence, parse_column};
use crate::domain::User;
use crate::error::Result;

const ID_PREFIX: &str = "USR-";
const COLUMNS: &str =
    "id, username, email, full_name, role, password_hash, active, created_at, updated_at";

/// Identity lookup used by authentication.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find(&self, username: &str) -> Result<Option<User>>;
}

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    id_lock: Arc<Mutex<()>>,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            id_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = ?", COLUMNS);
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?", COLUMNS);
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn find_all(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY id", COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_user).collect()
    }

    /// Allocate the next `USR-NNN` id and insert the user built from it.
    pub async fn create<F>(&self, build: F) -> Result<User>
    where
        F: FnOnce(String) -> User + Send,
    {
        let _guard = self.id_lock.lock().await;
        let seq = next_sequence(&self.pool, "users", ID_PREFIX).await?;
        let user = build(format_id(ID_PREFIX, seq));
        self.insert(&user).await?;
        Ok(user)
    }

    pub async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, full_name, role, password_hash, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Persist role, active flag and password.
    pub async fn update(&self, user: &User) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET role = ?, password_hash = ?, active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.active)
        .bind(user.updated_at)
        .bind(&user.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl IdentityStore for UserRepository {
    async fn find(&self, username: &str) -> Result<Option<User>> {
        self.find_by_username(username).await
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        role: parse_column(&role, "users.role")?,
        password_hash: row.try_get("password_hash")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::repository::test_pool;

    #[tokio::test]
    async fn test_create_allocates_sequential_ids() {
        let repo = UserRepository::new(test_pool().await);

        let first = repo
            .create(|id| User::new(id, "alice", "alice@xdr.local", "Alice", Role::Analyst, "h"))
            .await
            .unwrap();
        let second = repo
            .create(|id| User::new(id, "bob", "bob@xdr.local", "Bob", Role::Viewer, "h"))
            .await
            .unwrap();

        assert_eq!(first.id, "USR-001");
        assert_eq!(second.id, "USR-002");
    }

    #[tokio::test]
    async fn test_find_round_trips_fields() {
        let repo = UserRepository::new(test_pool().await);
        repo.insert(&User::new("USR-010", "carol", "carol@xdr.local", "Carol", Role::Admin, "hash"))
            .await
            .unwrap();

        let found = repo.find("carol").await.unwrap().unwrap();
        assert_eq!(found.id, "USR-010");
        assert_eq!(found.role, Role::Admin);
        assert!(found.active);
        assert!(repo.find_by_email("carol@xdr.local").await.unwrap().is_some());
        assert!(repo.find("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_persists_active_flag() {
        let repo = UserRepository::new(test_pool().await);
        let mut user = User::new("USR-001", "dave", "dave@xdr.local", "Dave", Role::Viewer, "h");
        repo.insert(&user).await.unwrap();

        user.deactivate();
        assert!(repo.update(&user).await.unwrap());
        assert!(!repo.find("dave").await.unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected_by_store() {
        let repo = UserRepository::new(test_pool().await);
        repo.insert(&User::new("USR-001", "erin", "e1@xdr.local", "Erin", Role::Viewer, "h"))
            .await
            .unwrap();
        let dup = User::new("USR-002", "erin", "e2@xdr.local", "Erin", Role::Viewer, "h");
        assert!(repo.insert(&dup).await.is_err());
    }
}
