use tracing::{debug, warn};

use super::User;
use crate::error::{is_unique_violation, Result};

#[derive(Clone)]
pub struct UserManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> UserManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

// Passwords are compared as stored. Callers that hash credentials must pass the hash here too.
fn compare_password(a: &str, b: &str) -> bool {
    a == b
}

impl UserManager<'_> {
    /// Returns `false` when `username` is already taken.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<bool> {
        let inserted = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password)
            .execute(self.pool)
            .await;

        match inserted {
            Ok(_) => {
                debug!(username, "user created");
                Ok(true)
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(username, "username already taken");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user(&self, username: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?)
    }

    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        Ok(self.get_user(username).await?.is_some())
    }

    /// The user, if one exists with exactly this password.
    pub async fn check_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        Ok(self
            .get_user(username)
            .await?
            .filter(|user| compare_password(&user.password, password)))
    }
}
