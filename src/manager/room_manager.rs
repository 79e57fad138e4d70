use tracing::{debug, warn};

use super::Room;
use crate::error::{is_unique_violation, Result};
use crate::utils::contains_pattern;

pub struct RoomManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> RoomManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

impl RoomManager<'_> {
    /// Returns `false` when a room called `name` already exists.
    pub async fn create_room(&self, name: &str, owner: &str) -> Result<bool> {
        let inserted = sqlx::query("INSERT INTO rooms (name, owner) VALUES (?, ?)")
            .bind(name)
            .bind(owner)
            .execute(self.pool)
            .await;

        match inserted {
            Ok(_) => {
                debug!(room = name, owner, "room created");
                Ok(true)
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(room = name, "room name already taken");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_room(&self, name: &str) -> Result<Option<Room>> {
        Ok(sqlx::query_as::<_, Room>(
            "SELECT id, name, owner, created_at FROM rooms WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?)
    }

    /// Room names, newest first.
    pub async fn get_all_rooms(&self) -> Result<Vec<String>> {
        Ok(
            sqlx::query_scalar("SELECT name FROM rooms ORDER BY created_at DESC, id DESC")
                .fetch_all(self.pool)
                .await?,
        )
    }

    pub async fn room_exists(&self, name: &str) -> Result<bool> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT 1 FROM rooms WHERE name = ?")
                .bind(name)
                .fetch_optional(self.pool)
                .await?
                .is_some(),
        )
    }

    /// Room names containing `query`, newest first. ASCII letters match case-insensitively.
    pub async fn search_rooms(&self, query: &str) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar(
            "SELECT name FROM rooms WHERE name LIKE ? ESCAPE '\\' ORDER BY created_at DESC, id DESC",
        )
        .bind(contains_pattern(query))
        .fetch_all(self.pool)
        .await?)
    }

    pub async fn get_room_owner(&self, name: &str) -> Result<Option<String>> {
        Ok(sqlx::query_scalar("SELECT owner FROM rooms WHERE name = ?")
            .bind(name)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Deletes the room's messages, then the room, in one transaction.
    pub async fn delete_room(&self, name: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let messages = sqlx::query("DELETE FROM messages WHERE room_name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM rooms WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(room = name, messages, "room deleted");
        Ok(())
    }
}
