use tracing::debug;

use super::{FormattedMessage, MessagePayload, MessageRow};
use crate::error::Result;

const MESSAGE_COLUMNS: &str = "id, room_name, username, content, file_name, file_extension, \
     file_type, file_size, file_binary, is_file, created_at";

pub struct ChatManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> ChatManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

impl ChatManager<'_> {
    /// Stores a message and returns it as read back, timestamp included.
    ///
    /// The room is not checked; callers make sure `room_name` exists. The `RETURNING`
    /// statement is stepped to completion so the insert is committed before this returns.
    pub async fn add_message(
        &self,
        room_name: &str,
        username: &str,
        payload: MessagePayload,
    ) -> Result<FormattedMessage> {
        let rows = match payload {
            MessagePayload::Text(content) => {
                sqlx::query_as::<_, MessageRow>(&format!(
                    "INSERT INTO messages (room_name, username, content, is_file) \
                     VALUES (?, ?, ?, 0) RETURNING {MESSAGE_COLUMNS}"
                ))
                .bind(room_name)
                .bind(username)
                .bind(content)
                .fetch_all(self.pool)
                .await?
            }
            MessagePayload::File(file) => {
                sqlx::query_as::<_, MessageRow>(&format!(
                    "INSERT INTO messages \
                     (room_name, username, file_name, file_extension, file_type, file_size, file_binary, is_file) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, 1) RETURNING {MESSAGE_COLUMNS}"
                ))
                .bind(room_name)
                .bind(username)
                .bind(file.name)
                .bind(file.extension)
                .bind(file.file_type)
                .bind(file.size)
                .bind(file.binary)
                .fetch_all(self.pool)
                .await?
            }
        };
        let row = rows.into_iter().next().ok_or(sqlx::Error::RowNotFound)?;

        debug!(
            room = room_name,
            user = username,
            id = row.id,
            is_file = row.is_file,
            "message added"
        );
        Ok(row.into())
    }

    /// Messages in `room_name`, oldest first.
    pub async fn get_room_messages(&self, room_name: &str) -> Result<Vec<FormattedMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE room_name = ? ORDER BY created_at ASC, id ASC"
        ))
        .bind(room_name)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(FormattedMessage::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::{room_manager::RoomManager, FileData, MessageBody};
    use crate::Store;

    async fn chats(pool: &sqlx::SqlitePool) -> ChatManager<'_> {
        let store = Store::from_pool(pool.clone());
        store.init().await.unwrap();
        store.rooms().create_room("general", "alice").await.unwrap();
        ChatManager::new(pool)
    }

    fn png() -> FileData {
        FileData {
            name: "a.png".into(),
            extension: "png".into(),
            file_type: "image/png".into(),
            size: "10".into(),
            binary: "AAAA".into(),
        }
    }

    #[sqlx::test(migrations = false)]
    async fn text_message_round_trip(pool: sqlx::SqlitePool) {
        let chats = chats(&pool).await;
        let added = chats
            .add_message("general", "alice", MessagePayload::Text("hi".into()))
            .await
            .unwrap();

        assert_eq!(added.user, "alice");
        assert_eq!(
            added.body,
            MessageBody::Text {
                content: Some("hi".into())
            }
        );
        assert_eq!(chats.get_room_messages("general").await.unwrap(), vec![added]);
    }

    #[sqlx::test(migrations = false)]
    async fn file_message_round_trip(pool: sqlx::SqlitePool) {
        let chats = chats(&pool).await;
        let added = chats
            .add_message("general", "bob", png().into())
            .await
            .unwrap();

        assert_eq!(
            added.body,
            MessageBody::File {
                extension: Some("png".into()),
                name: Some("a.png".into()),
                file_type: Some("image/png".into()),
                size: Some("10".into()),
                binary: Some("AAAA".into()),
            }
        );
        assert_eq!(chats.get_room_messages("general").await.unwrap(), vec![added]);
    }

    #[sqlx::test(migrations = false)]
    async fn messages_come_back_in_insertion_order(pool: sqlx::SqlitePool) {
        let chats = chats(&pool).await;
        chats.add_message("general", "alice", "one".into()).await.unwrap();
        chats.add_message("general", "bob", png().into()).await.unwrap();
        chats.add_message("general", "alice", "three".into()).await.unwrap();

        let messages = chats.get_room_messages("general").await.unwrap();
        let users: Vec<_> = messages.iter().map(|m| m.user.as_str()).collect();
        assert_eq!(users, vec!["alice", "bob", "alice"]);
        assert!(matches!(&messages[0].body, MessageBody::Text { content } if content.as_deref() == Some("one")));
        assert!(matches!(&messages[1].body, MessageBody::File { .. }));
        assert!(matches!(&messages[2].body, MessageBody::Text { content } if content.as_deref() == Some("three")));
    }

    #[sqlx::test(migrations = false)]
    async fn messages_are_scoped_to_room(pool: sqlx::SqlitePool) {
        let chats = chats(&pool).await;
        RoomManager::new(&pool).create_room("random", "bob").await.unwrap();
        chats.add_message("general", "alice", "here".into()).await.unwrap();
        chats.add_message("random", "alice", "there".into()).await.unwrap();

        assert_eq!(chats.get_room_messages("general").await.unwrap().len(), 1);
        assert_eq!(chats.get_room_messages("random").await.unwrap().len(), 1);
        assert!(chats.get_room_messages("empty").await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = false)]
    async fn null_content_reads_back_as_text(pool: sqlx::SqlitePool) {
        let chats = chats(&pool).await;
        sqlx::query("INSERT INTO messages (room_name, username) VALUES ('general', 'legacy')")
            .execute(&pool)
            .await
            .unwrap();

        let messages = chats.get_room_messages("general").await.unwrap();
        assert_eq!(messages[0].body, MessageBody::Text { content: None });
    }

    #[sqlx::test(migrations = false)]
    async fn stored_timestamp_passes_through_verbatim(pool: sqlx::SqlitePool) {
        let chats = chats(&pool).await;
        sqlx::query(
            "INSERT INTO messages (room_name, username, content, created_at) \
             VALUES ('general', 'old', 'fractional', '2024-01-01 10:00:00.123')",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO messages (room_name, username, content, created_at) \
             VALUES ('general', 'older', 'undated', NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let messages = chats.get_room_messages("general").await.unwrap();
        assert_eq!(messages.len(), 2);
        // NULL sorts first
        assert_eq!(messages[0].user, "older");
        assert_eq!(messages[0].created, None);
        assert_eq!(messages[1].user, "old");
        assert_eq!(messages[1].created.as_deref(), Some("2024-01-01 10:00:00.123"));
    }

    #[sqlx::test(migrations = false)]
    async fn added_message_carries_server_timestamp(pool: sqlx::SqlitePool) {
        let chats = chats(&pool).await;
        let added = chats.add_message("general", "alice", "hi".into()).await.unwrap();

        let created = added.created.expect("default timestamp is set");
        assert_eq!(created.len(), "YYYY-MM-DD HH:MM:SS".len());
    }
}
