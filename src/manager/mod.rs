use serde::Serialize;
use sqlx::types::chrono::NaiveDateTime;

pub mod chat_manager;
pub mod room_manager;
pub mod user_manager;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub created_at: NaiveDateTime,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub owner: String,
    pub created_at: NaiveDateTime,
}

/// A `messages` row as stored. `is_file` decides which of the optional columns are meaningful.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub room_name: String,
    pub username: String,
    pub content: Option<String>,
    pub file_name: Option<String>,
    pub file_extension: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<String>,
    pub file_binary: Option<String>,
    pub is_file: bool,
    /// Kept as the text SQLite stored; legacy rows may carry other layouts or NULL.
    pub created_at: Option<String>,
}

/// A file attachment whose bytes were already text-encoded by the upload layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    pub name: String,
    pub extension: String,
    pub file_type: String,
    pub size: String,
    pub binary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    Text(String),
    File(FileData),
}

impl From<FileData> for MessagePayload {
    fn from(file: FileData) -> Self {
        MessagePayload::File(file)
    }
}

impl From<String> for MessagePayload {
    fn from(content: String) -> Self {
        MessagePayload::Text(content)
    }
}

impl From<&str> for MessagePayload {
    fn from(content: &str) -> Self {
        MessagePayload::Text(content.to_owned())
    }
}

/// The view of a message handed to the UI layer. Serializes to a flat object:
/// `{user, created, content}` or `{user, created, extention, name, type, size, binary}`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FormattedMessage {
    pub user: String,
    pub created: Option<String>,
    #[serde(flatten)]
    pub body: MessageBody,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageBody {
    Text {
        content: Option<String>,
    },
    File {
        // Existing consumers read this key with this spelling.
        #[serde(rename = "extention")]
        extension: Option<String>,
        name: Option<String>,
        #[serde(rename = "type")]
        file_type: Option<String>,
        size: Option<String>,
        binary: Option<String>,
    },
}

impl From<MessageRow> for FormattedMessage {
    fn from(row: MessageRow) -> Self {
        let body = if row.is_file {
            MessageBody::File {
                extension: row.file_extension,
                name: row.file_name,
                file_type: row.file_type,
                size: row.file_size,
                binary: row.file_binary,
            }
        } else {
            MessageBody::Text {
                content: row.content,
            }
        };

        FormattedMessage {
            user: row.username,
            created: row.created_at,
            body,
        }
    }
}
