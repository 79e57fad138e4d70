use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::manager::{
    chat_manager::ChatManager, room_manager::RoomManager, user_manager::UserManager,
};

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        password TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS rooms (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT UNIQUE NOT NULL,
        owner TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        room_name TEXT NOT NULL,
        username TEXT NOT NULL,
        content TEXT,
        file_name TEXT,
        file_extension TEXT,
        file_type TEXT,
        file_size TEXT,
        file_binary TEXT,
        is_file BOOLEAN DEFAULT 0,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (room_name) REFERENCES rooms(name)
    )",
    "CREATE INDEX IF NOT EXISTS idx_messages_room_created
        ON messages (room_name, created_at)",
];

/// Handle to the chat database.
///
/// Every manager call checks a connection out of the pool for a single statement and
/// returns it when the guard drops. An in-memory URL gives each pooled connection its
/// own database, so use `max_connections = 1` with `sqlite::memory:`.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            // room_name is checked by callers, not by the engine
            .foreign_keys(false)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        info!(
            "chat store opened at {} ({} connections max)",
            config.database_url, config.max_connections
        );
        Ok(Self { pool })
    }

    /// `connect` followed by `init`.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let store = Self::connect(config).await?;
        store.init().await?;
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the tables if they are absent. Existing tables are left untouched.
    pub async fn init(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!("chat store schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn users(&self) -> UserManager<'_> {
        UserManager::new(&self.pool)
    }

    pub fn rooms(&self) -> RoomManager<'_> {
        RoomManager::new(&self.pool)
    }

    pub fn chats(&self) -> ChatManager<'_> {
        ChatManager::new(&self.pool)
    }

    /// Waits for checked-out connections to come back, then closes every pooled connection.
    /// Later calls on this store or its clones fail with `sqlx::Error::PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
