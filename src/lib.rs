//! SQLite persistence for a chat application: user accounts, rooms, and the
//! text or file messages posted in them.
//!
//! ```no_run
//! # async fn demo() -> chat_store::Result<()> {
//! use chat_store::{MessagePayload, Store, StoreConfig};
//!
//! let store = Store::open(&StoreConfig::from_env()?).await?;
//! store.users().create_user("alice", "secret").await?;
//! store.rooms().create_room("lobby", "alice").await?;
//! let msg = store
//!     .chats()
//!     .add_message("lobby", "alice", MessagePayload::Text("hi".into()))
//!     .await?;
//! println!("{} at {:?}", msg.user, msg.created);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod store;
pub mod utils;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use manager::{
    FileData, FormattedMessage, MessageBody, MessagePayload, MessageRow, Room, User,
};
pub use store::Store;
