use std::env::VarError;
use std::path::Path;

use crate::error::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:chat_app.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }

    /// Reads `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`, loading a `.env` file from the
    /// working directory (or a parent) first if there is one. Unset variables fall back to
    /// the defaults; set but unreadable ones are an [`Error::Config`].
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(Error::Config(format!(".env: {e}"))),
        }
        Self::from_process_env()
    }

    /// Like [`StoreConfig::from_env`], but loads the given file instead of searching for `.env`.
    /// Variables already set in the process take precedence over the file.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        dotenvy::from_path(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_process_env()
    }

    fn from_process_env() -> Result<Self> {
        let database_url =
            env_var("DATABASE_URL")?.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let max_connections = match env_var("DATABASE_MAX_CONNECTIONS")? {
            Some(raw) => parse_max_connections(&raw)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}

fn env_var(key: &str) -> Result<Option<String>> {
    match dotenvy::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(e) => Err(Error::Config(format!("{key}: {e}"))),
    }
}

fn parse_max_connections(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(Error::Config(
            "DATABASE_MAX_CONNECTIONS must be at least 1".to_owned(),
        )),
        Ok(n) => Ok(n),
        Err(e) => Err(Error::Config(format!(
            "DATABASE_MAX_CONNECTIONS={raw:?}: {e}"
        ))),
    }
}
