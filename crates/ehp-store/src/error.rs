use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    InvalidData(String),
    /// No dataset with this name in the catalog.
    NotFound(String),
    /// No name given and none could be picked from the config or catalog.
    NoDataset(String),
    /// The dataset failed a fatal integrity check.
    Integrity(String),
    Config(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "SQLite error: {e}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            StoreError::NotFound(name) => write!(f, "dataset not found: {name}"),
            StoreError::NoDataset(msg) => write!(f, "no dataset selected: {msg}"),
            StoreError::Integrity(msg) => write!(f, "integrity check failed: {msg}"),
            StoreError::Config(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(e: toml::de::Error) -> Self {
        StoreError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
