//! Error types for the launcher core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid gesture handler: {0}")]
    GestureHandler(#[from] serde_json::Error),

    #[error("background executor error: {0}")]
    Executor(String),

    #[error("property submission rejected: background loop is gone")]
    SubmissionRejected,
}

pub type Result<T> = std::result::Result<T, Error>;
