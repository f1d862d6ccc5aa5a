use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("{0}")]
    Validation(String),

    #[error("Note with id {0} not found")]
    NotFound(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl NotesError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, NotesError>;
