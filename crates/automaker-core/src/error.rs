use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutomakerError {
    #[error("invalid settings update: {0}")]
    InvalidUpdate(String),

    #[error("{0} is required")]
    MissingField(String),

    #[error("unknown credential provider '{0}': expected anthropic, google, or openai")]
    UnknownProvider(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AutomakerError>;
