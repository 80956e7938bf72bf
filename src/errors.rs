use thiserror::Error;

#[derive(Debug, Error)]
pub enum StarlessError {
    #[error("Folder already exists!")]
    FolderExists(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("No handler registered for function: {0}")]
    MissingHandler(String),

    #[error("Unknown project: {0}")]
    UnknownProject(String),

    #[error("Invalid template definition: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Failure raised by a user handler while serving a request.
///
/// These are never retried; the hosting entrypoint decides how they surface.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Handler failed: {0}")]
    Failed(String),

    #[error("Handler returned an invalid result: {0}")]
    InvalidResult(String),

    #[error(transparent)]
    Adapter(#[from] StarlessError),
}

impl From<anyhow::Error> for HandlerError {
    fn from(error: anyhow::Error) -> Self {
        HandlerError::Failed(error.to_string())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        HandlerError::InvalidResult(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StarlessError>;
