/// Result alias that carries the custom [`ContourError`] type.
pub type Result<T> = std::result::Result<T, ContourError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum ContourError {
    /// A query was issued before any signal was loaded into the model.
    #[error("no signal has been loaded")]
    NotInitialized,
    /// Input violated a contract of the pipeline, e.g. a zero sample rate.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Requested zoom level does not exist in the pyramid.
    #[error("zoom level {0} is out of range")]
    ZoomLevelOutOfRange(usize),
    /// Free-form failure raised by the CLI or host glue.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed signal, flag or configuration JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl ContourError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for ContourError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for ContourError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
