use thiserror::Error;

pub type Result<T> = std::result::Result<T, AbilityError>;

#[derive(Error, Debug)]
pub enum AbilityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Another list operation is already in flight")]
    Busy,

    #[error("{0}")]
    Other(String),
}

impl AbilityError {
    /// Errors raised while talking to the remote ability listing.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::Decode { .. } | Self::InvalidCursor(_)
        )
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
