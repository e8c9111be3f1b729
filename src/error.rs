use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search endpoint answered {0}")]
    Status(StatusCode),

    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("search response is not a list")]
    NotAList,

    /// Superseded by a newer query or torn down. Not reported to users.
    #[error("search cancelled")]
    Cancelled,
}

impl SearchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchError::Cancelled)
    }
}
