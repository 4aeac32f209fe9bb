use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[cfg(feature = "notion")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Server { status: u16, body: String },

    #[cfg(feature = "notion")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid page cursor: {0}")]
    InvalidCursor(String),

    #[error("malformed record {id}: {reason}")]
    Decode { id: String, reason: String },
}
