use super::types::{CreatedSnippet, SnippetCreate, ViewOutcome};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    Decode(reqwest::Error),
    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid API base url '{0}'")]
    InvalidBaseUrl(String),
    #[error("invalid snippet identifier '{0}'")]
    InvalidSlug(String),
}

/// The two operations the client needs from the snippet service.
///
/// Implementations issue exactly one request per call: no retries, no caching.
#[async_trait]
pub trait SnippetApi: Send + Sync {
    /// Store a new snippet and return the identifier the server assigned
    async fn create_snippet(&self, data: &SnippetCreate) -> Result<CreatedSnippet, ApiError>;

    /// Request a snippet, decoding the reply into a [`ViewOutcome`]
    async fn view_snippet(&self, slug: &str, password: Option<&str>)
        -> Result<ViewOutcome, ApiError>;
}
