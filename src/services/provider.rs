use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::{Course, Language};

/// Failure modes of a single upstream call. These are absorbed by the
/// aggregator and never surface to HTTP clients.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("unexpected payload: {0}")]
    Payload(String),

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}

/// Contract every course platform implements.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CourseProvider: Send + Sync {
    /// Key under which this platform appears in the response envelope.
    fn name(&self) -> &'static str;

    /// Link to the platform's own search page for the query. Returned as a
    /// fallback whether or not the structured fetch succeeds.
    fn redirect_url(&self, query: &str, lang: Language) -> String;

    /// One best-effort upstream call, normalized into [`Course`] values.
    /// No retries.
    async fn fetch(
        &self,
        query: &str,
        lang: Language,
        num_items: u32,
    ) -> Result<Vec<Course>, ProviderError>;
}
