//! Provider-agnostic text generation interface

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The provider asked us to slow down; worth retrying later
    #[error("rate limited by provider")]
    RateLimited,

    #[error("backend error: {0}")]
    Other(String),
}

/// Anything that can turn a prompt into text
///
/// When `demand_json` is set the provider should be asked for a bare JSON
/// object, using whatever structured-output switch it offers.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, prompt: &str, demand_json: bool) -> Result<String, BackendError>;
}
