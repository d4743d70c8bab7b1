use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors a single provider attempt can end with
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Sampling knobs for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationParams {
    /// Single standup analysis
    pub const ANALYSIS: GenerationParams = GenerationParams {
        max_tokens: 500,
        temperature: 0.7,
    };

    /// Session summary narrative
    pub const SUMMARY: GenerationParams = GenerationParams {
        max_tokens: 800,
        temperature: 0.5,
    };
}

/// Raw output of a successful attempt
#[derive(Debug, Clone)]
pub struct ProviderOutput {
    pub text: String,
    pub model: String,
    pub tokens_used: u32,
}

/// One external analysis vendor.
///
/// Implementations perform exactly one call per `attempt` and never retry;
/// falling back to another provider is the router's job.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn attempt(&self, prompt: &str, params: &GenerationParams) -> Result<ProviderOutput, ProviderError>;

    /// Short vendor name used in logs and metadata
    fn name(&self) -> &str;

    fn model(&self) -> &str;
}
