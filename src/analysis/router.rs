use super::fallback::{mock_analysis, mock_summary};
use super::log::AnalysisLogger;
use super::normalizer::ResponseNormalizer;
use crate::llm::prompts::{build_analysis_prompt, build_summary_prompt};
use crate::llm::config::{ATTEMPT_GRACE_SECS, DEFAULT_TIMEOUT_SECS};
use crate::llm::{GenerationParams, Provider, ProviderError, ProviderOutput};
use crate::standup::{
    AnalysisKind, AnalysisLogEntry, AnalysisMetadata, AnalysisResult, SessionInfo, SessionSummary,
    StandupInput,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outer bound on a single attempt, just past the default client timeout
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS + ATTEMPT_GRACE_SECS);

/// Log scope of one routed call
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    project_id: Option<i64>,
    session_id: Option<i64>,
    response_id: Option<i64>,
}

struct Success {
    provider: String,
    output: ProviderOutput,
    elapsed_ms: u64,
}

/// Tries providers strictly in priority order until one answers.
///
/// Always returns a structurally valid result: when no provider succeeds the
/// documented fallback is returned with `fallback` set.
pub struct ProviderRouter {
    providers: Vec<Arc<dyn Provider>>,
    logger: Arc<dyn AnalysisLogger>,
    normalizer: ResponseNormalizer,
    attempt_timeout: Duration,
}

impl ProviderRouter {
    pub fn new(providers: Vec<Arc<dyn Provider>>, logger: Arc<dyn AnalysisLogger>) -> Self {
        Self {
            providers,
            logger,
            normalizer: ResponseNormalizer::new(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Provider names in the order they are tried
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Analyze a single standup submission
    pub async fn analyze(&self, input: &StandupInput) -> AnalysisResult {
        let scope = Scope {
            project_id: input.project_id,
            session_id: input.session_id,
            response_id: input.response_id,
        };
        let prompt = build_analysis_prompt(input);

        match self
            .first_success(&prompt, &GenerationParams::ANALYSIS, AnalysisKind::StandupAnalysis, scope)
            .await
        {
            Some(success) => {
                let (result, outcome) = self.normalizer.normalize_with_outcome(&success.output.text);
                debug!("Normalized reply from {} as {:?}", success.provider, outcome);
                result.with_metadata(metadata(&success))
            }
            None => {
                warn!("No analysis provider available; returning fallback analysis");
                mock_analysis()
            }
        }
    }

    /// Summarize a whole session
    pub async fn summarize(&self, session: &SessionInfo, responses: &[StandupInput]) -> SessionSummary {
        let scope = Scope {
            project_id: session.project_id,
            session_id: session.session_id,
            response_id: None,
        };
        let prompt = build_summary_prompt(session, responses);

        match self
            .first_success(&prompt, &GenerationParams::SUMMARY, AnalysisKind::SessionSummary, scope)
            .await
        {
            Some(success) => SessionSummary {
                summary: success.output.text.trim().to_string(),
                key_insights: Vec::new(),
                fallback: false,
                metadata: Some(metadata(&success)),
            },
            None => {
                warn!("No summary provider available; returning fallback summary");
                mock_summary()
            }
        }
    }

    async fn first_success(
        &self,
        prompt: &str,
        params: &GenerationParams,
        kind: AnalysisKind,
        scope: Scope,
    ) -> Option<Success> {
        for provider in &self.providers {
            let started_at = Utc::now();
            let started = Instant::now();

            let outcome = match tokio::time::timeout(self.attempt_timeout, provider.attempt(prompt, params)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.attempt_timeout)),
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let entry = AnalysisLogEntry::new(provider.name(), provider.model(), kind, started_at)
                .with_scope(scope.project_id, scope.session_id, scope.response_id);

            match outcome {
                Ok(output) => {
                    info!(
                        "{} {} succeeded in {}ms ({} tokens)",
                        provider.name(),
                        kind.as_str(),
                        elapsed_ms,
                        output.tokens_used
                    );
                    self.record(entry.succeeded(output.tokens_used, elapsed_ms)).await;
                    return Some(Success {
                        provider: provider.name().to_string(),
                        output,
                        elapsed_ms,
                    });
                }
                Err(e) => {
                    warn!("{} {} failed: {}", provider.name(), kind.as_str(), e);
                    self.record(entry.failed(&e.to_string(), elapsed_ms)).await;
                }
            }
        }
        None
    }

    async fn record(&self, entry: AnalysisLogEntry) {
        if let Err(e) = self.logger.record(entry).await {
            warn!("{}", e);
        }
    }
}

fn metadata(success: &Success) -> AnalysisMetadata {
    AnalysisMetadata {
        provider: success.provider.clone(),
        model: success.output.model.clone(),
        tokens_used: success.output.tokens_used,
        processing_time_ms: success.elapsed_ms,
    }
}
