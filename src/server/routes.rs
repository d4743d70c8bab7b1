use crate::server::AppState;
use crate::standup::{AnalysisLogEntry, AnalysisResult, SessionInfo, SessionSummary, StandupInput};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;
type ApiError = (StatusCode, String);

const DEFAULT_LOG_LIMIT: usize = 50;
const MAX_LOG_LIMIT: usize = 500;

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the FlowCore API!" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

// ============================================================================
// Analysis Routes
// ============================================================================

pub fn analysis_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/analyze-standup", post(analyze_standup))
        .route("/generate-summary", post(generate_summary))
        .route("/webhook/standup", post(receive_standup))
        .route("/analysis-logs", get(analysis_logs))
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub session: SessionInfo,
    #[serde(default)]
    pub responses: Vec<StandupInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub message: String,
    pub response_id: i64,
    pub analysis: AnalysisResult,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<usize>,
}

fn internal(context: &str, e: impl std::fmt::Display) -> ApiError {
    error!("{}: {}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{}: {}", context, e))
}

/// Persist, analyze, and store the analysis of one submission
async fn persist_and_analyze(state: &AppState, mut input: StandupInput) -> Result<(i64, AnalysisResult), ApiError> {
    let response_id = state
        .store
        .save_standup(&input)
        .await
        .map_err(|e| internal("Failed to store standup", e))?;
    input.response_id = Some(response_id);

    let result = state.router.analyze(&input).await;

    if let Err(e) = state.store.save_analysis(response_id, &result).await {
        warn!("Failed to store analysis for response {}: {}", response_id, e);
    }

    Ok((response_id, result))
}

async fn analyze_standup(
    State(state): State<AppStateArc>,
    Json(input): Json<StandupInput>,
) -> Result<Json<AnalysisResult>, ApiError> {
    info!("Analyzing standup from {}", input.developer_email);
    let (_, result) = persist_and_analyze(&state, input).await?;
    Ok(Json(result))
}

async fn generate_summary(
    State(state): State<AppStateArc>,
    Json(req): Json<SummaryRequest>,
) -> Result<Json<SessionSummary>, ApiError> {
    let responses = match (req.responses.is_empty(), req.session.session_id) {
        (true, Some(session_id)) => state
            .store
            .session_standups(session_id)
            .await
            .map_err(|e| internal("Failed to load session standups", e))?,
        _ => req.responses,
    };

    info!("Generating summary over {} responses", responses.len());
    Ok(Json(state.router.summarize(&req.session, &responses).await))
}

async fn receive_standup(
    State(state): State<AppStateArc>,
    Json(input): Json<StandupInput>,
) -> Result<Json<WebhookAck>, ApiError> {
    info!("Received standup from {}", input.developer_email);

    let session = SessionInfo {
        project_id: input.project_id,
        session_id: input.session_id,
        date: None,
    };
    let fallback_responses = vec![input.clone()];
    let (response_id, analysis) = persist_and_analyze(&state, input).await?;

    let background = state.clone();
    tokio::spawn(async move {
        let responses = match session.session_id {
            Some(session_id) => match background.store.session_standups(session_id).await {
                Ok(responses) if !responses.is_empty() => responses,
                Ok(_) => fallback_responses,
                Err(e) => {
                    warn!("Failed to load session {}: {}", session_id, e);
                    fallback_responses
                }
            },
            None => fallback_responses,
        };

        let summary = background.router.summarize(&session, &responses).await;
        info!(
            "Session summary ready ({} responses, fallback={}):\n{}",
            responses.len(),
            summary.fallback,
            summary.summary
        );
    });

    Ok(Json(WebhookAck {
        message: "Thank you for your standup update! A summary will be generated shortly.".to_string(),
        response_id,
        analysis,
    }))
}

async fn analysis_logs(
    State(state): State<AppStateArc>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<AnalysisLogEntry>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(MAX_LOG_LIMIT);
    let logs = state
        .store
        .recent_logs(limit)
        .await
        .map_err(|e| internal("Failed to read analysis logs", e))?;
    Ok(Json(logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fallback::MOCK_PRODUCTIVITY_INSIGHT;
    use crate::analysis::ProviderRouter;
    use crate::llm::{GenerationParams, Provider, ProviderError, ProviderOutput};
    use crate::server::app;
    use crate::standup::AnalysisKind;
    use crate::store::SqliteStore;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        async fn attempt(&self, prompt: &str, _params: &GenerationParams) -> Result<ProviderOutput, ProviderError> {
            let text = if prompt.contains("INDIVIDUAL RESPONSES") {
                format!("Summary of {} chars", prompt.len())
            } else {
                r#"{"sentiment_score": -0.2, "risk_level": "high", "critical_blockers": ["Prod is down"]}"#
                    .to_string()
            };
            Ok(ProviderOutput {
                text,
                model: "echo-1".to_string(),
                tokens_used: 7,
            })
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }
    }

    fn state(providers: Vec<Arc<dyn Provider>>) -> (AppState, SqliteStore) {
        let store = SqliteStore::open_in_memory().unwrap();
        let router = ProviderRouter::new(providers, Arc::new(store.clone()));
        (AppState::new(router, store.clone()), store)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn standup_body(session_id: i64) -> Value {
        json!({
            "developer_email": "dev@example.com",
            "what_did_i_do": "Finished the export job",
            "what_will_i_do": "Start the import job",
            "blockers": "",
            "session_id": session_id
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = state(Vec::new());
        let response = app(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_analyze_without_providers_returns_mock() {
        let (state, store) = state(Vec::new());
        let response = app(state)
            .oneshot(post_json("/analyze-standup", standup_body(4)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["fallback"], true);
        assert_eq!(body["productivity_insight"], MOCK_PRODUCTIVITY_INSIGHT);
        assert_eq!(body["critical_blockers"], json!([]));

        assert_eq!(store.session_standups(4).await.unwrap().len(), 1);
        assert!(store.recent_logs(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_with_provider_persists_analysis_and_log() {
        let (state, store) = state(vec![Arc::new(EchoProvider) as Arc<dyn Provider>]);
        let response = app(state)
            .oneshot(post_json("/analyze-standup", standup_body(5)))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["risk_level"], "high");
        assert_eq!(body["has_blockers"], true);
        assert_eq!(body["metadata"]["provider"], "echo");

        let stored = store.session_standups(5).await.unwrap();
        let id = stored[0].response_id.unwrap();
        let analysis = store.analysis_for(id).await.unwrap().unwrap();
        assert_eq!(analysis.critical_blockers, vec!["Prod is down"]);

        let logs = store.recent_logs(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].success);
        assert_eq!(logs[0].response_id, Some(id));
    }

    #[tokio::test]
    async fn test_summary_loads_stored_session() {
        let (state, store) = state(vec![Arc::new(EchoProvider) as Arc<dyn Provider>]);
        store
            .save_standup(&StandupInput::new("a@example.com", "Did A", "Will A", "").with_session(None, Some(9)))
            .await
            .unwrap();

        let response = app(state)
            .oneshot(post_json(
                "/generate-summary",
                json!({ "session": { "session_id": 9 }, "responses": [] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["fallback"], false);
        assert!(body["summary"].as_str().unwrap().starts_with("Summary of"));
    }

    #[tokio::test]
    async fn test_summary_without_providers_returns_mock() {
        let (state, _) = state(Vec::new());
        let response = app(state)
            .oneshot(post_json(
                "/generate-summary",
                json!({ "session": {}, "responses": [standup_body(1)] }),
            ))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["fallback"], true);
        assert!(body["summary"].as_str().unwrap().contains("Daily Standup Summary"));
    }

    #[tokio::test]
    async fn test_webhook_acknowledges_with_analysis() {
        let (state, _) = state(Vec::new());
        let response = app(state)
            .oneshot(post_json("/webhook/standup", standup_body(2)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().starts_with("Thank you"));
        assert_eq!(body["analysis"]["fallback"], true);
        assert!(body["response_id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_webhook_generates_session_summary_in_background() {
        let (state, store) = state(vec![Arc::new(EchoProvider) as Arc<dyn Provider>]);
        let response = app(state)
            .oneshot(post_json("/webhook/standup", standup_body(6)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut summary_logs = Vec::new();
        for _ in 0..100 {
            summary_logs = store
                .recent_logs(10)
                .await
                .unwrap()
                .into_iter()
                .filter(|entry| entry.analysis_type == AnalysisKind::SessionSummary)
                .collect();
            if !summary_logs.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert_eq!(summary_logs.len(), 1);
        assert!(summary_logs[0].success);
        assert_eq!(summary_logs[0].provider, "echo");
        assert_eq!(summary_logs[0].session_id, Some(6));
    }

    #[tokio::test]
    async fn test_analysis_logs_respects_limit() {
        let (state, store) = state(vec![Arc::new(EchoProvider) as Arc<dyn Provider>]);
        let router = state.router.clone();
        for _ in 0..3 {
            router.analyze(&StandupInput::new("dev@example.com", "x", "y", "")).await;
        }
        assert_eq!(store.recent_logs(10).await.unwrap().len(), 3);

        let response = app(state)
            .oneshot(Request::builder().uri("/analysis-logs?limit=2").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }
}
