//! SQLite persistence for standup submissions and the analysis audit log.
//!
//! Schema:
//! - standup_responses: one row per submission, plus its latest analysis
//! - ai_analysis_logs: append-only record of every provider attempt

use crate::analysis::{AnalysisLogger, LogError};
use crate::standup::{AnalysisKind, AnalysisLogEntry, AnalysisResult, StandupInput};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

/// Default database file, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "flowcore.db";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS standup_responses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER,
    session_id INTEGER,
    developer_email TEXT NOT NULL,
    developer_name TEXT,
    what_did_i_do TEXT NOT NULL,
    what_will_i_do TEXT NOT NULL,
    blockers TEXT NOT NULL,
    sentiment_score REAL,
    risk_level TEXT,
    confidence_score REAL,
    has_blockers INTEGER NOT NULL DEFAULT 0,
    ai_analysis TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_standup_responses_session ON standup_responses(session_id);

CREATE TABLE IF NOT EXISTS ai_analysis_logs (
    id TEXT PRIMARY KEY,
    project_id INTEGER,
    session_id INTEGER,
    response_id INTEGER,
    provider TEXT NOT NULL,
    model_used TEXT NOT NULL,
    analysis_type TEXT NOT NULL,
    tokens_consumed INTEGER NOT NULL,
    processing_time_ms INTEGER NOT NULL,
    success INTEGER NOT NULL,
    error_message TEXT,
    started_at TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_ai_analysis_logs_created ON ai_analysis_logs(created_at);
";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(String),

    #[error("Database connection lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared SQLite handle; cheap to clone
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        info!("Opening database at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Persist a submission and return its row id
    pub async fn save_standup(&self, input: &StandupInput) -> StoreResult<i64> {
        let input = input.clone();
        let id = self
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO standup_responses
                     (project_id, session_id, developer_email, developer_name,
                      what_did_i_do, what_will_i_do, blockers, sentiment_score, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        input.project_id,
                        input.session_id,
                        input.developer_email,
                        input.developer_name,
                        input.what_did_i_do,
                        input.what_will_i_do,
                        input.blockers,
                        input.sentiment_score,
                        Utc::now(),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        debug!("Stored standup response {}", id);
        Ok(id)
    }

    /// Attach an analysis to a stored submission
    pub async fn save_analysis(&self, response_id: i64, result: &AnalysisResult) -> StoreResult<()> {
        let raw = serde_json::to_string(result)?;
        let sentiment = result.sentiment_score;
        let risk = result.risk_level.as_str();
        let confidence = result.confidence_score;
        let has_blockers = result.has_blockers;

        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE standup_responses
                 SET sentiment_score = ?1, risk_level = ?2, confidence_score = ?3,
                     has_blockers = ?4, ai_analysis = ?5
                 WHERE id = ?6",
                params![sentiment, risk, confidence, has_blockers, raw, response_id],
            )?;
            Ok(())
        })
        .await
    }

    /// Stored analysis of one submission, if any
    pub async fn analysis_for(&self, response_id: i64) -> StoreResult<Option<AnalysisResult>> {
        let raw: Option<String> = self
            .with_conn(move |conn| {
                let raw = conn
                    .query_row(
                        "SELECT ai_analysis FROM standup_responses WHERE id = ?1",
                        params![response_id],
                        |row| row.get::<_, Option<String>>(0),
                    )
                    .optional()?;
                Ok(raw.flatten())
            })
            .await?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// All submissions of a session, oldest first
    pub async fn session_standups(&self, session_id: i64) -> StoreResult<Vec<StandupInput>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, project_id, session_id, developer_email, developer_name,
                        what_did_i_do, what_will_i_do, blockers, sentiment_score
                 FROM standup_responses WHERE session_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![session_id], |row| {
                    Ok(StandupInput {
                        response_id: Some(row.get(0)?),
                        project_id: row.get(1)?,
                        session_id: row.get(2)?,
                        developer_email: row.get(3)?,
                        developer_name: row.get(4)?,
                        what_did_i_do: row.get(5)?,
                        what_will_i_do: row.get(6)?,
                        blockers: row.get(7)?,
                        sentiment_score: row.get(8)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Most recent audit entries, newest first
    pub async fn recent_logs(&self, limit: usize) -> StoreResult<Vec<AnalysisLogEntry>> {
        let limit = limit as i64;
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, provider, model_used, analysis_type, project_id, session_id, response_id,
                        tokens_consumed, processing_time_ms, success, error_message, started_at, created_at
                 FROM ai_analysis_logs ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![limit], |row| {
                    let kind: String = row.get(3)?;
                    Ok(AnalysisLogEntry {
                        id: row.get(0)?,
                        provider: row.get(1)?,
                        model: row.get(2)?,
                        analysis_type: AnalysisKind::parse(&kind).unwrap_or(AnalysisKind::StandupAnalysis),
                        project_id: row.get(4)?,
                        session_id: row.get(5)?,
                        response_id: row.get(6)?,
                        tokens_consumed: row.get(7)?,
                        processing_time_ms: row.get::<_, i64>(8)? as u64,
                        success: row.get(9)?,
                        error_message: row.get(10)?,
                        started_at: row.get(11)?,
                        created_at: row.get(12)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    pub async fn append_log(&self, entry: AnalysisLogEntry) -> StoreResult<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO ai_analysis_logs
                 (id, project_id, session_id, response_id, provider, model_used, analysis_type,
                  tokens_consumed, processing_time_ms, success, error_message, started_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    entry.id,
                    entry.project_id,
                    entry.session_id,
                    entry.response_id,
                    entry.provider,
                    entry.model,
                    entry.analysis_type.as_str(),
                    entry.tokens_consumed,
                    entry.processing_time_ms as i64,
                    entry.success,
                    entry.error_message,
                    entry.started_at,
                    entry.created_at,
                ],
            )?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl AnalysisLogger for SqliteStore {
    async fn record(&self, entry: AnalysisLogEntry) -> Result<(), LogError> {
        self.append_log(entry)
            .await
            .map_err(|e| LogError::WriteFailed(e.to_string()))
    }
}
