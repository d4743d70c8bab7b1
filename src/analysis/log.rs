use crate::standup::AnalysisLogEntry;
use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to record analysis log: {0}")]
    WriteFailed(String),
}

/// Append-only sink for provider attempt records.
///
/// Implementations must accept concurrent appends.
#[async_trait]
pub trait AnalysisLogger: Send + Sync {
    async fn record(&self, entry: AnalysisLogEntry) -> Result<(), LogError>;
}

/// In-process log, used by the CLI and tests
#[derive(Debug, Default)]
pub struct MemoryAnalysisLog {
    entries: Mutex<Vec<AnalysisLogEntry>>,
}

impl MemoryAnalysisLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AnalysisLogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AnalysisLogger for MemoryAnalysisLog {
    async fn record(&self, entry: AnalysisLogEntry) -> Result<(), LogError> {
        self.entries
            .lock()
            .map_err(|e| LogError::WriteFailed(e.to_string()))?
            .push(entry);
        Ok(())
    }
}
