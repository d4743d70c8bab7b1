pub mod format;

pub use format::{
    AnalysisKind, AnalysisLogEntry, AnalysisMetadata, AnalysisResult, RiskLevel, SentimentLabel,
    SessionInfo, SessionSummary, StandupInput,
};
