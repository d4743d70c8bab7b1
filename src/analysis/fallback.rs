use crate::standup::{AnalysisResult, RiskLevel, SentimentLabel, SessionSummary};

/// Insight text of the built-in analysis returned when no provider answers
pub const MOCK_PRODUCTIVITY_INSIGHT: &str = "Developer is making good progress";

pub const MOCK_SUMMARY: &str = "**Daily Standup Summary**

**Overall Progress**: Team is making good progress on current sprint goals.
**Key Accomplishments**: Backend API development completed, login functionality implemented.
**Planned Work**: Database integration, testing phase preparation.
**Blockers and Impediments**: No critical blockers reported.
**Recommendations**: Continue current pace, focus on testing.";

/// Fixed analysis used when every provider failed or none is configured
pub fn mock_analysis() -> AnalysisResult {
    AnalysisResult {
        sentiment_score: 0.5,
        sentiment_label: SentimentLabel::Positive,
        risk_level: RiskLevel::Low,
        confidence_score: 0.8,
        key_achievements: vec!["Completed backend API development".to_string()],
        planned_work: vec!["Continue with database integration".to_string()],
        critical_blockers: Vec::new(),
        suggested_actions: vec!["Review code quality".to_string(), "Plan for testing".to_string()],
        productivity_insight: MOCK_PRODUCTIVITY_INSIGHT.to_string(),
        analysis: None,
        has_blockers: false,
        fallback: true,
        metadata: None,
    }
    .refresh_blockers()
}

/// Fixed summary used when every provider failed or none is configured
pub fn mock_summary() -> SessionSummary {
    SessionSummary {
        summary: MOCK_SUMMARY.to_string(),
        key_insights: Vec::new(),
        fallback: true,
        metadata: None,
    }
}
