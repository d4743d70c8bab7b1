use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder values models emit when there is nothing to report
const EMPTY_BLOCKER_MARKERS: &[&str] = &["none", "n/a", "na", "no blockers", "nothing", "-"];

/// A single developer's standup submission
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StandupInput {
    pub developer_email: String,
    #[serde(default)]
    pub developer_name: Option<String>,
    #[serde(default)]
    pub what_did_i_do: String,
    #[serde(default)]
    pub what_will_i_do: String,
    #[serde(default)]
    pub blockers: String,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub response_id: Option<i64>,
    /// Sentiment from an earlier analysis, rendered into session summaries
    #[serde(default)]
    pub sentiment_score: Option<f64>,
}

impl StandupInput {
    pub fn new(developer_email: &str, did: &str, will_do: &str, blockers: &str) -> Self {
        Self {
            developer_email: developer_email.to_string(),
            what_did_i_do: did.to_string(),
            what_will_i_do: will_do.to_string(),
            blockers: blockers.to_string(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.developer_name = Some(name.to_string());
        self
    }

    pub fn with_session(mut self, project_id: Option<i64>, session_id: Option<i64>) -> Self {
        self.project_id = project_id;
        self.session_id = session_id;
        self
    }

    /// Name shown in prompts: name, then email, then "Unknown"
    pub fn display_name(&self) -> &str {
        match self.developer_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ if !self.developer_email.trim().is_empty() => &self.developer_email,
            _ => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SentimentLabel {
    #[serde(rename = "negative")]
    Negative,
    #[serde(rename = "neutral")]
    #[default]
    Neutral,
    #[serde(rename = "positive")]
    Positive,
}

impl SentimentLabel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            "positive" => Some(Self::Positive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum RiskLevel {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    #[default]
    Medium,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "critical")]
    Critical,
}

impl RiskLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "green",
            Self::Medium => "yellow",
            Self::High => "bright red",
            Self::Critical => "red",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which provider produced a result and what it cost
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisMetadata {
    pub provider: String,
    pub model: String,
    pub tokens_used: u32,
    pub processing_time_ms: u64,
}

/// Structured analysis of one standup submission.
///
/// Every numeric field is always populated. Whether the values came from a
/// provider or from the built-in fallback is reported by `fallback`, never by
/// field absence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub risk_level: RiskLevel,
    pub confidence_score: f64,
    pub key_achievements: Vec<String>,
    pub planned_work: Vec<String>,
    pub critical_blockers: Vec<String>,
    pub suggested_actions: Vec<String>,
    pub productivity_insight: String,
    /// Raw prose when the provider did not answer with JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    pub has_blockers: bool,
    #[serde(default)]
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnalysisMetadata>,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            sentiment_score: 0.0,
            sentiment_label: SentimentLabel::Neutral,
            risk_level: RiskLevel::Medium,
            confidence_score: 0.5,
            key_achievements: Vec::new(),
            planned_work: Vec::new(),
            critical_blockers: Vec::new(),
            suggested_actions: Vec::new(),
            productivity_insight: String::new(),
            analysis: None,
            has_blockers: false,
            fallback: false,
            metadata: None,
        }
    }
}

impl AnalysisResult {
    /// Drop placeholder blocker entries and recompute `has_blockers`.
    ///
    /// This is the only place `has_blockers` is derived.
    pub fn refresh_blockers(mut self) -> Self {
        self.critical_blockers.retain(|b| !is_empty_blocker(b));
        self.has_blockers = !self.critical_blockers.is_empty();
        self
    }

    pub fn with_metadata(mut self, metadata: AnalysisMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

pub fn is_empty_blocker(value: &str) -> bool {
    let normalized = value.trim().trim_end_matches('.').to_lowercase();
    normalized.is_empty() || EMPTY_BLOCKER_MARKERS.contains(&normalized.as_str())
}

/// Session metadata sent alongside a summary request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl SessionInfo {
    pub fn for_session(session_id: i64) -> Self {
        Self {
            session_id: Some(session_id),
            ..Default::default()
        }
    }

    /// Session date, today (UTC) when not given
    pub fn effective_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Narrative summary for a whole standup session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnalysisMetadata>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnalysisKind {
    #[serde(rename = "standup_analysis")]
    StandupAnalysis,
    #[serde(rename = "session_summary")]
    SessionSummary,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StandupAnalysis => "standup_analysis",
            Self::SessionSummary => "session_summary",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "standup_analysis" => Some(Self::StandupAnalysis),
            "session_summary" => Some(Self::SessionSummary),
            _ => None,
        }
    }
}

/// Append-only audit record of one provider attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisLogEntry {
    pub id: String,
    pub provider: String,
    pub model: String,
    pub analysis_type: AnalysisKind,
    pub project_id: Option<i64>,
    pub session_id: Option<i64>,
    pub response_id: Option<i64>,
    pub tokens_consumed: u32,
    pub processing_time_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisLogEntry {
    pub fn new(provider: &str, model: &str, analysis_type: AnalysisKind, started_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            provider: provider.to_string(),
            model: model.to_string(),
            analysis_type,
            project_id: None,
            session_id: None,
            response_id: None,
            tokens_consumed: 0,
            processing_time_ms: 0,
            success: false,
            error_message: None,
            started_at,
            created_at: Utc::now(),
        }
    }

    pub fn with_scope(mut self, project_id: Option<i64>, session_id: Option<i64>, response_id: Option<i64>) -> Self {
        self.project_id = project_id;
        self.session_id = session_id;
        self.response_id = response_id;
        self
    }

    pub fn succeeded(mut self, tokens_consumed: u32, processing_time_ms: u64) -> Self {
        self.success = true;
        self.tokens_consumed = tokens_consumed;
        self.processing_time_ms = processing_time_ms;
        self
    }

    pub fn failed(mut self, error: &str, processing_time_ms: u64) -> Self {
        self.success = false;
        self.error_message = Some(error.to_string());
        self.processing_time_ms = processing_time_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_precedence() {
        let input = StandupInput::new("dev@example.com", "a", "b", "");
        assert_eq!(input.display_name(), "dev@example.com");

        let named = input.clone().with_name("Jane");
        assert_eq!(named.display_name(), "Jane");

        let anonymous = StandupInput::default();
        assert_eq!(anonymous.display_name(), "Unknown");
    }

    #[test]
    fn test_refresh_blockers_drops_placeholders() {
        let result = AnalysisResult {
            critical_blockers: vec!["None".to_string(), " ".to_string(), "n/a.".to_string()],
            has_blockers: true,
            ..Default::default()
        }
        .refresh_blockers();

        assert!(result.critical_blockers.is_empty());
        assert!(!result.has_blockers);

        let blocked = AnalysisResult {
            critical_blockers: vec!["Waiting on design review".to_string()],
            ..Default::default()
        }
        .refresh_blockers();
        assert!(blocked.has_blockers);
    }

    #[test]
    fn test_labels_parse_case_insensitively() {
        assert_eq!(SentimentLabel::parse("Positive"), Some(SentimentLabel::Positive));
        assert_eq!(SentimentLabel::parse("meh"), None);
        assert_eq!(RiskLevel::parse(" CRITICAL "), Some(RiskLevel::Critical));
        assert!(RiskLevel::Critical > RiskLevel::Low);
    }

    #[test]
    fn test_standup_input_accepts_minimal_json() {
        let input: StandupInput = serde_json::from_str(
            r#"{"developer_email": "dev@example.com", "what_did_i_do": "shipped"}"#,
        )
        .unwrap();

        assert_eq!(input.what_did_i_do, "shipped");
        assert_eq!(input.blockers, "");
        assert_eq!(input.session_id, None);
    }

    #[test]
    fn test_analysis_result_serializes_labels_lowercase() {
        let value = serde_json::to_value(AnalysisResult::default()).unwrap();
        assert_eq!(value["sentiment_label"], "neutral");
        assert_eq!(value["risk_level"], "medium");
        assert_eq!(value["fallback"], false);
        assert!(value.get("metadata").is_none());
    }
}
