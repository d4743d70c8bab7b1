use crate::standup::{AnalysisResult, RiskLevel, SentimentLabel};
use serde_json::{Map, Value};
use tracing::debug;

/// How a raw provider reply was turned into an `AnalysisResult`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The whole reply was a JSON object
    Structured,
    /// A JSON object was found inside surrounding text
    Embedded,
    /// No usable JSON; the reply was kept as prose with default scores
    Prose,
}

/// Coerces free-form provider output into the fixed analysis schema.
///
/// Never fails: anything that cannot be parsed degrades to prose.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, raw: &str) -> AnalysisResult {
        self.normalize_with_outcome(raw).0
    }

    pub fn normalize_with_outcome(&self, raw: &str) -> (AnalysisResult, ParseOutcome) {
        let trimmed = raw.trim();

        if trimmed.starts_with('{') {
            return match parse_object(trimmed) {
                Some(object) => (coerce(&object), ParseOutcome::Structured),
                None => {
                    debug!("Reply starts with '{{' but is not a JSON object; keeping as prose");
                    (prose(raw), ParseOutcome::Prose)
                }
            };
        }

        if let Some(object) = find_embedded_object(raw) {
            return (coerce(&object), ParseOutcome::Embedded);
        }

        debug!("No JSON object in reply ({} chars); keeping as prose", raw.len());
        (prose(raw), ParseOutcome::Prose)
    }
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// First line starting with '{'; that line alone, then through the last '}'
fn find_embedded_object(raw: &str) -> Option<Map<String, Value>> {
    let mut offset = 0;
    for line in raw.split('\n') {
        let line_start = offset;
        offset += line.len() + 1;

        let candidate = line.trim();
        if !candidate.starts_with('{') {
            continue;
        }

        if let Some(object) = parse_object(candidate) {
            return Some(object);
        }

        let rest = &raw[line_start..];
        return rest
            .rfind('}')
            .and_then(|end| parse_object(rest[..=end].trim()));
    }
    None
}

fn prose(raw: &str) -> AnalysisResult {
    AnalysisResult {
        analysis: Some(raw.to_string()),
        ..Default::default()
    }
    .refresh_blockers()
}

fn coerce(object: &Map<String, Value>) -> AnalysisResult {
    let defaults = AnalysisResult::default();

    AnalysisResult {
        sentiment_score: number(object.get("sentiment_score"))
            .map(|v| v.clamp(-1.0, 1.0))
            .unwrap_or(defaults.sentiment_score),
        sentiment_label: text(object.get("sentiment_label"))
            .and_then(|s| SentimentLabel::parse(&s))
            .unwrap_or(defaults.sentiment_label),
        risk_level: text(object.get("risk_level"))
            .and_then(|s| RiskLevel::parse(&s))
            .unwrap_or(defaults.risk_level),
        confidence_score: number(object.get("confidence_score"))
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(defaults.confidence_score),
        key_achievements: list(object.get("key_achievements")),
        planned_work: list(object.get("planned_work")),
        critical_blockers: list(object.get("critical_blockers")),
        suggested_actions: list(object.get("suggested_actions")),
        productivity_insight: text(object.get("productivity_insight")).unwrap_or_default(),
        analysis: text(object.get("analysis")),
        ..defaults
    }
    .refresh_blockers()
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}
