use crate::standup::{SessionInfo, StandupInput};

/// Predefined prompts for standup analysis
pub const SYSTEM_PROMPT_BASE: &str = "You are FlowCore, an assistant to Scrum Masters of \
    software development teams. You read daily standup updates and give accurate, \
    actionable insights grounded only in what developers wrote.";

pub const ANALYSIS_PROMPT: &str = "Analyze this daily standup response from a software \
development team and provide a JSON response with:
{
    \"sentiment_score\": -1.0 to 1.0 (negative to positive),
    \"sentiment_label\": \"negative/neutral/positive\",
    \"risk_level\": \"low/medium/high/critical\",
    \"confidence_score\": 0.0 to 1.0,
    \"key_achievements\": [\"list\", \"of\", \"key\", \"accomplishments\"],
    \"planned_work\": [\"list\", \"of\", \"planned\", \"tasks\"],
    \"critical_blockers\": [\"list\", \"of\", \"critical\", \"blockers\", \"if any\"],
    \"suggested_actions\": [\"actionable\", \"suggestions\", \"for\", \"scrum\", \"master\"],
    \"productivity_insight\": \"brief insight about developer productivity\"
}";

pub const SUMMARY_PROMPT: &str = "Generate a comprehensive daily standup summary for the \
development team. Analyze all individual responses and provide insights about:
- Overall team progress and velocity
- Key achievements and completed work
- Planned work for the next period
- Blockers and risks that need attention
- Team sentiment and morale
- Recommendations for the Scrum Master";

/// Section headings the summary narrative must use, in order
pub const SUMMARY_SECTIONS: [&str; 5] = [
    "Overall Progress",
    "Key Accomplishments",
    "Planned Work",
    "Blockers and Impediments",
    "Recommendations",
];

/// Build the single-response analysis prompt.
///
/// Developer text is embedded as-is.
pub fn build_analysis_prompt(input: &StandupInput) -> String {
    format!(
        "{}\n\nDEVELOPER: {}\nWHAT I DID: {}\nWHAT I WILL DO: {}\nBLOCKERS: {}\n\n\
         Provide only valid JSON response, no additional text.",
        ANALYSIS_PROMPT,
        input.display_name(),
        or_placeholder(&input.what_did_i_do, "No information"),
        or_placeholder(&input.what_will_i_do, "No information"),
        or_placeholder(&input.blockers, "None"),
    )
}

/// Build the session summary prompt over every response in the session
pub fn build_summary_prompt(session: &SessionInfo, responses: &[StandupInput]) -> String {
    let sections = SUMMARY_SECTIONS
        .iter()
        .enumerate()
        .map(|(i, heading)| format!("{}. {}", i + 1, heading))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\nSESSION DATE: {}\nPARTICIPANT COUNT: {}\n\nINDIVIDUAL RESPONSES:\n{}\n\n\
         Provide a well-structured summary with the following sections:\n{}",
        SUMMARY_PROMPT,
        session.effective_date(),
        responses.len(),
        render_response_blocks(responses),
        sections,
    )
}

/// One block per developer, blocks separated by a single blank line
pub fn render_response_blocks(responses: &[StandupInput]) -> String {
    responses
        .iter()
        .map(|r| {
            format!(
                "Developer: {}\nCompleted: {}\nPlanned: {}\nBlockers: {}\nSentiment: {}",
                single_block(r.display_name()),
                single_block(or_placeholder(&r.what_did_i_do, "Nothing")),
                single_block(or_placeholder(&r.what_will_i_do, "Nothing")),
                single_block(or_placeholder(&r.blockers, "None")),
                r.sentiment_score.unwrap_or(0.0),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Remove blank lines so a field cannot split its block in two
fn single_block(value: &str) -> String {
    if !value.contains('\n') {
        return value.to_string();
    }
    value
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(email: &str, did: &str) -> StandupInput {
        StandupInput::new(email, did, "Write integration tests", "")
    }

    #[test]
    fn test_analysis_prompt_embeds_fields_verbatim() {
        let input = StandupInput::new(
            "dev@example.com",
            "Fixed the \"login\" bug {urgent}",
            "Start the payments API",
            "Waiting on DB credentials",
        )
        .with_name("Jane Smith");

        let prompt = build_analysis_prompt(&input);

        assert!(prompt.contains("DEVELOPER: Jane Smith"));
        assert!(prompt.contains("WHAT I DID: Fixed the \"login\" bug {urgent}"));
        assert!(prompt.contains("WHAT I WILL DO: Start the payments API"));
        assert!(prompt.contains("BLOCKERS: Waiting on DB credentials"));
        for key in [
            "sentiment_score",
            "sentiment_label",
            "risk_level",
            "confidence_score",
            "key_achievements",
            "planned_work",
            "critical_blockers",
            "suggested_actions",
            "productivity_insight",
        ] {
            assert!(prompt.contains(&format!("\"{}\"", key)), "missing key {}", key);
        }
    }

    #[test]
    fn test_analysis_prompt_placeholders() {
        let input = StandupInput::new("dev@example.com", "", "  ", "");
        let prompt = build_analysis_prompt(&input);

        assert!(prompt.contains("WHAT I DID: No information"));
        assert!(prompt.contains("WHAT I WILL DO: No information"));
        assert!(prompt.contains("BLOCKERS: None"));
    }

    #[test]
    fn test_two_responses_render_two_blocks() {
        let responses = vec![
            sample("john@example.com", "Completed the login page"),
            sample("jane@example.com", "Fixed the database connection bug"),
        ];

        let blocks = render_response_blocks(&responses);
        let parts: Vec<&str> = blocks.split("\n\n").collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].contains("Completed: Completed the login page"));
        assert!(parts[1].contains("Completed: Fixed the database connection bug"));

        let prompt = build_summary_prompt(&SessionInfo::default(), &responses);
        assert!(prompt.contains("Completed the login page"));
        assert!(prompt.contains("Fixed the database connection bug"));
        assert!(prompt.contains(&blocks));
    }

    #[test]
    fn test_embedded_blank_lines_do_not_split_blocks() {
        let responses = vec![
            sample("john@example.com", "Line one\n\nLine two"),
            sample("jane@example.com", "Single line"),
        ];

        let blocks = render_response_blocks(&responses);
        assert_eq!(blocks.split("\n\n").count(), 2);
        assert!(blocks.contains("Line one\nLine two"));
    }

    #[test]
    fn test_summary_prompt_sections_and_session_fields() {
        let session = SessionInfo {
            date: NaiveDate::from_ymd_opt(2024, 3, 14),
            ..Default::default()
        };
        let mut input = sample("john@example.com", "Shipped");
        input.sentiment_score = Some(0.75);

        let prompt = build_summary_prompt(&session, &[input]);

        assert!(prompt.contains("SESSION DATE: 2024-03-14"));
        assert!(prompt.contains("PARTICIPANT COUNT: 1"));
        assert!(prompt.contains("Sentiment: 0.75"));
        for (i, heading) in SUMMARY_SECTIONS.iter().enumerate() {
            assert!(prompt.contains(&format!("{}. {}", i + 1, heading)));
        }
    }

    #[test]
    fn test_empty_session_has_no_blocks() {
        assert_eq!(render_response_blocks(&[]), "");
        let prompt = build_summary_prompt(&SessionInfo::default(), &[]);
        assert!(prompt.contains("PARTICIPANT COUNT: 0"));
    }
}
