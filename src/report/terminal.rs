use crate::standup::{AnalysisLogEntry, AnalysisMetadata, AnalysisResult, SessionSummary};
use colored::Colorize;

/// Terminal formatting constants
const TERMINAL_WIDTH: usize = 80;
const SEPARATOR_WIDTH: usize = 40;

/// Terminal report generator for console output
pub struct TerminalReporter {
    verbose: bool,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn print_analysis(&self, result: &AnalysisResult, attempts: &[AnalysisLogEntry]) {
        self.print_header("STANDUP ANALYSIS");
        self.print_scores(result);

        print_list("✅ Key Achievements", &result.key_achievements);
        print_list("📅 Planned Work", &result.planned_work);
        if result.has_blockers {
            print_list("🚧 Critical Blockers", &result.critical_blockers);
        } else {
            section("🚧 Critical Blockers");
            println!("  {}", "No blockers reported".green());
        }
        print_list("💡 Suggested Actions", &result.suggested_actions);

        if !result.productivity_insight.is_empty() {
            section("📈 Productivity Insight");
            println!("  {}", result.productivity_insight);
        }

        if let Some(prose) = &result.analysis {
            section("📝 Provider Notes");
            for line in prose.lines() {
                println!("  {}", line);
            }
        }

        self.print_source(result.fallback, result.metadata.as_ref(), attempts);
        self.print_footer();
    }

    pub fn print_summary(&self, summary: &SessionSummary, attempts: &[AnalysisLogEntry]) {
        self.print_header("STANDUP SESSION SUMMARY");

        println!();
        for line in summary.summary.lines() {
            if line.starts_with("**") {
                println!("{}", line.trim_matches('*').bright_white().bold());
            } else {
                println!("{}", line);
            }
        }

        print_list("🔑 Key Insights", &summary.key_insights);

        self.print_source(summary.fallback, summary.metadata.as_ref(), attempts);
        self.print_footer();
    }

    fn print_header(&self, title: &str) {
        println!("\n{}", "═".repeat(TERMINAL_WIDTH).bright_blue());
        println!("{}", title.bright_white().bold());
        println!("{}", "═".repeat(TERMINAL_WIDTH).bright_blue());
    }

    fn print_scores(&self, result: &AnalysisResult) {
        section("📊 Overview");
        println!(
            "  Sentiment:       {} ({:+.2})",
            result.sentiment_label.as_str().bright_cyan(),
            result.sentiment_score
        );
        let risk = result.risk_level.as_str().to_uppercase();
        println!(
            "  Risk Level:      {}",
            risk.as_str().color(result.risk_level.color()).bold()
        );
        println!("  Confidence:      {:.0}%", result.confidence_score * 100.0);
    }

    fn print_source(&self, fallback: bool, metadata: Option<&AnalysisMetadata>, attempts: &[AnalysisLogEntry]) {
        section("🤖 Source");

        match metadata {
            Some(meta) if !fallback => {
                println!("  Provider:        {}", meta.provider.bright_cyan());
                println!("  Model:           {}", meta.model);
                println!("  Tokens:          {}", meta.tokens_used);
                println!("  Time:            {} ms", meta.processing_time_ms);
            }
            _ => println!("  {}", "Built-in fallback (no provider answered)".yellow()),
        }

        if self.verbose && !attempts.is_empty() {
            println!("\n  Attempts:");
            for attempt in attempts {
                let status = if attempt.success {
                    "ok".green()
                } else {
                    "failed".red()
                };
                print!(
                    "    {} {} ({}) {} ms",
                    status,
                    attempt.provider,
                    attempt.model,
                    attempt.processing_time_ms
                );
                match &attempt.error_message {
                    Some(err) => println!(" - {}", err.bright_black()),
                    None => println!(),
                }
            }
        }
    }

    fn print_footer(&self) {
        println!("\n{}", "═".repeat(TERMINAL_WIDTH).bright_blue());
    }
}

fn section(title: &str) {
    println!("\n{}", title.bright_white().bold());
    println!("{}", "─".repeat(SEPARATOR_WIDTH).bright_black());
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    section(title);
    for item in items {
        println!("  • {}", item);
    }
}
