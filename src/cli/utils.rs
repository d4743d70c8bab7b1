use crate::analysis::{AnalysisLogger, ProviderRouter};
use crate::cli::commands::LogFormat;
use crate::llm::{self, ProviderSettings};
use crate::standup::{SessionInfo, StandupInput};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init_logging(verbose: bool, log_format: LogFormat) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let fmt_layer = match log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

pub fn print_info() {
    println!("FlowCore v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("Authors: {}", env!("CARGO_PKG_AUTHORS"));
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
}

/// Spinner shown while waiting on providers
pub fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Router over every configured provider, in configured priority order
pub fn build_router(logger: Arc<dyn AnalysisLogger>) -> ProviderRouter {
    let settings = ProviderSettings::from_env();
    let router = ProviderRouter::new(llm::providers_from_env(&settings), logger)
        .with_attempt_timeout(settings.attempt_timeout());

    let names = router.provider_names();
    if names.is_empty() {
        info!("No AI provider configured; analysis will use the built-in fallback");
    } else {
        info!("Provider priority: {}", names.join(" > "));
    }

    router
}

pub fn load_standup(path: &Path) -> Result<StandupInput> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid standup JSON in {}", path.display()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SessionFile {
    Full {
        #[serde(default)]
        session: SessionInfo,
        responses: Vec<StandupInput>,
    },
    Responses(Vec<StandupInput>),
}

/// Load a session file: a bare list of submissions, or session metadata plus responses
pub fn load_session(path: &Path) -> Result<(SessionInfo, Vec<StandupInput>)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: SessionFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid session JSON in {}", path.display()))?;

    Ok(match file {
        SessionFile::Full { session, responses } => (session, responses),
        SessionFile::Responses(responses) => (SessionInfo::default(), responses),
    })
}
