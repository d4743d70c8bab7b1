use crate::analysis::MemoryAnalysisLog;
use crate::cli::commands::ReportFormat;
use crate::cli::utils::{build_router, load_standup, spinner};
use crate::report::json::JsonReporter;
use crate::report::terminal::TerminalReporter;
use crate::standup::StandupInput;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn handle_analyze_command(
    input: Option<PathBuf>,
    developer: String,
    did: String,
    will_do: String,
    blockers: String,
    report: ReportFormat,
    verbose: bool,
) -> Result<()> {
    let standup = match input {
        Some(path) => {
            info!("Loading standup from {}", path.display());
            load_standup(&path)?
        }
        None => StandupInput::new(&developer, &did, &will_do, &blockers),
    };

    if standup.what_did_i_do.trim().is_empty() && standup.what_will_i_do.trim().is_empty() {
        warn!("Standup has no progress or plans; the analysis may not be meaningful");
    }

    let log = Arc::new(MemoryAnalysisLog::new());
    let router = build_router(log.clone());

    let progress = (report == ReportFormat::Terminal)
        .then(|| spinner(format!("Analyzing standup from {}...", standup.display_name())));
    let result = router.analyze(&standup).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    info!(
        "Analysis complete (fallback={}, attempts={})",
        result.fallback,
        log.len()
    );

    match report {
        ReportFormat::Terminal => TerminalReporter::new()
            .with_verbose(verbose)
            .print_analysis(&result, &log.entries()),
        ReportFormat::Json => println!("{}", JsonReporter::analysis(&result, log.entries())?),
    }

    Ok(())
}
