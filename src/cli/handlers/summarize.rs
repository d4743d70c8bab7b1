use crate::analysis::MemoryAnalysisLog;
use crate::cli::commands::ReportFormat;
use crate::cli::utils::{build_router, load_session, spinner};
use crate::report::json::JsonReporter;
use crate::report::terminal::TerminalReporter;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub async fn handle_summarize_command(input: PathBuf, report: ReportFormat, verbose: bool) -> Result<()> {
    info!("Loading session from {}", input.display());
    let (session, responses) = load_session(&input)?;

    if responses.is_empty() {
        bail!("No standup responses found in {}", input.display());
    }

    let log = Arc::new(MemoryAnalysisLog::new());
    let router = build_router(log.clone());

    let progress = (report == ReportFormat::Terminal).then(|| {
        spinner(format!(
            "Summarizing {} responses for {}...",
            responses.len(),
            session.effective_date()
        ))
    });
    let summary = router.summarize(&session, &responses).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    match report {
        ReportFormat::Terminal => TerminalReporter::new()
            .with_verbose(verbose)
            .print_summary(&summary, &log.entries()),
        ReportFormat::Json => println!("{}", JsonReporter::summary(&summary, log.entries())?),
    }

    Ok(())
}
