use anyhow::Result;
use clap::Parser;
use flowcore::cli::commands::{Cli, Commands};
use flowcore::cli::handlers::{
    handle_analyze_command, handle_config_command, handle_serve_command, handle_summarize_command,
};
use flowcore::cli::utils::{init_logging, print_info};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.log_format);

    // Execute command
    match cli.command {
        Commands::Serve { host, port, database } => handle_serve_command(host, port, database).await,

        Commands::Analyze {
            input,
            developer,
            did,
            will_do,
            blockers,
            report,
        } => handle_analyze_command(input, developer, did, will_do, blockers, report, cli.verbose).await,

        Commands::Summarize { input, report } => handle_summarize_command(input, report, cli.verbose).await,

        Commands::Config => handle_config_command(),

        Commands::Info => {
            print_info();
            Ok(())
        }
    }
}
