use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "flowcore",
    about = "Standup analysis service with multi-provider LLM fallback",
    version,
    author
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for logs
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// SQLite database file for standups and analysis logs
        #[arg(long, env = "DATABASE_PATH")]
        database: Option<PathBuf>,
    },

    /// Analyze a single standup update
    Analyze {
        /// JSON file with a standup submission; overrides the field flags
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Developer email or name
        #[arg(long, default_value = "cli@localhost")]
        developer: String,

        /// What was done since the last standup
        #[arg(long, default_value = "")]
        did: String,

        /// What is planned next
        #[arg(long, default_value = "")]
        will_do: String,

        /// Anything blocking progress
        #[arg(long, default_value = "")]
        blockers: String,

        /// Report format
        #[arg(short, long, value_enum, default_value = "terminal")]
        report: ReportFormat,
    },

    /// Summarize a standup session from a JSON file
    Summarize {
        /// JSON file: either a list of submissions or {"session": {...}, "responses": [...]}
        #[arg(value_name = "SESSION_FILE")]
        input: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value = "terminal")]
        report: ReportFormat,
    },

    /// Display current provider configuration
    Config,

    /// Show information about FlowCore
    Info,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::parse_from([
            "flowcore",
            "analyze",
            "--developer",
            "jane@example.com",
            "--did",
            "Fixed CI",
            "--blockers",
            "None",
            "--report",
            "json",
        ]);

        match cli.command {
            Commands::Analyze { developer, did, will_do, blockers, report, input } => {
                assert_eq!(developer, "jane@example.com");
                assert_eq!(did, "Fixed CI");
                assert_eq!(will_do, "");
                assert_eq!(blockers, "None");
                assert_eq!(report, ReportFormat::Json);
                assert!(input.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["flowcore", "config", "--verbose", "--log-format", "json"]);
        assert!(cli.verbose);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Config));
    }
}
