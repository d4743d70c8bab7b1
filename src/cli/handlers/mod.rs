pub mod analyze;
pub mod config;
pub mod serve;
pub mod summarize;

// Re-export handler functions for convenience
pub use analyze::handle_analyze_command;
pub use config::handle_config_command;
pub use serve::handle_serve_command;
pub use summarize::handle_summarize_command;
