pub mod analysis;
pub mod cli;
pub mod llm;
pub mod report;
pub mod server;
pub mod standup;
pub mod store;
