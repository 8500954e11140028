pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod observability;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod types;

// Ports and their infrastructure adapters
pub mod app;
pub mod infra;
