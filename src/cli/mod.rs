//! CLI module for the semantic cache service
//!
//! Provides the `serve` subcommand that runs the HTTP API.

pub mod serve;

use clap::{Parser, Subcommand};

/// Semantic cache service - reuses LLM answers for semantically similar queries
#[derive(Parser)]
#[command(name = "semantic-cache-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,
}
