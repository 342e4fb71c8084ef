//! CLI module - Command-line interface for YaMDb
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// YaMDb - review aggregation service
/// Collects reviews and ratings for books, films and music
#[derive(Parser)]
#[command(name = "yamdb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web", alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create an administrator, or promote an existing user to one
    #[command(alias = "superuser")]
    CreateSuperuser {
        /// Login name
        username: String,
        /// Address confirmation codes are mailed to
        email: String,
    },
}

pub use commands::*;
