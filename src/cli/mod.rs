//! CLI module - Command-line interface for the solved service
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Accepted answers for forum topics
#[derive(Parser)]
#[command(name = "solved")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web API with the background scheduler
    #[command(alias = "daemon")]
    Serve,

    /// Run due auto-close timers and reminders once
    Check,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Accept a post as the answer of its topic
    Accept {
        /// Post ID
        #[arg(long)]
        post: i32,
        /// Acting username
        #[arg(long)]
        user: String,
    },

    /// Remove a post as the accepted answer of its topic
    Unaccept {
        /// Post ID
        #[arg(long)]
        post: i32,
        /// Acting username
        #[arg(long)]
        user: String,
    },

    /// Show whether a topic is solved
    Status {
        /// Topic ID
        #[arg(long)]
        topic: i32,
    },

    /// Accepted solutions per day
    Report {
        /// First day, YYYY-MM-DD (default: 30 days before the end)
        #[arg(long)]
        start: Option<String>,
        /// Last day, YYYY-MM-DD (default: today)
        #[arg(long)]
        end: Option<String>,
        /// Restrict to a category
        #[arg(long)]
        category: Option<i32>,
        /// Include the category's subcategories
        #[arg(long)]
        include_subcategories: bool,
    },
}

pub use commands::*;
