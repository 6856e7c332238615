//! CLI module for trustworthy-rag
//!
//! - `ask`: answer one question over a context file and print its trust score

pub mod ask;

use clap::{Parser, Subcommand};

/// Trustworthy RAG - answers with a trust score attached
#[derive(Parser)]
#[command(name = "trustworthy-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer a question and score the answer
    Ask(ask::AskArgs),
}
