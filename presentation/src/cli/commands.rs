//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for scribe-tutor
#[derive(Parser, Debug)]
#[command(name = "scribe-tutor")]
#[command(author, version, about = "Study tutor - ingest materials and ask scoped questions")]
#[command(long_about = r#"
Scribe Tutor accumulates study materials (PDFs, notes, YouTube transcripts)
into named sessions on a RAG backend and answers questions against them.

Questions are scoped: select one or more sessions and only their material is
searched; select none and the backend searches everything you ever ingested.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./scribe.toml       Project-level config
3. ~/.config/scribe-tutor/config.toml   Global config

Example:
  scribe-tutor ingest --title "Biology 101" --pdf chapter1.pdf --pdf chapter2.pdf
  scribe-tutor ask "What is osmosis?"
  scribe-tutor ask -s 3f2a9c1e "What did the lecture say about enzymes?"
  scribe-tutor chat
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a question over the selected scope
    Ask {
        /// The question to ask
        question: String,

        /// Restrict retrieval to these session ids (repeatable);
        /// omit to search over all ingested material
        #[arg(short, long, value_name = "SESSION_ID")]
        session: Vec<String>,

        /// How many chunks to retrieve (backend default when omitted)
        #[arg(long, value_name = "N")]
        top_k: Option<u32>,
    },

    /// Ingest materials into a fresh session
    Ingest {
        /// Title for the new session (derived from the first item when omitted)
        #[arg(long)]
        title: Option<String>,

        /// PDF files to ingest (repeatable)
        #[arg(long = "pdf", value_name = "FILE")]
        pdf: Vec<PathBuf>,

        /// Plain-text files to ingest (repeatable)
        #[arg(long = "text", value_name = "FILE")]
        text: Vec<PathBuf>,

        /// YouTube URLs to ingest (repeatable)
        #[arg(long = "youtube", value_name = "URL")]
        youtube: Vec<String>,
    },

    /// List sessions, most recent first
    Sessions,

    /// Delete a session and its material on the backend
    Delete {
        /// The session id (or unique prefix) to delete
        session_id: String,
    },

    /// Check backend health
    Health,

    /// Start interactive chat mode
    Chat,
}
