//! CLI module for M.I.R.A
//!
//! Provides command-line interface parsing and handling for the mira binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// M.I.R.A - Multi-stage Iterative Research Assistant
///
/// Runs a research question through an iterative generate / reflect / rank /
/// evolve / correlate / review pipeline and remembers completed answers.
#[derive(Parser, Debug)]
#[command(
    name = "mira",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "M.I.R.A - Multi-stage Iterative Research Assistant",
    long_about = "An iterative research pipeline: draft a hypothesis from web evidence,\n\
                  check it for coherence, score it against secondary evidence, refine it\n\
                  when confidence falls short, correlate it with past research, and loop\n\
                  until the verdict is confident or the iteration bound is reached.\n\n\
                  Completed answers are written to a JSON research memory and reused when\n\
                  a later question is similar enough.",
    after_help = "EXAMPLES:\n    \
                  mira \"what is the rust borrow checker\"   # Research a question\n    \
                  mira research --no-persist \"some query\"  # Research without saving\n    \
                  mira research --json \"some query\"        # Machine-readable outcome\n    \
                  mira memory list                         # List remembered research\n    \
                  mira memory show \"some query\"            # Show one stored report"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "mira.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit results as JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Research question to run when no subcommand is given
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a question through the full pipeline
    ///
    /// Iterates the six-stage pipeline until the answer is confident or the
    /// iteration bound is reached, then prints the final summary.
    Research {
        /// The research question
        query: String,

        /// Do not write a completed answer to the research memory
        #[arg(long)]
        no_persist: bool,
    },

    /// Inspect the research memory
    #[command(subcommand)]
    Memory(MemoryCommands),
}

/// Research memory subcommands
#[derive(Subcommand, Debug)]
pub enum MemoryCommands {
    /// List all remembered research queries
    List,

    /// Show the stored report for a specific query
    Show {
        /// The exact query the research was stored under
        query: String,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
