//! CLI argument parsing for mnemos
//!
//! Global flags: --store, --namespace, --format, --quiet, --verbose

pub mod args;
pub mod output;
pub mod parse;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mnemos_core::record::RecordKind;
use mnemos_core::reflect::DEFAULT_WINDOW;
use mnemos_core::store::DEFAULT_NAMESPACE;
pub use args::{IssueArgs, RecordArgs};
pub use output::OutputFormat;
use parse::parse_kind;

/// Mnemos - append-only investigation memory
#[derive(Parser, Debug)]
#[command(name = "mnemos")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Store root directory (default: ./.mnemos)
    #[arg(long, global = true, env = "MNEMOS_HOME")]
    pub store: Option<PathBuf>,

    /// Namespace within the store (`global` for a shared store)
    #[arg(long, short = 'n', global = true, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. `info`, `mnemos_core=trace`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a store (idempotent)
    Init,

    /// Record an observation: what was seen
    Observe(RecordArgs),

    /// Record an insight: what it means
    Insight(RecordArgs),

    /// Record a discovery
    Discover(RecordArgs),

    /// Record an open issue
    Issue(IssueArgs),

    /// Record an architectural pattern
    Pattern(RecordArgs),

    /// Record a design principle
    Principle(RecordArgs),

    /// Record an antipattern
    Antipattern(RecordArgs),

    /// Resolve an open issue
    Resolve {
        /// Id of the issue record
        id: String,

        /// How it was solved
        solution: String,
    },

    /// Start an investigation (closes the active one)
    Start {
        /// Investigation topic
        topic: String,
    },

    /// Close an investigation
    Stop {
        /// Investigation id (default: the active one)
        id: Option<String>,
    },

    /// List investigations
    Investigations,

    /// Show store status
    Status,

    /// Compact routine records into summaries
    Compact {
        /// Only compact when a configured threshold is exceeded
        #[arg(long)]
        if_needed: bool,
    },

    /// List compacted runs, or show the records behind one summary
    Archive {
        /// Summary record id to expand
        summary_id: Option<String>,
    },

    /// Reflect on recent records and log the result
    Reflect {
        /// Number of recent records to analyze
        #[arg(long, default_value_t = DEFAULT_WINDOW)]
        window: usize,
    },

    /// Search records
    Search {
        /// Case-insensitive search term
        term: String,

        /// Filter by record kind
        #[arg(long, short, value_parser = parse_kind)]
        kind: Option<RecordKind>,

        /// Maximum results (most recent kept)
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_issue_flags_parse() {
        let cli = Cli::try_parse_from([
            "mnemos",
            "issue",
            "leak",
            "--severity",
            "critical",
            "--location",
            "src/pool.rs",
        ])
        .unwrap();
        let Some(Commands::Issue(args)) = &cli.command else {
            panic!("expected issue command");
        };
        assert_eq!(args.record.content, "leak");
        assert_eq!(args.record.location.as_deref(), Some("src/pool.rs"));
        assert_eq!(
            args.severity,
            Some(mnemos_core::record::Severity::Critical)
        );
    }

    #[test]
    fn test_unknown_kind_filter_rejected() {
        assert!(Cli::try_parse_from(["mnemos", "search", "x", "--kind", "bug"]).is_err());
    }
}
