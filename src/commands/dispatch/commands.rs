//! Command implementations for all mnemos commands

use crate::cli::Commands;
use crate::commands::dispatch::command::{Command, CommandContext};
use crate::commands::{archive, compact, init, investigation, record, reflect, search, status};
use mnemos_core::error::Result;
use mnemos_core::record::RecordKind;

use super::macros::trace_command;

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let result = match self {
            Commands::Init => init::execute(ctx),
            Commands::Observe(args) => record::execute(ctx, RecordKind::Observation, args, None),
            Commands::Insight(args) => record::execute(ctx, RecordKind::Insight, args, None),
            Commands::Discover(args) => record::execute(ctx, RecordKind::Discovery, args, None),
            Commands::Issue(args) => {
                record::execute(ctx, RecordKind::Issue, &args.record, args.severity)
            }
            Commands::Pattern(args) => record::execute(ctx, RecordKind::Pattern, args, None),
            Commands::Principle(args) => record::execute(ctx, RecordKind::Principle, args, None),
            Commands::Antipattern(args) => {
                record::execute(ctx, RecordKind::Antipattern, args, None)
            }
            Commands::Resolve { id, solution } => record::execute_resolve(ctx, id, solution),
            Commands::Start { topic } => investigation::execute_start(ctx, topic),
            Commands::Stop { id } => investigation::execute_stop(ctx, id.as_deref()),
            Commands::Investigations => investigation::execute_list(ctx),
            Commands::Status => status::execute(ctx),
            Commands::Compact { if_needed } => compact::execute(ctx, *if_needed),
            Commands::Archive { summary_id } => archive::execute(ctx, summary_id.as_deref()),
            Commands::Reflect { window } => reflect::execute(ctx, *window),
            Commands::Search { term, kind, limit } => search::execute(ctx, term, *kind, *limit),
        };
        trace_command!(ctx.cli, ctx.start, "execute_command");
        result
    }
}
