//! `mnemos search` command

use crate::commands::dispatch::command::CommandContext;
use crate::commands::format::{output_by_format_result, print_json, record_line};
use mnemos_core::error::Result;
use mnemos_core::record::RecordKind;

/// Execute the search command
pub fn execute(
    ctx: &CommandContext,
    term: &str,
    kind: Option<RecordKind>,
    limit: usize,
) -> Result<()> {
    let store = ctx.open_store()?;
    let results = store.search(term, kind, limit)?;
    tracing::debug!(term, results = results.len(), "search");

    output_by_format_result!(ctx.cli.format,
        json => { print_json(&results) },
        human => {
            if results.is_empty() && !ctx.cli.quiet {
                println!("no matches for '{term}'");
            }
            for record in &results {
                println!("{}", record_line(record));
            }
        }
    )
}
