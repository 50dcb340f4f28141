//! `mnemos compact` command

use crate::commands::dispatch::command::CommandContext;
use crate::commands::format::{output_by_format_result, print_json};
use mnemos_core::compaction::CompactionReport;
use mnemos_core::error::Result;

/// Execute the compact command
pub fn execute(ctx: &CommandContext, if_needed: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let report = if if_needed {
        store.compact_if_needed()?
    } else {
        Some(store.compact()?)
    };

    output_by_format_result!(ctx.cli.format,
        json => {
            print_json(&serde_json::json!({
                "compacted": report.as_ref().is_some_and(|r| r.rewritten),
                "report": report,
            }))
        },
        human => {
            if !ctx.cli.quiet {
                match &report {
                    None => println!("compaction not needed"),
                    Some(report) => print_human(report),
                }
            }
        }
    )
}

fn print_human(report: &CompactionReport) {
    if !report.rewritten {
        println!("nothing to compact ({} records)", report.records_before);
        return;
    }
    println!(
        "compacted {} records in {} groups: {} -> {} records, {} -> {} bytes",
        report.records_summarized,
        report.groups_summarized,
        report.records_before,
        report.records_after,
        report.bytes_before,
        report.bytes_after
    );
    if report.anomalies > 0 {
        println!("{} unreadable lines kept as-is", report.anomalies);
    }
}
