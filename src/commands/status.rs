//! `mnemos status` command

use crate::commands::dispatch::command::CommandContext;
use crate::commands::format::{output_by_format_result, print_json, record_line};
use mnemos_core::error::Result;
use mnemos_core::status::StatusView;

/// Execute the status command
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let store = ctx.open_store()?;
    let status = store.status()?;

    output_by_format_result!(ctx.cli.format,
        json => { print_json(&status) },
        human => { print_human(&status, ctx.cli.quiet); }
    )
}

fn print_human(status: &StatusView, quiet: bool) {
    println!("namespace: {}", status.namespace);
    match &status.active_investigation {
        Some(active) => println!("active investigation: {} [{}]", active.topic, active.id),
        None => println!("active investigation: none"),
    }
    println!(
        "records: {} ({} summaries), reflections: {}, {} bytes, pressure {}",
        status.total_records, status.summaries, status.reflections, status.bytes, status.pressure
    );
    if quiet {
        return;
    }

    if !status.counts.is_empty() {
        let counts: Vec<String> = status
            .counts
            .iter()
            .map(|(kind, n)| format!("{n} {}", if *n == 1 { kind.as_str() } else { kind.plural() }))
            .collect();
        println!("by kind: {}", counts.join(", "));
    }

    if !status.open_issues.is_empty() {
        println!("\nopen issues:");
        for issue in &status.open_issues {
            println!("  {}", record_line(issue));
        }
    }

    if !status.hotspots.is_empty() {
        println!("\nhotspots:");
        for hotspot in &status.hotspots {
            println!(
                "  {} ({} records, {} open issues)",
                hotspot.location, hotspot.records, hotspot.open_issues
            );
        }
    }

    if !status.anomalies.is_empty() {
        println!("\n{} unreadable lines skipped", status.anomalies.len());
    }
    if let Some(trigger) = &status.compaction_due {
        println!("\ncompaction due: {trigger}");
    }
}
