//! `mnemos archive` command

use crate::commands::dispatch::command::CommandContext;
use crate::commands::format::{output_by_format_result, print_json, record_line};
use mnemos_core::error::Result;
use mnemos_core::id::RecordId;

/// List archived runs, or expand the one behind `summary_id`
pub fn execute(ctx: &CommandContext, summary_id: Option<&str>) -> Result<()> {
    let store = ctx.open_store()?;

    let Some(raw) = summary_id else {
        let runs = store.archived_runs()?;
        return output_by_format_result!(ctx.cli.format,
            json => { print_json(&runs) },
            human => {
                if runs.is_empty() && !ctx.cli.quiet {
                    println!("no compacted runs archived");
                }
                for run in &runs {
                    println!(
                        "[{}] {} records archived {}",
                        run.summary_id,
                        run.count(),
                        run.archived_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        );
    };

    let run = store.expand(&RecordId::parse(raw)?)?;
    output_by_format_result!(ctx.cli.format,
        json => { print_json(&run) },
        human => {
            if !ctx.cli.quiet {
                println!("{} records behind {}:", run.count(), run.summary_id);
            }
            for record in &run.records {
                println!("{}", record_line(record));
            }
        }
    )
}
