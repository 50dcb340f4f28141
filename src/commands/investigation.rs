//! Investigation commands: start, stop, investigations

use crate::commands::dispatch::command::CommandContext;
use crate::commands::format::{output_by_format_result, print_json};
use mnemos_core::error::Result;
use mnemos_core::id::InvestigationId;
use mnemos_core::investigation::Investigation;

/// Execute `mnemos start`
pub fn execute_start(ctx: &CommandContext, topic: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let investigation = store.start_investigation(topic)?;

    output_by_format_result!(ctx.cli.format,
        json => { print_json(&investigation) },
        human => {
            if ctx.cli.quiet {
                println!("{}", investigation.id);
            } else {
                println!("started investigation {} [{}]", investigation.topic, investigation.id);
            }
        }
    )
}

/// Execute `mnemos stop`
pub fn execute_stop(ctx: &CommandContext, id: Option<&str>) -> Result<()> {
    let store = ctx.open_store()?;
    let id = id.map(InvestigationId::parse).transpose()?;
    let investigation = store.close_investigation(id.as_ref())?;

    output_by_format_result!(ctx.cli.format,
        json => { print_json(&investigation) },
        human => {
            if !ctx.cli.quiet {
                println!("closed investigation {} [{}]", investigation.topic, investigation.id);
            }
        }
    )
}

/// Execute `mnemos investigations`
pub fn execute_list(ctx: &CommandContext) -> Result<()> {
    let store = ctx.open_store()?;
    let investigations = store.investigations()?;

    output_by_format_result!(ctx.cli.format,
        json => { print_json(&investigations) },
        human => {
            if investigations.is_empty() && !ctx.cli.quiet {
                println!("no investigations");
            }
            for investigation in &investigations {
                println!("{}", investigation_line(investigation));
            }
        }
    )
}

fn investigation_line(investigation: &Investigation) -> String {
    let ended = investigation
        .ended_at
        .map(|at| format!(" until {}", at.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();
    format!(
        "[{}] {} ({}) since {}{}",
        investigation.id,
        investigation.topic,
        investigation.state,
        investigation.started_at.format("%Y-%m-%d %H:%M"),
        ended
    )
}
