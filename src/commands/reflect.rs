//! `mnemos reflect` command

use crate::commands::dispatch::command::CommandContext;
use crate::commands::format::{output_by_format_result, print_json};
use mnemos_core::error::Result;
use mnemos_core::reflect::ReflectionOutcome;

/// Execute the reflect command
pub fn execute(ctx: &CommandContext, window: usize) -> Result<()> {
    let store = ctx.open_store()?;
    let outcome = store.reflect(window)?;

    output_by_format_result!(ctx.cli.format,
        json => { print_json(&outcome) },
        human => {
            match &outcome {
                ReflectionOutcome::InsufficientData { records, required } => {
                    if !ctx.cli.quiet {
                        println!("not enough data to reflect: {records} records, need {required}");
                    }
                }
                ReflectionOutcome::Recorded { reflection, .. } => {
                    println!("{}", reflection.content);
                    if let Some(detail) = &reflection.detail {
                        println!("{detail}");
                    }
                }
            }
        }
    )
}
