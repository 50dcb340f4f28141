//! Command dispatch logic for mnemos

use std::time::Instant;

use crate::cli::Cli;
use mnemos_core::error::Result;
use tracing::debug;

pub(crate) mod command;
mod commands;
mod macros;

use command::{Command, CommandContext, NoCommand};

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let ctx = CommandContext::new(cli, start)?;

    debug!(elapsed = ?start.elapsed(), store = %ctx.store_path.display(), "resolve_store");

    match &cli.command {
        None => NoCommand.execute(&ctx),
        Some(cmd) => cmd.execute(&ctx),
    }
}
