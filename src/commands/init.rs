//! `mnemos init` command - create a store
//!
//! Idempotent: creates the directory and a default `config.toml` when
//! missing, never rewrites an existing config.

use crate::commands::dispatch::command::CommandContext;
use crate::commands::format::{output_by_format_result, print_json};
use mnemos_core::error::Result;

/// Execute the init command
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let store = ctx.init_store()?;

    output_by_format_result!(ctx.cli.format,
        json => {
            print_json(&serde_json::json!({
                "status": "ok",
                "store": store.root().display().to_string(),
                "namespace": store.namespace().as_str(),
            }))
        },
        human => {
            if !ctx.cli.quiet {
                println!(
                    "Initialized mnemos store at {} (namespace {})",
                    store.root().display(),
                    store.namespace()
                );
            }
        }
    )
}
