//! Command trait and context for dispatching commands

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use crate::cli::Cli;
use mnemos_core::error::{MnemosError, Result};
use mnemos_core::store::{Namespace, Store, DEFAULT_STORE_DIR};

use super::macros::trace_command;

/// Resolve the store root: `--store`/`MNEMOS_HOME`, else `./.mnemos`
pub fn resolve_store_path(cli: &Cli) -> Result<PathBuf> {
    let cwd = env::current_dir()
        .map_err(|e| MnemosError::io_operation("resolve", "current directory", e))?;
    Ok(match &cli.store {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => cwd.join(path),
        None => cwd.join(DEFAULT_STORE_DIR),
    })
}

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub store_path: PathBuf,
    pub namespace: Namespace,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, start: Instant) -> Result<Self> {
        Ok(Self {
            cli,
            store_path: resolve_store_path(cli)?,
            namespace: Namespace::parse(&cli.namespace)?,
            start,
        })
    }

    pub fn open_store(&self) -> Result<Store> {
        let store = Store::open(&self.store_path, self.namespace.clone())?;
        trace_command!(self.cli, self.start, "open_store");
        Ok(store)
    }

    pub fn init_store(&self) -> Result<Store> {
        let store = Store::init(&self.store_path, self.namespace.clone())?;
        trace_command!(self.cli, self.start, "init_store");
        Ok(store)
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("mnemos {}", env!("CARGO_PKG_VERSION"));
        println!("Run `mnemos --help` for usage.");
        Ok(())
    }
}
