//! Record-writing commands: observe, insight, discover, issue, pattern,
//! principle, antipattern, and resolve

use crate::cli::RecordArgs;
use crate::commands::dispatch::command::CommandContext;
use crate::commands::format::{output_by_format_result, print_json, record_line};
use mnemos_core::error::Result;
use mnemos_core::id::{InvestigationId, RecordId};
use mnemos_core::record::{Record, RecordDraft, RecordKind, Severity};

/// Append one record of `kind`
pub fn execute(
    ctx: &CommandContext,
    kind: RecordKind,
    args: &RecordArgs,
    severity: Option<Severity>,
) -> Result<()> {
    let store = ctx.open_store()?;

    let mut draft = RecordDraft::new(kind, args.content.as_str());
    if let Some(detail) = &args.detail {
        draft = draft.with_detail(detail.as_str());
    }
    if let Some(location) = &args.location {
        draft = draft.at_location(location.as_str());
    }
    if let Some(severity) = severity {
        draft = draft.with_severity(severity);
    }
    if let Some(investigation) = &args.investigation {
        draft = draft.in_investigation(InvestigationId::parse(investigation)?);
    }

    let record = store.append(draft)?;
    print_record(ctx, &record, "recorded")
}

/// Execute `mnemos resolve`
pub fn execute_resolve(ctx: &CommandContext, id: &str, solution: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let issue_id = RecordId::parse(id)?;
    let resolution = store.resolve_issue(&issue_id, solution)?;
    print_record(ctx, &resolution, "resolved")
}

fn print_record(ctx: &CommandContext, record: &Record, verb: &str) -> Result<()> {
    output_by_format_result!(ctx.cli.format,
        json => { print_json(record) },
        human => {
            if ctx.cli.quiet {
                println!("{}", record.id);
            } else {
                println!("{verb} {}", record_line(record));
            }
        }
    )
}
