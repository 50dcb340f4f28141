use super::parse::parse_severity;
use clap::Args;
use mnemos_core::record::Severity;

/// Arguments shared by every record-writing subcommand
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// What to record
    pub content: String,

    /// Supporting context, evidence or rationale
    #[arg(long, short)]
    pub detail: Option<String>,

    /// Where it applies (file, module, component)
    #[arg(long, short)]
    pub location: Option<String>,

    /// Investigation id (defaults to the active investigation)
    #[arg(long)]
    pub investigation: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct IssueArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// Issue severity
    #[arg(long, short, value_parser = parse_severity)]
    pub severity: Option<Severity>,
}
