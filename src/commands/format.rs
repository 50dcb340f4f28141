//! Format output dispatch helpers

/// Dispatch output by format, wrapping the human branch in `Ok(())`.
///
/// ```rust,ignore
/// output_by_format_result!(cli.format,
///     json => { print_json(&value) },
///     human => { println!("done"); }
/// )
/// ```
macro_rules! output_by_format_result {
    ($format:expr, json => $json:expr, human => $human:block) => {
        match $format {
            $crate::cli::OutputFormat::Json => $json,
            $crate::cli::OutputFormat::Human => {
                $human;
                Ok(())
            }
        }
    };
}

pub(crate) use output_by_format_result;

use mnemos_core::error::Result;
use mnemos_core::record::Record;
use serde::Serialize;

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-line human rendering of a record
pub fn record_line(record: &Record) -> String {
    let mut line = format!("[{}] {} {}", record.id, record.kind, first_line(&record.content));
    if let Some(location) = &record.location {
        line.push_str(&format!(" @ {location}"));
    }
    if let Some(severity) = record.severity {
        line.push_str(&format!(" ({severity})"));
    }
    line
}

fn first_line(content: &str) -> &str {
    content.lines().next().unwrap_or(content)
}
