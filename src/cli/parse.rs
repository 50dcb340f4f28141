use mnemos_core::record::{RecordKind, Severity};

/// Parse record kind from string
pub fn parse_kind(s: &str) -> std::result::Result<RecordKind, String> {
    s.parse::<RecordKind>().map_err(|e| e.to_string())
}

/// Parse issue severity from string
pub fn parse_severity(s: &str) -> std::result::Result<Severity, String> {
    s.parse::<Severity>().map_err(|e| e.to_string())
}
