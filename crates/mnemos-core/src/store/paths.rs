//! Store file layout
//!
//! One store root holds any number of namespaces. Each namespace owns a
//! primary log, a reflections log, an investigations log, a compaction
//! archive and a lock file. `config.toml` is shared by all of them.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{MnemosError, Result};

/// Default store directory name, relative to the working directory
pub const DEFAULT_STORE_DIR: &str = ".mnemos";

/// Config file name
pub const CONFIG_FILE: &str = "config.toml";

/// Namespace used when none is given
pub const DEFAULT_NAMESPACE: &str = "memory";

/// Namespace conventionally used for a store shared across projects
pub const GLOBAL_NAMESPACE: &str = "global";

const LOG_EXT: &str = "jsonl";
const LOCK_EXT: &str = "lock";
const REFLECTIONS_SUFFIX: &str = "_reflections";
const INVESTIGATIONS_SUFFIX: &str = "_investigations";
const ARCHIVE_SUFFIX: &str = "_archive";

/// Validated namespace tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(MnemosError::validation(
                "namespace",
                format!("'{raw}' must be non-empty and use only letters, digits, '_' or '-'"),
            ));
        }
        Ok(Namespace(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Namespace(DEFAULT_NAMESPACE.to_string())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved file paths of one namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacePaths {
    pub records: PathBuf,
    pub reflections: PathBuf,
    pub investigations: PathBuf,
    pub archive: PathBuf,
    pub lock: PathBuf,
}

impl NamespacePaths {
    pub fn new(root: &Path, namespace: &Namespace) -> Self {
        let ns = namespace.as_str();
        NamespacePaths {
            records: root.join(format!("{ns}.{LOG_EXT}")),
            reflections: root.join(format!("{ns}{REFLECTIONS_SUFFIX}.{LOG_EXT}")),
            investigations: root.join(format!("{ns}{INVESTIGATIONS_SUFFIX}.{LOG_EXT}")),
            archive: root.join(format!("{ns}{ARCHIVE_SUFFIX}.{LOG_EXT}")),
            lock: root.join(format!("{ns}.{LOCK_EXT}")),
        }
    }
}
