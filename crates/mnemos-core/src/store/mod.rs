//! Store management for mnemos
//!
//! The store is a root directory holding one set of logs per namespace.
//! Default location: `.mnemos/`. Every mutation takes the namespace's
//! advisory lock for its whole read-decide-write cycle; reads never lock.

mod investigations;
mod maintenance;
pub mod paths;
mod records;
mod status;

use std::fs;
use std::path::{Path, PathBuf};

use crate::compaction::ArchivedRun;
use crate::config::StoreConfig;
use crate::error::{MnemosError, Result};
use crate::investigation::InvestigationEvent;
use crate::lock::StoreLock;
use crate::log::AppendLog;
use crate::record::{Record, RecordKind};

pub use paths::{Namespace, NamespacePaths, CONFIG_FILE, DEFAULT_NAMESPACE, DEFAULT_STORE_DIR};

/// A mnemos store opened on one namespace
#[derive(Debug)]
pub struct Store {
    /// Root path of the store
    root: PathBuf,
    namespace: Namespace,
    paths: NamespacePaths,
    /// Store configuration
    config: StoreConfig,
    records: AppendLog<Record>,
    reflections: AppendLog<Record>,
    investigations: AppendLog<InvestigationEvent>,
    archive: AppendLog<ArchivedRun>,
}

impl Store {
    /// Open an existing store at the given path
    #[tracing::instrument(skip(path), fields(path = %path.display(), namespace = %namespace))]
    pub fn open(path: &Path, namespace: Namespace) -> Result<Self> {
        if !path.is_dir() {
            return Err(MnemosError::StoreNotFound {
                path: path.to_path_buf(),
            });
        }

        let config_path = path.join(CONFIG_FILE);
        let config = if config_path.exists() {
            StoreConfig::load(&config_path)?
        } else {
            StoreConfig::default()
        };

        let paths = NamespacePaths::new(path, &namespace);
        Ok(Store {
            root: path.to_path_buf(),
            records: AppendLog::new(&paths.records),
            reflections: AppendLog::new(&paths.reflections),
            investigations: AppendLog::new(&paths.investigations),
            archive: AppendLog::new(&paths.archive),
            namespace,
            paths,
            config,
        })
    }

    /// Initialize a store at `path`, creating the directory and a default
    /// config when missing. Idempotent.
    #[tracing::instrument(skip(path), fields(path = %path.display(), namespace = %namespace))]
    pub fn init(path: &Path, namespace: Namespace) -> Result<Self> {
        fs::create_dir_all(path)
            .map_err(|e| MnemosError::io_operation("create store directory", path.display(), e))?;

        let config_path = path.join(CONFIG_FILE);
        if !config_path.exists() {
            StoreConfig::default().save(&config_path)?;
            tracing::info!(config = %config_path.display(), "wrote default config");
        }

        Self::open(path, namespace)
    }

    /// Get the store root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// File paths of the open namespace
    pub fn paths(&self) -> &NamespacePaths {
        &self.paths
    }

    /// Get the config
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Take the namespace write lock, waiting at most the configured timeout
    pub(crate) fn lock(&self) -> Result<StoreLock> {
        StoreLock::acquire(&self.paths.lock, self.config.lock_timeout())
    }

    /// Log a record of `kind` is written to
    fn log_for(&self, kind: RecordKind) -> &AppendLog<Record> {
        match kind {
            RecordKind::Reflection => &self.reflections,
            _ => &self.records,
        }
    }
}
