//! Append-only JSON-lines log
//!
//! Physical writes are serialized by the store lock: callers must pass the
//! held [`StoreLock`] to every mutating method. Reads take no lock. Only
//! newline-terminated lines are ever parsed, so a write in flight in another
//! process stays invisible until it is complete.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{MnemosError, Result};
use crate::investigation::InvestigationEvent;
use crate::lock::StoreLock;
use crate::record::{Record, RECORD_VERSION};

/// Tail window used when looking for the last entry
const TAIL_WINDOW: u64 = 4096;

/// Entries that carry a schema version tag
pub trait Versioned {
    fn version(&self) -> u32;
}

impl Versioned for Record {
    fn version(&self) -> u32 {
        self.version
    }
}

impl Versioned for InvestigationEvent {
    fn version(&self) -> u32 {
        self.version
    }
}

/// What was wrong with a skipped line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A complete line that does not decode
    Malformed,
    /// A complete line written by a newer schema
    UnsupportedVersion,
    /// Bytes after the last newline: a crashed or in-flight write
    TruncatedTail,
}

/// A line skipped while reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    /// 1-based line number
    pub line: usize,
    pub kind: AnomalyKind,
    pub reason: String,
}

impl Anomaly {
    pub fn to_error(&self) -> MnemosError {
        MnemosError::CorruptRecord {
            line: self.line,
            reason: self.reason.clone(),
        }
    }
}

/// One physical line with its decoding outcome
#[derive(Debug, Clone)]
pub struct ScannedLine<T> {
    /// Exact bytes of the line, without the trailing newline
    pub raw: Vec<u8>,
    pub parsed: std::result::Result<T, Anomaly>,
}

/// Snapshot of a log: well-formed entries in write order plus skipped lines
#[derive(Debug, Clone)]
pub struct ReadResult<T> {
    pub entries: Vec<T>,
    pub anomalies: Vec<Anomaly>,
}

impl<T> Default for ReadResult<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            anomalies: Vec::new(),
        }
    }
}

/// Append-only log of `T` stored one JSON object per line
#[derive(Debug, Clone)]
pub struct AppendLog<T> {
    path: PathBuf,
    _entry: PhantomData<fn() -> T>,
}

impl<T> AppendLog<T>
where
    T: Serialize + DeserializeOwned + Versioned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _entry: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the log in bytes (0 when missing)
    pub fn size_bytes(&self) -> Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(MnemosError::io_operation("stat", self.path.display(), e)),
        }
    }

    /// Durably append one entry. Returns the number of bytes written.
    ///
    /// If a previous writer crashed mid-line, the fragment is terminated first
    /// so it reads back as a single malformed line instead of corrupting this
    /// entry. A failed write is truncated away, leaving the log as it was.
    pub fn append(&self, entry: &T, _lock: &StoreLock) -> Result<u64> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let created = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MnemosError::io_operation("open", self.path.display(), e))?;
        let len_before = file.metadata()?.len();

        let mut buf = Vec::with_capacity(line.len() + 1);
        if !ends_with_newline(&mut file, len_before)? {
            tracing::warn!(log = %self.path.display(), "terminating torn trailing line before append");
            buf.push(b'\n');
        }
        buf.extend_from_slice(&line);

        if let Err(e) = file.write_all(&buf).and_then(|_| file.sync_data()) {
            self.roll_back(&file, len_before);
            return Err(MnemosError::io_operation("append to", self.path.display(), e));
        }
        if created {
            if let Some(dir) = self.path.parent() {
                sync_dir(dir);
            }
        }

        tracing::debug!(log = %self.path.display(), bytes = buf.len(), "appended entry");
        Ok(buf.len() as u64)
    }

    fn roll_back(&self, file: &File, len: u64) {
        if let Err(e) = file.set_len(len).and_then(|_| file.sync_data()) {
            tracing::error!(
                log = %self.path.display(),
                len,
                error = %e,
                "failed to truncate partial append"
            );
        }
    }

    /// Scan every line, keeping the raw bytes
    pub fn scan(&self) -> Result<Vec<ScannedLine<T>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MnemosError::io_operation("read", self.path.display(), e)),
        };

        let terminated = bytes.last().is_none_or(|b| *b == b'\n');
        let segments: Vec<&[u8]> = bytes.split(|b| *b == b'\n').collect();
        // split yields a final empty segment when the file ends with '\n'
        let complete = segments.len().saturating_sub(1);

        let mut lines = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            if segment.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let number = index + 1;
            let parsed = if index >= complete && !terminated {
                Err(Anomaly {
                    line: number,
                    kind: AnomalyKind::TruncatedTail,
                    reason: "incomplete trailing line".to_string(),
                })
            } else {
                decode::<T>(segment, number)
            };
            lines.push(ScannedLine {
                raw: segment.to_vec(),
                parsed,
            });
        }
        Ok(lines)
    }

    /// Read all well-formed entries in write order, reporting skipped lines
    pub fn read_all(&self) -> Result<ReadResult<T>> {
        let mut result = ReadResult::default();
        for line in self.scan()? {
            match line.parsed {
                Ok(entry) => result.entries.push(entry),
                Err(anomaly) => {
                    tracing::warn!(
                        log = %self.path.display(),
                        line = anomaly.line,
                        kind = ?anomaly.kind,
                        reason = %anomaly.reason,
                        "skipping corrupt record"
                    );
                    result.anomalies.push(anomaly);
                }
            }
        }
        Ok(result)
    }

    /// Last well-formed entry, read from the tail of the file
    pub fn last_entry(&self) -> Result<Option<T>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MnemosError::io_operation("open", self.path.display(), e)),
        };
        let len = file.metadata()?.len();
        let mut window = TAIL_WINDOW;

        loop {
            let start = len.saturating_sub(window);
            file.seek(SeekFrom::Start(start))?;
            let mut buf = Vec::with_capacity((len - start) as usize);
            Read::by_ref(&mut file)
                .take(len - start)
                .read_to_end(&mut buf)?;

            let mut segments: Vec<&[u8]> = buf.split(|b| *b == b'\n').collect();
            // Drop the unterminated tail, and the possibly cut first segment
            segments.pop();
            if start > 0 && !segments.is_empty() {
                segments.remove(0);
            }
            for segment in segments.iter().rev() {
                if let Ok(entry) = decode::<T>(segment, 0) {
                    return Ok(Some(entry));
                }
            }

            if start == 0 {
                return Ok(None);
            }
            window = window.saturating_mul(4);
        }
    }

    /// Atomically replace the log with `lines`.
    ///
    /// The lines are written to a temporary file in the same directory, synced,
    /// then renamed over the log, so readers see either the old or the new file
    /// in full. On any failure the original log is left in place.
    pub fn rewrite<'a, I>(&self, lines: I, _lock: &StoreLock) -> Result<u64>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| MnemosError::InvalidStore {
                reason: format!("log path {} has no parent", self.path.display()),
            })?;

        let temp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| MnemosError::io_operation("create temp file in", dir.display(), e))?;

        let mut written = 0u64;
        let mut writer = BufWriter::new(temp);
        for line in lines {
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
            written += line.len() as u64 + 1;
        }
        let temp = writer.into_inner().map_err(|e| e.into_error())?;
        temp.as_file().sync_all()?;

        temp.persist(&self.path)
            .map_err(|e| MnemosError::io_operation("replace", self.path.display(), e.error))?;
        sync_dir(dir);

        Ok(written)
    }
}

fn decode<T>(segment: &[u8], number: usize) -> std::result::Result<T, Anomaly>
where
    T: DeserializeOwned + Versioned,
{
    let entry: T = serde_json::from_slice(segment).map_err(|e| Anomaly {
        line: number,
        kind: AnomalyKind::Malformed,
        reason: e.to_string(),
    })?;
    if entry.version() > RECORD_VERSION {
        return Err(Anomaly {
            line: number,
            kind: AnomalyKind::UnsupportedVersion,
            reason: format!(
                "record version {} is newer than supported version {}",
                entry.version(),
                RECORD_VERSION
            ),
        });
    }
    Ok(entry)
}

fn ends_with_newline(file: &mut File, len: u64) -> Result<bool> {
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Persist the rename itself; best effort where directories cannot be opened
fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        tracing::debug!(dir = %dir.display(), error = %e, "directory sync failed");
    }
    #[cfg(not(unix))]
    let _ = dir;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{validate, RecordDraft, RecordKind};
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn record(content: &str) -> Record {
        validate(
            RecordDraft::new(RecordKind::Observation, content),
            &[],
            Utc::now(),
        )
        .unwrap()
    }

    fn setup() -> (tempfile::TempDir, AppendLog<Record>, StoreLock) {
        let dir = tempdir().unwrap();
        let log = AppendLog::new(dir.path().join("memory.jsonl"));
        let lock = StoreLock::acquire(&dir.path().join("memory.lock"), Duration::from_secs(1))
            .unwrap();
        (dir, log, lock)
    }

    #[test]
    fn test_read_missing_log_is_empty() {
        let (_dir, log, _lock) = setup();
        let result = log.read_all().unwrap();
        assert!(result.entries.is_empty());
        assert!(result.anomalies.is_empty());
        assert!(log.last_entry().unwrap().is_none());
        assert_eq!(log.size_bytes().unwrap(), 0);
    }

    #[test]
    fn test_append_preserves_order() {
        let (_dir, log, lock) = setup();
        for i in 0..5 {
            log.append(&record(&format!("note {i}")), &lock).unwrap();
        }
        let contents: Vec<String> = log
            .read_all()
            .unwrap()
            .entries
            .into_iter()
            .map(|r| r.content)
            .collect();
        assert_eq!(contents, ["note 0", "note 1", "note 2", "note 3", "note 4"]);
        assert_eq!(log.last_entry().unwrap().unwrap().content, "note 4");
    }

    #[test]
    fn test_truncated_tail_is_skipped_and_reported() {
        let (dir, log, lock) = setup();
        log.append(&record("first"), &lock).unwrap();
        log.append(&record("second"), &lock).unwrap();

        let mut file = OpenOptions::new()
            .append(true)
            .open(dir.path().join("memory.jsonl"))
            .unwrap();
        file.write_all(b"{\"v\":1,\"id\":\"01J").unwrap();

        let result = log.read_all().unwrap();
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.anomalies.len(), 1);
        assert_eq!(result.anomalies[0].kind, AnomalyKind::TruncatedTail);
        assert_eq!(result.anomalies[0].line, 3);
        assert_eq!(log.last_entry().unwrap().unwrap().content, "second");
    }

    #[test]
    fn test_append_after_torn_write_keeps_new_entry_intact() {
        let (dir, log, lock) = setup();
        log.append(&record("before crash"), &lock).unwrap();
        let mut file = OpenOptions::new()
            .append(true)
            .open(dir.path().join("memory.jsonl"))
            .unwrap();
        file.write_all(b"{\"v\":1,\"kind\":\"obs").unwrap();

        log.append(&record("after crash"), &lock).unwrap();

        let result = log.read_all().unwrap();
        let contents: Vec<&str> = result.entries.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["before crash", "after crash"]);
        assert_eq!(result.anomalies.len(), 1);
        assert_eq!(result.anomalies[0].kind, AnomalyKind::Malformed);
    }

    #[test]
    fn test_future_version_reported() {
        let (dir, log, lock) = setup();
        let mut future = record("from the future");
        future.version = RECORD_VERSION + 1;
        log.append(&future, &lock).unwrap();
        log.append(&record("current"), &lock).unwrap();

        let result = log.read_all().unwrap();
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.anomalies[0].kind, AnomalyKind::UnsupportedVersion);
        assert!(matches!(
            result.anomalies[0].to_error(),
            MnemosError::CorruptRecord { line: 1, .. }
        ));
        drop(dir);
    }

    #[test]
    fn test_last_entry_spans_multiple_windows() {
        let (_dir, log, lock) = setup();
        let long = "x".repeat(TAIL_WINDOW as usize * 2);
        log.append(&record("short"), &lock).unwrap();
        log.append(&record(&long), &lock).unwrap();
        assert_eq!(log.last_entry().unwrap().unwrap().content, long);
    }

    #[test]
    fn test_rewrite_replaces_contents() {
        let (_dir, log, lock) = setup();
        log.append(&record("old"), &lock).unwrap();
        let replacement = serde_json::to_vec(&record("new")).unwrap();

        let written = log.rewrite([replacement.as_slice()], &lock).unwrap();

        assert_eq!(written, replacement.len() as u64 + 1);
        assert_eq!(log.size_bytes().unwrap(), written);
        let entries = log.read_all().unwrap().entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "new");
    }

    #[test]
    fn test_roll_back_restores_previous_bytes() {
        let (dir, log, lock) = setup();
        log.append(&record("kept"), &lock).unwrap();
        let path = dir.path().join("memory.jsonl");
        let before = fs::read(&path).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"v\":1,\"id\":\"half").unwrap();
        log.roll_back(&file, before.len() as u64);

        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(log.read_all().unwrap().anomalies.is_empty());
    }

    #[test]
    fn test_first_append_creates_log() {
        let (dir, log, lock) = setup();
        assert!(!dir.path().join("memory.jsonl").exists());
        log.append(&record("first"), &lock).unwrap();
        assert!(dir.path().join("memory.jsonl").exists());
        assert_eq!(log.read_all().unwrap().entries.len(), 1);
    }
}
