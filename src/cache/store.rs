use crate::cache::record::CacheRecord;
use crate::hyperparams::Fingerprint;
use crate::pipeline::FileAnalysis;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;

/// File extension of persisted records
const ENTRY_EXTENSION: &str = "msgpack";

/// Reasons a cache entry could not be served
///
/// Every variant is handled as a miss by the run loop.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("no cache entry at {0}")]
    Missing(PathBuf),

    #[error("cache entry {0} is not newer than its source file")]
    Stale(PathBuf),

    #[error("cache IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to decode cache entry: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("failed to encode cache entry: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("cache format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("cache entry belongs to {found}, expected {expected}")]
    KeyMismatch { expected: String, found: String },
}

/// Filesystem-backed store of per-file analysis records
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding every entry of one run under one fingerprint
    pub fn namespace_dir(&self, run_name: &str, fingerprint: &Fingerprint) -> PathBuf {
        self.root.join(run_name).join(fingerprint.as_str())
    }

    pub fn entry_path(&self, run_name: &str, fingerprint: &Fingerprint, file_name: &str) -> PathBuf {
        self.namespace_dir(run_name, fingerprint).join(format!(
            "{}_{}.{}",
            file_name, fingerprint, ENTRY_EXTENSION
        ))
    }

    /// Load the entry for `file_name` if it was written after `source_modified`
    pub fn load(
        &self,
        run_name: &str,
        fingerprint: &Fingerprint,
        file_name: &str,
        source_modified: SystemTime,
    ) -> Result<FileAnalysis, CacheError> {
        let path = self.entry_path(run_name, fingerprint, file_name);

        let written = match fs::metadata(&path) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(CacheError::Missing(path)),
            Err(e) => return Err(e.into()),
        };
        if written <= source_modified {
            return Err(CacheError::Stale(path));
        }

        let bytes = fs::read(&path)?;
        let record = CacheRecord::decode(&bytes)?;

        if record.fingerprint != *fingerprint {
            return Err(CacheError::KeyMismatch {
                expected: fingerprint.to_string(),
                found: record.fingerprint.to_string(),
            });
        }
        if record.file_name != file_name {
            return Err(CacheError::KeyMismatch {
                expected: file_name.to_string(),
                found: record.file_name,
            });
        }

        Ok(record.analysis)
    }

    /// Persist an analysis, replacing any previous entry.
    ///
    /// The record is written to a sibling temporary file and renamed into
    /// place, so concurrent writers resolve to last-writer-wins and readers
    /// never observe a partially written entry under the final name.
    pub fn store(
        &self,
        run_name: &str,
        fingerprint: &Fingerprint,
        file_name: &str,
        analysis: &FileAnalysis,
    ) -> Result<PathBuf, CacheError> {
        let path = self.entry_path(run_name, fingerprint, file_name);
        let dir = self.namespace_dir(run_name, fingerprint);
        fs::create_dir_all(&dir)?;

        let record = CacheRecord::new(fingerprint.clone(), file_name, analysis.clone());
        let bytes = record.encode()?;

        let tmp = dir.join(format!(
            ".{}_{}.{}.tmp",
            file_name,
            std::process::id(),
            ENTRY_EXTENSION
        ));
        let write_result = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        })();

        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "cache entry written");
        Ok(path)
    }
}
