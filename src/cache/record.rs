use crate::cache::store::CacheError;
use crate::hyperparams::Fingerprint;
use crate::pipeline::FileAnalysis;
use serde::{Deserialize, Serialize};

/// Version tag of the on-disk record layout; bump on any schema change
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Self-contained cache entry for one file under one fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub format_version: u32,
    pub fingerprint: Fingerprint,
    pub file_name: String,
    pub analysis: FileAnalysis,
}

/// Only the version tag, decoded before committing to the full schema
#[derive(Deserialize)]
struct RecordHeader {
    format_version: u32,
}

impl CacheRecord {
    pub fn new(fingerprint: Fingerprint, file_name: impl Into<String>, analysis: FileAnalysis) -> Self {
        Self {
            format_version: CACHE_FORMAT_VERSION,
            fingerprint,
            file_name: file_name.into(),
            analysis,
        }
    }

    /// Encode as MessagePack with named fields
    pub fn encode(&self) -> Result<Vec<u8>, CacheError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    /// Decode, rejecting records written with another format version
    pub fn decode(bytes: &[u8]) -> Result<Self, CacheError> {
        let header: RecordHeader = rmp_serde::from_slice(bytes)?;
        if header.format_version != CACHE_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                expected: CACHE_FORMAT_VERSION,
                found: header.format_version,
            });
        }
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
