//! Fallback files for batches the store rejected.
//!
//! Each failed batch becomes one JSON array file named
//! `audit-fallback-<UTC stamp>-<random hex>.json`. The random suffix keeps
//! two batches failing within the same second from clobbering each other.
//! Files are written for a human or a replay job to pick up later; nothing
//! in this process reads them back.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::Rng;
use shared_types::AuditEvent;
use thiserror::Error;

/// Failure to divert a batch to the filesystem.
#[derive(Debug, Error)]
pub enum FallbackError {
    /// The fallback directory could not be created.
    #[error("failed to create fallback directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The batch could not be serialized.
    #[error("failed to serialize audit batch: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The file could not be written.
    #[error("failed to write fallback file {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Writes one batch as a pretty-printed JSON array and returns the path.
pub fn write_batch(dir: &Path, events: &[AuditEvent]) -> Result<PathBuf, FallbackError> {
    fs::create_dir_all(dir).map_err(|source| FallbackError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(file_name(Utc::now(), rand::thread_rng().gen()));
    let json = serde_json::to_vec_pretty(events)?;
    fs::write(&path, json).map_err(|source| FallbackError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn file_name(now: DateTime<Utc>, suffix: u32) -> String {
    format!(
        "audit-fallback-{}-{suffix:08x}.json",
        now.format("%Y%m%dT%H%M%SZ")
    )
}
