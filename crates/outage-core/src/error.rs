//! Error types for outage-core.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a raw outage record could not become an [`Incident`](crate::Incident).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The record is not a JSON object.
    #[error("malformed payload: expected object, got {0}")]
    Malformed(&'static str),

    /// The record has no numeric `id`.
    #[error("record has no numeric incident id")]
    MissingId,

    /// No affected area could be extracted from the record.
    #[error("incident {0} has no affected areas")]
    NoAreas(i64),
}

/// Errors reading the partition label mapping.
#[derive(Debug, Error)]
pub enum LabelsError {
    /// The mapping file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mapping file is not valid JSON.
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The mapping file is JSON but not an object.
    #[error("{0} must be a JSON object")]
    NotAnObject(PathBuf),
}

/// Errors reading or writing the persisted incident snapshot.
#[derive(Debug, Error)]
pub enum StateError {
    /// Filesystem error.
    #[error("state I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state document could not be decoded or encoded.
    #[error("state JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
