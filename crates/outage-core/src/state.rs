//! Persisted incident snapshot.
//!
//! The snapshot is a single JSON document:
//!
//! ```json
//! {
//!   "version": 2,
//!   "incidents": { "0205:12345": { "incident_id": 12345, "ne_id": "0205", ... } },
//!   "updated_at": "2026-01-01T00:00:00+00:00"
//! }
//! ```
//!
//! Older monitors wrote a flat `{"areas": [...]}` document. Such files are
//! reported as legacy so the reconciler can treat the first run after the
//! upgrade as a baseline.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::StateError;
use crate::incident::{Incident, IncidentKey};
use crate::reconcile::IncidentSet;

/// Current on-disk schema version.
pub const STATE_VERSION: u32 = 2;

/// Snapshot read back from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedState {
    pub incidents: IncidentSet,
    /// The document had the pre-keyed `areas` layout.
    pub legacy: bool,
}

#[derive(Serialize)]
struct StateDocument<'a> {
    version: u32,
    incidents: BTreeMap<String, &'a Incident>,
    updated_at: String,
}

/// JSON file holding the last known snapshot.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot.
    ///
    /// A missing file is an empty, non-legacy state. Individual incident
    /// entries that fail to decode are skipped.
    pub fn load(&self) -> Result<LoadedState, StateError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No state file yet");
            return Ok(LoadedState::default());
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| StateError::Io {
            path: self.path.clone(),
            source,
        })?;
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);
        let document: Value = serde_json::from_str(raw).map_err(|source| StateError::Json {
            path: self.path.clone(),
            source,
        })?;

        Ok(decode_document(&document))
    }

    /// Read the snapshot, treating any failure as "no prior state".
    pub fn load_or_default(&self) -> LoadedState {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read state; starting from an empty snapshot");
            LoadedState::default()
        })
    }

    /// Overwrite the snapshot with `current`.
    ///
    /// The document is written next to the target and renamed into place.
    pub fn save(&self, current: &IncidentSet, now: DateTime<Utc>) -> Result<(), StateError> {
        let document = StateDocument {
            version: STATE_VERSION,
            incidents: current
                .iter()
                .map(|incident| (incident.key().to_string(), incident))
                .collect(),
            updated_at: now.to_rfc3339(),
        };
        let body = serde_json::to_string_pretty(&document).map_err(|source| StateError::Json {
            path: self.path.clone(),
            source,
        })?;

        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        info!(path = %self.path.display(), incidents = current.len(), "State written");
        Ok(())
    }
}

fn decode_document(document: &Value) -> LoadedState {
    if let Some(entries) = document.get("incidents").and_then(Value::as_object) {
        let mut incidents = IncidentSet::new();
        for (raw_key, value) in entries {
            let key = match raw_key.parse::<IncidentKey>() {
                Ok(key) => key,
                Err(e) => {
                    warn!(key = %raw_key, error = %e, "Skipping state entry with invalid key");
                    continue;
                }
            };
            match serde_json::from_value::<Incident>(value.clone()) {
                Ok(incident) if incident.key() == key => {
                    incidents.merge(incident);
                }
                Ok(incident) => warn!(
                    key = %raw_key,
                    entry = %incident.key(),
                    "Skipping state entry whose key does not match its fields"
                ),
                Err(e) => warn!(key = %raw_key, error = %e, "Skipping undecodable state entry"),
            }
        }
        return LoadedState {
            incidents,
            legacy: false,
        };
    }

    LoadedState {
        incidents: IncidentSet::new(),
        legacy: document.get("areas").is_some(),
    }
}
