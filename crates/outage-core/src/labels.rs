//! Partition id to prefecture label lookup.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::LabelsError;

/// Static mapping from partition (NE) id to a display label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionLabels {
    labels: HashMap<String, String>,
}

impl PartitionLabels {
    /// Load the mapping from a JSON object file.
    ///
    /// A missing file is an empty mapping. A leading UTF-8 BOM is accepted.
    /// Entries with empty or null values are dropped; other non-string
    /// values are kept in their JSON text form.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LabelsError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No partition label file");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| LabelsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|e| match e {
            ParseFailure::Json(source) => LabelsError::Json {
                path: path.to_path_buf(),
                source,
            },
            ParseFailure::NotAnObject => LabelsError::NotAnObject(path.to_path_buf()),
        })
    }

    fn parse(raw: &str) -> Result<Self, ParseFailure> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let document: Value = serde_json::from_str(raw).map_err(ParseFailure::Json)?;
        let Value::Object(entries) = document else {
            return Err(ParseFailure::NotAnObject);
        };

        let labels = entries
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) if s.is_empty() => None,
                Value::String(s) => Some((key, s)),
                Value::Bool(false) => None,
                Value::Number(ref n) if n.as_f64() == Some(0.0) => None,
                Value::Array(ref a) if a.is_empty() => None,
                Value::Object(ref o) if o.is_empty() => None,
                other => Some((key, other.to_string())),
            })
            .collect();

        Ok(Self { labels })
    }

    pub fn get(&self, partition_id: &str) -> Option<&str> {
        self.labels.get(partition_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<(String, String)> for PartitionLabels {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

enum ParseFailure {
    Json(serde_json::Error),
    NotAnObject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let labels = PartitionLabels::load(dir.path().join("ne_id_map.json")).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn test_load_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ne_id_map.json");
        fs::write(&path, "\u{feff}{\"0205\": \"Αχαΐας\", \"0206\": \"\", \"0207\": 7}").unwrap();

        let labels = PartitionLabels::load(&path).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get("0205"), Some("Αχαΐας"));
        assert_eq!(labels.get("0206"), None);
        assert_eq!(labels.get("0207"), Some("7"));
    }

    #[test]
    fn test_non_object_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ne_id_map.json");
        fs::write(&path, "[\"0205\"]").unwrap();

        assert!(matches!(
            PartitionLabels::load(&path),
            Err(LabelsError::NotAnObject(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ne_id_map.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(PartitionLabels::load(&path), Err(LabelsError::Json { .. })));
    }
}
