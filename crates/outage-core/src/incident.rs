//! Canonical incident records and their construction from raw payloads.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BuildError;
use crate::labels::PartitionLabels;
use crate::normalize::NormalizedRecord;

/// Label used when neither the payload nor the partition id names a prefecture.
pub const NO_PREFECTURE: &str = "Χωρίς νομό";

/// Durable identity of an incident: the feed partition plus the provider id.
///
/// Ordering is `(partition_id, incident_id)`, which is also the render order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IncidentKey {
    pub partition_id: String,
    pub incident_id: i64,
}

impl IncidentKey {
    pub fn new(partition_id: impl Into<String>, incident_id: i64) -> Self {
        Self {
            partition_id: partition_id.into(),
            incident_id,
        }
    }
}

impl fmt::Display for IncidentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.partition_id, self.incident_id)
    }
}

impl FromStr for IncidentKey {
    type Err = String;

    /// Parse `"<partition>:<id>"`. The id is taken after the last colon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (partition, id) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("missing ':' in incident key '{}'", s))?;
        let incident_id = id
            .parse()
            .map_err(|e| format!("invalid incident id in '{}': {}", s, e))?;
        Ok(Self::new(partition, incident_id))
    }
}

/// One tracked outage incident.
///
/// Serialized field names match the persisted state document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: i64,
    #[serde(rename = "ne_id")]
    pub partition_id: String,
    #[serde(rename = "nomos")]
    pub prefecture: String,
    #[serde(rename = "areas")]
    pub affected_areas: BTreeSet<String>,
    #[serde(rename = "start_date", default)]
    pub start_time: Option<i64>,
    #[serde(rename = "end_date", default)]
    pub eta_restore_time: Option<i64>,
    #[serde(rename = "end_date_announced", default)]
    pub announced_restore_time: Option<i64>,
    #[serde(default = "unknown_creator")]
    pub creator: String,
    #[serde(default)]
    pub cause: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_scheduled: bool,
}

/// Content signature used to detect in-place edits of a known incident.
pub type IncidentSignature<'a> = (
    i64,
    &'a str,
    &'a str,
    Vec<&'a str>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    &'a str,
    &'a str,
    bool,
    bool,
);

impl Incident {
    pub fn key(&self) -> IncidentKey {
        IncidentKey::new(self.partition_id.clone(), self.incident_id)
    }

    /// Every semantically meaningful field, areas as an ordered tuple.
    pub fn signature(&self) -> IncidentSignature<'_> {
        (
            self.incident_id,
            self.partition_id.as_str(),
            self.prefecture.as_str(),
            self.affected_areas.iter().map(String::as_str).collect(),
            self.start_time,
            self.eta_restore_time,
            self.announced_restore_time,
            self.creator.as_str(),
            self.cause.as_str(),
            self.is_active,
            self.is_scheduled,
        )
    }

    /// Announced restoration time, else the ETA, else zero.
    ///
    /// A zero announced time counts as missing.
    pub fn restore_score(&self) -> i64 {
        self.announced_restore_time
            .filter(|t| *t != 0)
            .or(self.eta_restore_time)
            .unwrap_or(0)
    }
}

fn unknown_creator() -> String {
    "Unknown".to_string()
}

fn default_true() -> bool {
    true
}

/// Builds [`Incident`]s from raw records of one run.
#[derive(Debug, Clone, Copy)]
pub struct IncidentBuilder<'a> {
    labels: &'a PartitionLabels,
}

impl<'a> IncidentBuilder<'a> {
    pub fn new(labels: &'a PartitionLabels) -> Self {
        Self { labels }
    }

    /// Build an incident from a raw record fetched for `partition_id`.
    pub fn build(&self, record: &Value, partition_id: &str) -> Result<Incident, BuildError> {
        let normalized = NormalizedRecord::from_value(record)?;
        self.build_normalized(normalized, partition_id)
    }

    /// Build an incident from an already normalized record.
    pub fn build_normalized(
        &self,
        record: NormalizedRecord,
        partition_id: &str,
    ) -> Result<Incident, BuildError> {
        let incident_id = record.incident_id.ok_or(BuildError::MissingId)?;
        if record.areas.is_empty() {
            return Err(BuildError::NoAreas(incident_id));
        }

        let prefecture = self.resolve_prefecture(record.prefecture, partition_id);

        Ok(Incident {
            incident_id,
            partition_id: partition_id.to_string(),
            prefecture,
            affected_areas: record.areas,
            start_time: record.start_time,
            eta_restore_time: record.eta_restore_time,
            announced_restore_time: record.announced_restore_time,
            creator: record.creator,
            cause: record.cause,
            is_active: record.is_active,
            is_scheduled: record.is_scheduled,
        })
    }

    /// Payload text, then the static label table, then a synthesized label.
    fn resolve_prefecture(&self, from_payload: Option<String>, partition_id: &str) -> String {
        if let Some(prefecture) = from_payload {
            return prefecture;
        }
        if let Some(label) = self.labels.get(partition_id) {
            return label.to_string();
        }
        if partition_id.is_empty() {
            NO_PREFECTURE.to_string()
        } else {
            format!("NE {}", partition_id)
        }
    }
}
