//! Merging, diffing and change classification.
//!
//! One reconciliation pass runs per fetch cycle:
//!
//! 1. every built incident is merged into an [`IncidentSet`], collapsing
//!    fragments that share an [`IncidentKey`];
//! 2. the merged set is diffed against the previous snapshot into a
//!    [`ChangeSet`];
//! 3. the change set is classified into a [`Notice`].

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::incident::{Incident, IncidentKey};
use crate::state::LoadedState;

/// At most one incident per identity key, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentSet {
    incidents: BTreeMap<IncidentKey, Incident>,
}

impl IncidentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an incident into the set.
    ///
    /// When the key is already present the fragment with the greater
    /// [`Incident::restore_score`] is kept; on a tie the incoming fragment
    /// wins. Returns `true` if the incoming incident was stored.
    pub fn merge(&mut self, incident: Incident) -> bool {
        match self.incidents.entry(incident.key()) {
            Entry::Vacant(slot) => {
                slot.insert(incident);
                true
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get().restore_score();
                let incoming = incident.restore_score();
                if incoming >= existing {
                    debug!(key = %slot.key(), existing, incoming, "Replacing duplicate incident fragment");
                    slot.insert(incident);
                    true
                } else {
                    debug!(key = %slot.key(), existing, incoming, "Keeping earlier incident fragment");
                    false
                }
            }
        }
    }

    pub fn get(&self, key: &IncidentKey) -> Option<&Incident> {
        self.incidents.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &IncidentKey> {
        self.incidents.keys()
    }

    /// Incidents in `(partition_id, incident_id)` order.
    pub fn iter(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.values()
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}

impl FromIterator<Incident> for IncidentSet {
    fn from_iter<I: IntoIterator<Item = Incident>>(iter: I) -> Self {
        let mut set = Self::new();
        for incident in iter {
            set.merge(incident);
        }
        set
    }
}

impl Extend<Incident> for IncidentSet {
    fn extend<I: IntoIterator<Item = Incident>>(&mut self, iter: I) {
        for incident in iter {
            self.merge(incident);
        }
    }
}

/// Result of diffing the current set against the previous snapshot.
///
/// Every list is sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Present now, absent before.
    pub new: Vec<Incident>,
    /// Every current incident that is not new, including updated ones.
    pub known: Vec<Incident>,
    /// Present before, absent now. Carries the last known record.
    pub restored: Vec<Incident>,
    /// Shared keys whose content signature changed.
    pub updated: Vec<IncidentKey>,
}

impl ChangeSet {
    /// Whether anything new, restored or updated was detected.
    pub fn has_changes(&self) -> bool {
        !self.new.is_empty() || !self.restored.is_empty() || !self.updated.is_empty()
    }
}

/// Diff two incident sets.
pub fn diff(current: &IncidentSet, previous: &IncidentSet) -> ChangeSet {
    let current_keys: BTreeSet<&IncidentKey> = current.keys().collect();
    let previous_keys: BTreeSet<&IncidentKey> = previous.keys().collect();

    let mut changes = ChangeSet::default();

    for incident in current.iter() {
        let key = incident.key();
        match previous.get(&key) {
            None => changes.new.push(incident.clone()),
            Some(before) => {
                if before.signature() != incident.signature() {
                    changes.updated.push(key);
                }
                changes.known.push(incident.clone());
            }
        }
    }

    changes.restored = previous_keys
        .difference(&current_keys)
        .filter_map(|key| previous.get(key).cloned())
        .collect();

    changes
}

/// Explicit inputs to a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Send a snapshot of all current incidents when nothing changed.
    pub force_notify: bool,
}

/// What, if anything, should be sent for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Something changed; render new, known and restored sections.
    Changes(ChangeSet),
    /// Nothing changed but a snapshot was forced.
    Snapshot(Vec<Incident>),
    /// Nothing to send.
    Quiet,
}

impl Notice {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Changes(_) => "changes",
            Self::Snapshot(_) => "snapshot",
            Self::Quiet => "quiet",
        }
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub changes: ChangeSet,
    pub notice: Notice,
    /// The previous snapshot was replaced by the current set because the
    /// state file still had the pre-keyed layout.
    pub migrated: bool,
}

/// Diff `current` against the loaded snapshot and decide what to send.
pub fn reconcile(
    current: &IncidentSet,
    previous: LoadedState,
    options: ReconcileOptions,
) -> Reconciliation {
    let LoadedState { incidents, legacy } = previous;

    let migrated = legacy && incidents.is_empty() && !current.is_empty();
    let baseline = if migrated {
        info!("Legacy state detected; suppressing one-time migration notifications");
        current.clone()
    } else {
        incidents
    };

    let changes = diff(current, &baseline);

    info!(
        new = changes.new.len(),
        restored = changes.restored.len(),
        updated = changes.updated.len(),
        known = changes.known.len(),
        force_notify = options.force_notify,
        "Changes summary"
    );

    let notice = if changes.has_changes() {
        Notice::Changes(changes.clone())
    } else if options.force_notify {
        Notice::Snapshot(current.iter().cloned().collect())
    } else {
        Notice::Quiet
    };

    Reconciliation {
        changes,
        notice,
        migrated,
    }
}
