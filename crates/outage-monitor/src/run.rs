//! One monitor cycle.

use chrono::Utc;
use outage_core::normalize::{AREA_LIST_KEYS, PREFECTURE_LIST_KEYS};
use outage_core::{
    reconcile, BuildError, Composer, IncidentBuilder, IncidentSet, Notice, PartitionLabels,
    ReconcileOptions, StateStore,
};
use outage_notify::{
    EmailConfig, EmailNotifier, LoggingNotifier, Notifier, NotifyError, WebhookConfig,
    WebhookNotifier,
};
use outage_source::OutageSource;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{MonitorConfig, TransportKind};
use crate::error::RunError;

/// What happened to the notification of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Nothing was due.
    NotDue,
    /// A message was due and the transport accepted it.
    Delivered,
    /// A message was due but no transport is configured.
    NoTransport,
    /// The transport failed.
    Failed(String),
}

/// Counters and outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub payloads: usize,
    pub incidents: usize,
    pub malformed: usize,
    pub unbuildable: usize,
    pub failed_partitions: usize,
    pub new: usize,
    pub restored: usize,
    pub updated: usize,
    pub known: usize,
    pub migrated: bool,
    pub notice: &'static str,
    pub delivery: Delivery,
}

/// Build the notifier selected by `kind` from environment variables.
pub fn build_notifier(kind: TransportKind) -> Result<Box<dyn Notifier>, NotifyError> {
    Ok(match kind {
        TransportKind::Email => Box::new(EmailNotifier::new(EmailConfig::from_env()?)?),
        TransportKind::Webhook => Box::new(WebhookNotifier::new(WebhookConfig::from_env()?)?),
        TransportKind::Log => Box::new(LoggingNotifier),
    })
}

/// A configured monitor, ready to run one cycle.
pub struct Monitor {
    config: MonitorConfig,
    labels: PartitionLabels,
    source: Box<dyn OutageSource>,
    notifier: Option<Box<dyn Notifier>>,
    store: StateStore,
    composer: Composer,
}

impl Monitor {
    /// Create a monitor. The partition label file is read here; a broken
    /// file is logged and treated as empty.
    pub fn new(
        config: MonitorConfig,
        source: Box<dyn OutageSource>,
        notifier: Option<Box<dyn Notifier>>,
    ) -> Self {
        let labels = PartitionLabels::load(&config.labels_path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read partition labels; continuing without them");
            PartitionLabels::default()
        });
        let store = StateStore::new(config.state_path.clone());
        let composer = Composer::with_timezone(config.timezone);

        Self {
            config,
            labels,
            source,
            notifier,
            store,
            composer,
        }
    }

    /// Builder method to replace the partition labels.
    pub fn with_labels(mut self, labels: PartitionLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Fetch, reconcile, notify and persist once.
    ///
    /// Unusable payloads and delivery failures are logged and counted. An
    /// unreachable endpoint aborts the run before the snapshot is touched,
    /// as does a failure to write the new snapshot.
    pub async fn run_once(&self) -> Result<RunReport, RunError> {
        let builder = IncidentBuilder::new(&self.labels);
        let mut current = IncidentSet::new();
        let mut all_payloads: Vec<Value> = Vec::new();
        let mut malformed = 0;
        let mut unbuildable = 0;
        let mut failed_partitions = 0;

        for ne_id in &self.config.partition_ids {
            let payload = match self.source.fetch(ne_id).await {
                Ok(payload) => payload,
                Err(e) if e.is_bad_payload() => {
                    warn!(ne_id = %ne_id, error = %e, "Unusable payload; treating partition as empty");
                    failed_partitions += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            debug!(ne_id = %ne_id, payloads = payload.len(), "Partition payloads");

            for record in &payload {
                match builder.build(record, ne_id) {
                    Ok(incident) => {
                        current.merge(incident);
                    }
                    Err(e @ BuildError::Malformed(_)) => {
                        debug!(ne_id = %ne_id, error = %e, "Skipping malformed record");
                        malformed += 1;
                    }
                    Err(e) => {
                        debug!(ne_id = %ne_id, error = %e, "Skipping unbuildable record");
                        unbuildable += 1;
                    }
                }
            }
            all_payloads.extend(payload);
        }

        info!(payloads = all_payloads.len(), "Fetched payloads");
        if self.config.debug {
            debug_payload_sample(&all_payloads);
        }
        info!(
            incidents = current.len(),
            malformed,
            unbuildable,
            "Extracted incidents"
        );

        let previous = self.store.load_or_default();
        let outcome = reconcile(
            &current,
            previous,
            ReconcileOptions {
                force_notify: self.config.force_notify,
            },
        );

        let delivery = self.deliver(&outcome.notice).await;

        self.store.save(&current, Utc::now())?;

        Ok(RunReport {
            payloads: all_payloads.len(),
            incidents: current.len(),
            malformed,
            unbuildable,
            failed_partitions,
            new: outcome.changes.new.len(),
            restored: outcome.changes.restored.len(),
            updated: outcome.changes.updated.len(),
            known: outcome.changes.known.len(),
            migrated: outcome.migrated,
            notice: outcome.notice.kind(),
            delivery,
        })
    }

    async fn deliver(&self, notice: &Notice) -> Delivery {
        let Some(message) = self.composer.compose(notice) else {
            info!("No changes detected; no notification sent");
            return Delivery::NotDue;
        };

        let Some(notifier) = &self.notifier else {
            warn!(subject = %message.subject, "No notification transport configured; message dropped");
            return Delivery::NoTransport;
        };

        match notifier.send(&message).await {
            Ok(()) => Delivery::Delivered,
            Err(e) => {
                warn!(transport = notifier.name(), error = %e, "Notification delivery failed");
                Delivery::Failed(e.to_string())
            }
        }
    }
}

/// Log the shape of the first payload to help track upstream schema drift.
fn debug_payload_sample(payloads: &[Value]) {
    let Some(first) = payloads.first() else {
        debug!("No payloads");
        return;
    };
    let Some(object) = first.as_object() else {
        debug!(kind = ?first, "First payload is not an object");
        return;
    };

    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    debug!(?keys, "First payload keys");

    for key in AREA_LIST_KEYS.iter().chain(PREFECTURE_LIST_KEYS) {
        if let Some(items) = object.get(*key).and_then(Value::as_array) {
            debug!(key = %key, len = items.len(), "Container length");
            if let Some(item) = items.first().and_then(Value::as_object) {
                let item_keys: Vec<&str> = item.keys().map(String::as_str).collect();
                debug!(key = %key, ?item_keys, "Container first item keys");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_log_notifier() {
        let notifier = build_notifier(TransportKind::Log).unwrap();
        assert_eq!(notifier.name(), "log");
    }

    #[test]
    fn test_debug_payload_sample_tolerates_odd_shapes() {
        debug_payload_sample(&[]);
        debug_payload_sample(&[json!("text")]);
        debug_payload_sample(&[json!({
            "id": 1,
            "lektikoGenikonDiakoponList": [{"text": "ΚΕΝΤΡΟ"}],
            "kallikratikiNomarxiaList": [{"peri": "Αχαΐας"}],
            "exyphretoumeniPerioxiList": []
        })]);
    }
}
