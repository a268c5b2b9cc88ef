//! Incident reconciliation engine for the outage monitor.
//!
//! This crate turns loosely-structured outage payloads into canonical
//! [`Incident`] records, diffs them against the previously persisted snapshot
//! and renders the resulting change set into a notification body. It never
//! touches the network; fetching and delivery live in `outage-source` and
//! `outage-notify`.
//!
//! # Example
//!
//! ```no_run
//! use outage_core::{
//!     reconcile, Composer, IncidentBuilder, IncidentSet, PartitionLabels, ReconcileOptions,
//!     StateStore,
//! };
//!
//! # fn example(payloads: Vec<serde_json::Value>) -> Result<(), outage_core::StateError> {
//! let labels = PartitionLabels::default();
//! let builder = IncidentBuilder::new(&labels);
//!
//! let mut current = IncidentSet::new();
//! for record in &payloads {
//!     if let Ok(incident) = builder.build(record, "0205") {
//!         current.merge(incident);
//!     }
//! }
//!
//! let store = StateStore::new("state.json");
//! let previous = store.load_or_default();
//! let outcome = reconcile(&current, previous, ReconcileOptions::default());
//!
//! if let Some(message) = Composer::default().compose(&outcome.notice) {
//!     println!("{}", message.text);
//! }
//!
//! store.save(&current, chrono::Utc::now())?;
//! # Ok(())
//! # }
//! ```

pub mod compose;
pub mod error;
pub mod incident;
pub mod labels;
pub mod normalize;
pub mod reconcile;
pub mod state;

pub use compose::{Composer, RenderedMessage};
pub use error::{BuildError, LabelsError, StateError};
pub use incident::{Incident, IncidentBuilder, IncidentKey};
pub use labels::PartitionLabels;
pub use normalize::{FieldKeys, NormalizedRecord};
pub use reconcile::{diff, reconcile, ChangeSet, IncidentSet, Notice, ReconcileOptions, Reconciliation};
pub use state::{LoadedState, StateStore, STATE_VERSION};
