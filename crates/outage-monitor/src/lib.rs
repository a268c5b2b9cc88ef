//! Outage monitor driver.
//!
//! Wires the source client, the reconciliation core and a delivery transport
//! into a single run-to-completion cycle:
//!
//! fetch every partition → build and merge incidents → load the previous
//! snapshot → reconcile → compose → deliver → save the new snapshot.
//!
//! Failures are reported through [`RunError`] to one top-level boundary
//! (`main`), which logs them and still exits successfully.

pub mod config;
pub mod error;
pub mod run;

pub use config::{Args, MonitorConfig, TransportKind};
pub use error::{ConfigError, RunError};
pub use run::{build_notifier, Delivery, Monitor, RunReport};
