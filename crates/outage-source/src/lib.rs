//! Outage report source client.
//!
//! Fetches the raw outage list for one partition (NE id) at a time. Records
//! are returned as untyped JSON; shaping them into incidents is the job of
//! `outage-core`.
//!
//! # Example
//!
//! ```no_run
//! use outage_source::{OutageClient, OutageSource, SourceConfig};
//!
//! # async fn example() -> Result<(), outage_source::SourceError> {
//! let client = OutageClient::new(SourceConfig::default())?;
//! let records = client.fetch("0205").await?;
//! println!("{} records", records.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod source;

pub use client::OutageClient;
pub use config::{RetryConfig, SourceConfig, DEFAULT_ENDPOINT};
pub use error::SourceError;
pub use source::{OutageSource, StaticSource};
