//! The source trait and a fixture implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::SourceError;

/// Anything that can produce the raw outage records of one partition.
///
/// Abstracted to support the live API and fixtures in tests.
#[async_trait]
pub trait OutageSource: Send + Sync {
    /// Fetch every raw outage record for `ne_id`.
    async fn fetch(&self, ne_id: &str) -> Result<Vec<Value>, SourceError>;
}

/// A source that serves canned records per partition.
///
/// Unknown partitions yield an empty list.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: HashMap<String, Vec<Value>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the records of one partition.
    pub fn with_partition(mut self, ne_id: impl Into<String>, records: Vec<Value>) -> Self {
        self.records.insert(ne_id.into(), records);
        self
    }
}

#[async_trait]
impl OutageSource for StaticSource {
    async fn fetch(&self, ne_id: &str) -> Result<Vec<Value>, SourceError> {
        Ok(self.records.get(ne_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticSource::new().with_partition("0205", vec![json!({"id": 1})]);
        assert_eq!(source.fetch("0205").await.unwrap().len(), 1);
        assert!(source.fetch("0999").await.unwrap().is_empty());
    }
}
