//! Data connector seam.
//!
//! Generated connectors are skeletons: the trait is the activation seam a
//! human wires a real implementation into. A [`SkeletonConnector`] refuses
//! to fetch anything — generation never produces live I/O.

use super::types::ConnectorSpec;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("connector '{0}' has not been activated")]
    NotActivated(String),

    #[error("connector error: {0}")]
    Internal(String),
}

/// A source of external entity data.
#[async_trait]
pub trait DataConnector: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch raw records for a query.
    async fn fetch(&self, query: &str) -> Result<Vec<String>, ConnectorError>;

    /// Whether the connector is reachable and activated.
    async fn is_available(&self) -> bool;
}

/// The inert connector generated from a [`ConnectorSpec`].
pub struct SkeletonConnector {
    spec: ConnectorSpec,
}

impl SkeletonConnector {
    pub fn new(spec: ConnectorSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &ConnectorSpec {
        &self.spec
    }
}

#[async_trait]
impl DataConnector for SkeletonConnector {
    fn name(&self) -> &str {
        &self.spec.name
    }

    async fn fetch(&self, _query: &str) -> Result<Vec<String>, ConnectorError> {
        Err(ConnectorError::NotActivated(self.spec.name.clone()))
    }

    async fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ConnectorSpec {
        ConnectorSpec {
            name: "species-index".to_string(),
            url: "https://example.org/api".to_string(),
            query_format: "json".to_string(),
            enabled: false,
        }
    }

    // === Scenario: Skeleton connectors are inert ===

    #[tokio::test]
    async fn skeleton_refuses_to_fetch() {
        let connector = SkeletonConnector::new(spec());
        assert!(!connector.is_available().await);
        let err = connector.fetch("anything").await.unwrap_err();
        assert!(matches!(err, ConnectorError::NotActivated(name) if name == "species-index"));
    }
}
