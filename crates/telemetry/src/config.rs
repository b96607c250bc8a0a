//! Service identity configuration.
//!
//! Identity values are normally supplied programmatically by the host
//! component through [`crate::service::OpenTelemetryServiceBuilder`];
//! [`ServiceIdentity::from_env`] covers deployments that configure them
//! through environment variables instead.

use serde::Deserialize;

use crate::error::TelemetryError;

/// Identity of the process emitting telemetry.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceIdentity {
    /// Name of the cluster this process belongs to. **Required.**
    pub cluster_name: String,

    /// Logical service name (e.g. `"pulsar-broker"`).
    #[serde(default)]
    pub service_name: Option<String>,

    /// Version of the service reported alongside the name.
    #[serde(default)]
    pub service_version: Option<String>,
}

impl ServiceIdentity {
    /// Identity with only the cluster name set.
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            service_name: None,
            service_version: None,
        }
    }

    /// Load identity from the environment variables `CLUSTER_NAME`,
    /// `SERVICE_NAME` and `SERVICE_VERSION`.
    ///
    /// # Errors
    ///
    /// Returns an error if `CLUSTER_NAME` is absent or blank, or if the
    /// environment cannot be deserialised.
    pub fn from_env() -> Result<Self, TelemetryError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        let identity: ServiceIdentity = cfg.try_deserialize()?;
        identity.validate()?;
        Ok(identity)
    }

    /// Validate the identity, returning a descriptive error on the first failure.
    pub(crate) fn validate(&self) -> Result<(), TelemetryError> {
        if self.cluster_name.trim().is_empty() {
            return Err(TelemetryError::MissingClusterName);
        }
        Ok(())
    }
}
