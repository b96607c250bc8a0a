//! [`OpenTelemetryService`]: owns the telemetry SDK instance for the
//! lifetime of the process.

use opentelemetry::Value;
use tracing::info;

use crate::config::ServiceIdentity;
use crate::error::TelemetryError;
use crate::props::PropertyOverrides;
use crate::resolver;
use crate::sdk::{OpenTelemetrySdk, SdkBuilder};

/// Common OpenTelemetry entry point for cluster components.
///
/// Instantiates the SDK with a set of override properties and the merged
/// identity resource. Attributes already configured externally (environment
/// variables, operator overrides) are never replaced. Once initialised,
/// furnishes access to the live [`OpenTelemetrySdk`] handle.
pub struct OpenTelemetryService {
    sdk: OpenTelemetrySdk,
}

impl OpenTelemetryService {
    /// Start building a service.
    pub fn builder() -> OpenTelemetryServiceBuilder {
        OpenTelemetryServiceBuilder::default()
    }

    /// Construct a service with identity read from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `CLUSTER_NAME` is absent or blank, or if SDK
    /// bootstrap fails.
    pub fn from_env() -> Result<Self, TelemetryError> {
        OpenTelemetryServiceBuilder::from_identity(ServiceIdentity::from_env()?).build()
    }

    /// The live SDK handle for instrumentation call sites.
    pub fn sdk(&self) -> &OpenTelemetrySdk {
        &self.sdk
    }

    /// Flush and release the SDK.
    ///
    /// Consumes the service, so a second close is unrepresentable. Failures
    /// while releasing the underlying providers propagate to the caller
    /// rather than being swallowed, so leaked exporters stay diagnosable.
    ///
    /// # Errors
    ///
    /// Returns the first provider shutdown failure; every provider is
    /// attempted regardless.
    pub fn close(self) -> Result<(), TelemetryError> {
        info!("closing telemetry service");
        self.sdk.shutdown()
    }
}

/// Builder for [`OpenTelemetryService`].
#[derive(Default)]
pub struct OpenTelemetryServiceBuilder {
    cluster_name: Option<String>,
    service_name: Option<String>,
    service_version: Option<String>,
    #[cfg(test)]
    sdk_customizer: Option<Box<dyn FnOnce(&mut SdkBuilder)>>,
}

impl OpenTelemetryServiceBuilder {
    pub(crate) fn from_identity(identity: ServiceIdentity) -> Self {
        Self {
            cluster_name: Some(identity.cluster_name),
            service_name: identity.service_name,
            service_version: identity.service_version,
            ..Default::default()
        }
    }

    /// Name of the cluster this process belongs to. Required; must not be
    /// blank.
    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    /// Logical service name. Optional.
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Version of the service. Optional.
    pub fn service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    /// Customise the in-progress SDK builder; for testing purposes only.
    #[cfg(test)]
    pub(crate) fn sdk_customizer(
        mut self,
        customize: impl FnOnce(&mut SdkBuilder) + 'static,
    ) -> Self {
        self.sdk_customizer = Some(Box::new(customize));
        self
    }

    /// Construct the service.
    ///
    /// Validates the identity, applies the property overrides, registers the
    /// resource customizer, and finalises the SDK. Either the whole
    /// construction succeeds and an initialised service is returned, or it
    /// fails and no handle exists.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::MissingClusterName`] when the cluster name
    /// is unset or blank, checked before any SDK interaction. SDK bootstrap
    /// failures propagate unmodified.
    pub fn build(self) -> Result<OpenTelemetryService, TelemetryError> {
        let identity = ServiceIdentity {
            cluster_name: self.cluster_name.unwrap_or_default(),
            service_name: self.service_name,
            service_version: self.service_version,
        };
        identity.validate()?;
        let cluster = identity.cluster_name.clone();

        #[allow(unused_mut)]
        let mut sdk_builder = SdkBuilder::new(PropertyOverrides::sdk_defaults())
            .with_resource_customizer(move |base, _props| {
                resolver::merge_identity(
                    &base,
                    &Value::from(resolver::DEFAULT_SERVICE_NAME),
                    &identity,
                )
            });

        #[cfg(test)]
        if let Some(customize) = self.sdk_customizer {
            customize(&mut sdk_builder);
        }

        let sdk = sdk_builder.build()?;
        info!(cluster = %cluster, "telemetry service initialised");
        Ok(OpenTelemetryService { sdk })
    }
}
