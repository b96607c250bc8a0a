//! Bootstrap facade over the OpenTelemetry SDK.
//!
//! Property overrides are registered up front, a resource customizer is
//! invoked exactly once during [`SdkBuilder::build`], and the finalised
//! providers are handed back as one opaque [`OpenTelemetrySdk`] handle.
//!
//! When the SDK is disabled (the default), providers are built without
//! exporters: structurally live, but every emit is a no-op. When enabled,
//! OTLP/gRPC exporters are attached; endpoint resolution is delegated to the
//! exporter crate's standard `OTEL_EXPORTER_OTLP_*` environment handling.

use opentelemetry_otlp::{LogExporter, MetricExporter, SpanExporter};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::{Instrument, SdkMeterProvider, Stream};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing::debug;

use crate::error::TelemetryError;
use crate::props::PropertyOverrides;

type ResourceCustomizer = Box<dyn FnOnce(Resource, &PropertyOverrides) -> Resource>;

/// In-progress SDK configuration.
pub struct SdkBuilder {
    properties: PropertyOverrides,
    resource_customizer: Option<ResourceCustomizer>,
    #[cfg(test)]
    resource_probe: Option<std::sync::Arc<std::sync::Mutex<Option<Resource>>>>,
}

impl SdkBuilder {
    pub(crate) fn new(properties: PropertyOverrides) -> Self {
        Self {
            properties,
            resource_customizer: None,
            #[cfg(test)]
            resource_probe: None,
        }
    }

    /// Register the resource customizer. Invoked exactly once during
    /// [`build`](Self::build) with the base resource assembled by the SDK's
    /// default detectors.
    pub(crate) fn with_resource_customizer(
        mut self,
        customize: impl FnOnce(Resource, &PropertyOverrides) -> Resource + 'static,
    ) -> Self {
        self.resource_customizer = Some(Box::new(customize));
        self
    }

    /// Capture the merged resource during `build` for test assertions.
    #[cfg(test)]
    pub(crate) fn set_resource_probe(
        &mut self,
        probe: std::sync::Arc<std::sync::Mutex<Option<Resource>>>,
    ) {
        self.resource_probe = Some(probe);
    }

    /// Finalise the SDK: resolve the effective properties, assemble the base
    /// resource, run the customizer, and construct the providers.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed operator property override, or when
    /// an OTLP exporter cannot be constructed. Exporter failures propagate
    /// unmodified.
    pub(crate) fn build(mut self) -> Result<OpenTelemetrySdk, TelemetryError> {
        let disabled = self.properties.sdk_disabled();
        let cardinality_limit = self.properties.cardinality_limit()?;

        // Base resource: SDK default detectors (service name fallback,
        // telemetry SDK attributes, OTEL_RESOURCE_ATTRIBUTES and
        // OTEL_SERVICE_NAME). Operator overrides surface here.
        let base = Resource::builder().build();

        let resource = match self.resource_customizer.take() {
            Some(customize) => customize(base, &self.properties),
            None => base,
        };

        #[cfg(test)]
        if let Some(probe) = &self.resource_probe {
            *probe.lock().expect("probe mutex poisoned") = Some(resource.clone());
        }

        if disabled {
            debug!("telemetry SDK disabled; building providers without exporters");
            return Ok(OpenTelemetrySdk {
                tracer_provider: SdkTracerProvider::builder()
                    .with_resource(resource.clone())
                    .build(),
                meter_provider: SdkMeterProvider::builder()
                    .with_resource(resource.clone())
                    .build(),
                logger_provider: SdkLoggerProvider::builder()
                    .with_resource(resource)
                    .build(),
            });
        }

        let span_exporter = SpanExporter::builder().with_tonic().build()?;
        let metric_exporter = MetricExporter::builder().with_tonic().build()?;
        let log_exporter = LogExporter::builder().with_tonic().build()?;

        let tracer_provider = SdkTracerProvider::builder()
            .with_resource(resource.clone())
            .with_batch_exporter(span_exporter)
            .build();

        // A catch-all view caps every instrument stream; streams keep their
        // instrument defaults otherwise.
        let meter_provider = SdkMeterProvider::builder()
            .with_resource(resource.clone())
            .with_periodic_exporter(metric_exporter)
            .with_view(move |_: &Instrument| {
                Stream::builder()
                    .with_cardinality_limit(cardinality_limit)
                    .build()
                    .ok()
            })
            .build();

        let logger_provider = SdkLoggerProvider::builder()
            .with_resource(resource)
            .with_batch_exporter(log_exporter)
            .build();

        Ok(OpenTelemetrySdk {
            tracer_provider,
            meter_provider,
            logger_provider,
        })
    }
}

/// Live telemetry handle: one provider per signal, all carrying the merged
/// resource.
///
/// Providers are `Arc`-backed and cheap to clone; clones held by
/// instrumentation call sites remain safe to use while a shutdown is in
/// flight. That race is handled by the SDK itself.
#[derive(Clone)]
pub struct OpenTelemetrySdk {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    logger_provider: SdkLoggerProvider,
}

impl OpenTelemetrySdk {
    /// Provider for span instrumentation.
    pub fn tracer_provider(&self) -> &SdkTracerProvider {
        &self.tracer_provider
    }

    /// Provider for metric instrumentation.
    pub fn meter_provider(&self) -> &SdkMeterProvider {
        &self.meter_provider
    }

    /// Provider for log emission.
    pub fn logger_provider(&self) -> &SdkLoggerProvider {
        &self.logger_provider
    }

    /// Shut down all three providers, flushing pending telemetry.
    ///
    /// Every provider is attempted even when an earlier one fails; the first
    /// failure is returned.
    pub(crate) fn shutdown(self) -> Result<(), TelemetryError> {
        let traces = self.tracer_provider.shutdown();
        let metrics = self.meter_provider.shutdown();
        let logs = self.logger_provider.shutdown();
        traces?;
        metrics?;
        logs?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn customizer_runs_exactly_once() {
        temp_env::with_var_unset("OTEL_SDK_DISABLED", || {
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = calls.clone();

            let sdk = SdkBuilder::new(PropertyOverrides::sdk_defaults())
                .with_resource_customizer(move |base, _props| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    base
                })
                .build()
                .unwrap();

            assert_eq!(calls.load(Ordering::SeqCst), 1);
            sdk.shutdown().unwrap();
        });
    }

    #[test]
    fn disabled_build_produces_live_handle() {
        temp_env::with_var_unset("OTEL_SDK_DISABLED", || {
            let sdk = SdkBuilder::new(PropertyOverrides::sdk_defaults())
                .build()
                .unwrap();
            // Providers exist and shut down cleanly even without exporters.
            sdk.shutdown().unwrap();
        });
    }

    #[test]
    fn malformed_cardinality_fails_the_build() {
        temp_env::with_var(
            "OTEL_EXPERIMENTAL_METRICS_CARDINALITY_LIMIT",
            Some("many"),
            || {
                let result = SdkBuilder::new(PropertyOverrides::sdk_defaults()).build();
                assert!(matches!(
                    result,
                    Err(TelemetryError::InvalidProperty { .. })
                ));
            },
        );
    }
}
