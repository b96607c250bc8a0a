//! OpenTelemetry bootstrap for Pulsar cluster components.
//!
//! Produces one correctly-attributed telemetry handle per process. Identity
//! attributes (cluster name, service name, service version) are merged into
//! the SDK resource under override-precedence rules: anything an operator
//! already configured externally wins over programmatic defaults.
//!
//! # Bootstrap invariants
//!
//! - The SDK is **disabled by default**: unless an operator sets
//!   `OTEL_SDK_DISABLED=false`, providers are built without exporters and
//!   every emit is a no-op.
//! - Metric streams are capped at [`props::MAX_CARDINALITY_LIMIT`] distinct
//!   attribute sets; the SDK reserves one extra set for overflow.
//! - The merged resource is computed exactly once, during construction, and
//!   is immutable afterward.

pub mod attributes;
pub mod config;
pub mod error;
pub mod props;
pub mod resolver;
pub mod sdk;
pub mod service;

pub use config::ServiceIdentity;
pub use error::TelemetryError;
pub use sdk::OpenTelemetrySdk;
pub use service::{OpenTelemetryService, OpenTelemetryServiceBuilder};
