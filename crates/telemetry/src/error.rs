//! Error types for telemetry bootstrap and shutdown.

use thiserror::Error;

/// Errors produced while constructing or releasing the telemetry SDK.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The cluster name was missing or blank. Raised before any SDK
    /// interaction takes place.
    #[error("cluster name cannot be empty")]
    MissingClusterName,

    /// Identity configuration could not be read from the environment.
    #[error("invalid telemetry configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// An operator-supplied property override could not be parsed.
    #[error("invalid value {value:?} for property {key}")]
    InvalidProperty {
        /// The property key the override was supplied for.
        key: &'static str,
        /// The rejected value.
        value: String,
    },

    /// An OTLP exporter could not be constructed.
    #[error("failed to build OTLP exporter: {0}")]
    ExporterBuild(#[from] opentelemetry_otlp::ExporterBuildError),

    /// A provider failed to flush and release its exporter on close.
    #[error("telemetry shutdown failed: {0}")]
    Shutdown(#[from] opentelemetry_sdk::error::OTelSdkError),
}
