//! Cluster-specific resource attribute keys.
//!
//! Keys in the `pulsar.` namespace, following the naming style of
//! `opentelemetry-semantic-conventions`.

/// Name of the cluster the telemetry-emitting process belongs to.
pub const PULSAR_CLUSTER: &str = "pulsar.cluster";
