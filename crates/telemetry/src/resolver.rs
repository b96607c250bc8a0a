//! Resource attribute merge policy.
//!
//! Decides, for each identity attribute, whether to inject the locally
//! supplied value or defer to a value an external layer (environment
//! variables, operator overrides) already configured into the base resource.

use opentelemetry::{Key, KeyValue, Value};
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::attribute::{SERVICE_NAME, SERVICE_VERSION};

use crate::attributes::PULSAR_CLUSTER;
use crate::config::ServiceIdentity;

/// Service name the SDK reports when nothing configured one.
///
/// Matches the fallback used by the SDK's provided-resource detector. A base
/// resource still carrying this value (or none at all) has not been
/// overridden externally.
pub const DEFAULT_SERVICE_NAME: &str = "unknown_service";

/// Merge the supplied identity into `base` under override-precedence rules.
///
/// Per attribute:
/// - `pulsar.cluster`: injected unless `base` already defines it. An
///   externally-set cluster always wins, unconditionally.
/// - `service.name`: injected only when non-blank and `base` still carries
///   `default_service_name` (or no value at all). An external override is
///   kept even when it differs from the supplied name.
/// - `service.version`: injected only when non-blank and `base` has no
///   version attribute. A presence check rather than a default-equality
///   check: versions have no universal default to compare against.
///
/// Attributes not injected pass through untouched, as does the schema URL.
/// The function is pure: identical inputs produce identical output.
pub fn merge_identity(
    base: &Resource,
    default_service_name: &Value,
    identity: &ServiceIdentity,
) -> Resource {
    let mut injected: Vec<KeyValue> = Vec::with_capacity(3);

    if base.get(&Key::from_static_str(PULSAR_CLUSTER)).is_none() {
        injected.push(KeyValue::new(PULSAR_CLUSTER, identity.cluster_name.clone()));
    }

    if let Some(name) = non_blank(identity.service_name.as_deref()) {
        let unmodified = match base.get(&Key::from_static_str(SERVICE_NAME)) {
            Some(current) => current == *default_service_name,
            None => true,
        };
        if unmodified {
            injected.push(KeyValue::new(SERVICE_NAME, name.to_owned()));
        }
    }

    if let Some(version) = non_blank(identity.service_version.as_deref()) {
        if base.get(&Key::from_static_str(SERVICE_VERSION)).is_none() {
            injected.push(KeyValue::new(SERVICE_VERSION, version.to_owned()));
        }
    }

    overlay(base, injected)
}

/// Overlay `injected` onto `base`: injected values replace, everything else
/// passes through unchanged.
fn overlay(base: &Resource, injected: Vec<KeyValue>) -> Resource {
    let passthrough = base
        .iter()
        .map(|(key, value)| KeyValue::new(key.clone(), value.clone()));
    let builder = match base.schema_url() {
        Some(url) => Resource::builder_empty().with_schema_url(passthrough, url.to_owned()),
        None => Resource::builder_empty().with_attributes(passthrough),
    };
    builder.with_attributes(injected).build()
}

/// `Some` only when the value contains at least one non-whitespace character.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
