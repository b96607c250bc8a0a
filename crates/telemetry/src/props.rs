//! SDK property overrides applied ahead of all other configuration sources.
//!
//! The override set makes the telemetry subsystem inert unless an operator
//! explicitly enables it, and caps metric stream cardinality at a fixed
//! ceiling. Lookups consult the process environment first, so operator
//! configuration always wins over the defaults registered here.

use std::collections::HashMap;
use std::env;

use crate::error::TelemetryError;

/// Property key controlling whether the SDK is built with exporters at all.
pub const OTEL_SDK_DISABLED: &str = "otel.sdk.disabled";

/// Property key for the per-stream metrics cardinality limit.
pub const METRICS_CARDINALITY_LIMIT: &str = "otel.experimental.metrics.cardinality.limit";

/// Hard ceiling on distinct attribute sets any single metric may track.
pub const MAX_CARDINALITY_LIMIT: usize = 10_000;

/// Default property values, consulted only when the process environment does
/// not define the corresponding variable.
#[derive(Debug, Clone)]
pub struct PropertyOverrides {
    defaults: HashMap<&'static str, String>,
}

impl PropertyOverrides {
    /// The override set applied at service construction: SDK disabled, and
    /// the cardinality limit at the ceiling plus one.
    ///
    /// The limit handed to the SDK includes the overflow attribute set it
    /// reserves for excess combinations, so the user-visible cap is exactly
    /// [`MAX_CARDINALITY_LIMIT`].
    pub fn sdk_defaults() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert(OTEL_SDK_DISABLED, "true".to_owned());
        defaults.insert(
            METRICS_CARDINALITY_LIMIT,
            (MAX_CARDINALITY_LIMIT + 1).to_string(),
        );
        Self { defaults }
    }

    /// Effective value for `key`.
    ///
    /// The process environment wins: the key is upper-cased with dots
    /// replaced by underscores (`otel.sdk.disabled` → `OTEL_SDK_DISABLED`)
    /// and, if that variable is set and non-empty, its value is returned.
    /// Otherwise the registered default, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        env::var(env_key(key))
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.defaults.get(key).cloned())
    }

    /// Whether the SDK should be built without exporters.
    pub fn sdk_disabled(&self) -> bool {
        self.get(OTEL_SDK_DISABLED)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// The effective metrics cardinality limit, overflow set included.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidProperty`] if an operator override is
    /// not a positive integer.
    pub fn cardinality_limit(&self) -> Result<usize, TelemetryError> {
        let value = self
            .get(METRICS_CARDINALITY_LIMIT)
            .unwrap_or_else(|| (MAX_CARDINALITY_LIMIT + 1).to_string());
        value
            .parse::<usize>()
            .ok()
            .filter(|limit| *limit > 0)
            .ok_or(TelemetryError::InvalidProperty {
                key: METRICS_CARDINALITY_LIMIT,
                value,
            })
    }
}

impl Default for PropertyOverrides {
    fn default() -> Self {
        Self::sdk_defaults()
    }
}

fn env_key(key: &str) -> String {
    key.to_ascii_uppercase().replace('.', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinality_default_is_ceiling_plus_one() {
        temp_env::with_var_unset("OTEL_EXPERIMENTAL_METRICS_CARDINALITY_LIMIT", || {
            let props = PropertyOverrides::sdk_defaults();
            let raw = props.get(METRICS_CARDINALITY_LIMIT).unwrap();
            assert_eq!(raw.parse::<usize>().unwrap(), MAX_CARDINALITY_LIMIT + 1);
            assert_eq!(props.cardinality_limit().unwrap(), MAX_CARDINALITY_LIMIT + 1);
        });
    }

    #[test]
    fn disabled_by_default() {
        temp_env::with_var_unset("OTEL_SDK_DISABLED", || {
            assert!(PropertyOverrides::sdk_defaults().sdk_disabled());
        });
    }

    #[test]
    fn environment_wins_over_defaults() {
        temp_env::with_var("OTEL_SDK_DISABLED", Some("false"), || {
            let props = PropertyOverrides::sdk_defaults();
            assert_eq!(props.get(OTEL_SDK_DISABLED).as_deref(), Some("false"));
            assert!(!props.sdk_disabled());
        });
    }

    #[test]
    fn empty_environment_value_falls_back_to_default() {
        temp_env::with_var("OTEL_SDK_DISABLED", Some(""), || {
            assert!(PropertyOverrides::sdk_defaults().sdk_disabled());
        });
    }

    #[test]
    fn operator_cardinality_override_is_honoured() {
        temp_env::with_var(
            "OTEL_EXPERIMENTAL_METRICS_CARDINALITY_LIMIT",
            Some("500"),
            || {
                let props = PropertyOverrides::sdk_defaults();
                assert_eq!(props.cardinality_limit().unwrap(), 500);
            },
        );
    }

    #[test]
    fn malformed_cardinality_override_is_rejected() {
        temp_env::with_var(
            "OTEL_EXPERIMENTAL_METRICS_CARDINALITY_LIMIT",
            Some("lots"),
            || {
                let props = PropertyOverrides::sdk_defaults();
                assert!(matches!(
                    props.cardinality_limit(),
                    Err(TelemetryError::InvalidProperty { .. })
                ));
            },
        );
    }

    #[test]
    fn zero_cardinality_override_is_rejected() {
        temp_env::with_var(
            "OTEL_EXPERIMENTAL_METRICS_CARDINALITY_LIMIT",
            Some("0"),
            || {
                let props = PropertyOverrides::sdk_defaults();
                assert!(props.cardinality_limit().is_err());
            },
        );
    }

    #[test]
    fn env_key_mapping() {
        assert_eq!(env_key(OTEL_SDK_DISABLED), "OTEL_SDK_DISABLED");
        assert_eq!(
            env_key(METRICS_CARDINALITY_LIMIT),
            "OTEL_EXPERIMENTAL_METRICS_CARDINALITY_LIMIT"
        );
    }
}
