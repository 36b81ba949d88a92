use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides `primary_enabled` at startup.
pub const PRIMARY_ENABLED_ENV: &str = "SWITCHYARD_PRIMARY_ENABLED";
/// Environment variable that overrides `fallback_enabled` at startup.
pub const FALLBACK_ENABLED_ENV: &str = "SWITCHYARD_FALLBACK_ENABLED";

#[derive(Error, Debug, PartialEq)]
#[error("invalid value {value:?} for {var}: expected true/false/1/0")]
pub struct OverrideError {
    pub var: &'static str,
    pub value: String,
}

/// Routing flags and per-backend attempt limits. Resolved once at startup;
/// the dispatcher never re-reads flags mid-flight.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DispatchConfig {
    /// Whether reads and writes may be sent to the primary backend.
    #[serde(default = "default_enabled")]
    pub primary_enabled: bool,
    /// Whether reads may fall back to the legacy backend after a
    /// transient primary failure. Also gates legacy-only operation when
    /// the primary is disabled.
    #[serde(default = "default_enabled")]
    pub fallback_enabled: bool,
    /// Upper bound on a single primary attempt, in seconds.
    #[serde(default = "default_primary_timeout_secs")]
    pub primary_timeout_secs: u64,
    /// Upper bound on a single legacy attempt, in seconds. The legacy
    /// backend is slower, so this defaults higher.
    #[serde(default = "default_legacy_timeout_secs")]
    pub legacy_timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_primary_timeout_secs() -> u64 {
    10
}

fn default_legacy_timeout_secs() -> u64 {
    30
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            primary_enabled: default_enabled(),
            fallback_enabled: default_enabled(),
            primary_timeout_secs: default_primary_timeout_secs(),
            legacy_timeout_secs: default_legacy_timeout_secs(),
        }
    }
}

impl DispatchConfig {
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_secs(self.primary_timeout_secs)
    }

    pub fn legacy_timeout(&self) -> Duration {
        Duration::from_secs(self.legacy_timeout_secs)
    }

    /// Applies backend flag overrides from the process environment. The
    /// lookup is injected so tests can supply their own environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), OverrideError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(PRIMARY_ENABLED_ENV) {
            self.primary_enabled = parse_flag(PRIMARY_ENABLED_ENV, &raw)?;
        }
        if let Some(raw) = lookup(FALLBACK_ENABLED_ENV) {
            self.fallback_enabled = parse_flag(FALLBACK_ENABLED_ENV, &raw)?;
        }
        Ok(())
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, OverrideError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(OverrideError {
            var,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_document_yields_defaults() {
        let config: DispatchConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, DispatchConfig::default());
        assert!(config.primary_enabled);
        assert!(config.fallback_enabled);
        assert_eq!(config.primary_timeout(), Duration::from_secs(10));
        assert_eq!(config.legacy_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn yaml_fields_override_defaults() {
        let config: DispatchConfig = serde_yaml::from_str(
            "primary_enabled: false\nprimary_timeout_secs: 3\n",
        )
        .unwrap();
        assert!(!config.primary_enabled);
        assert!(config.fallback_enabled);
        assert_eq!(config.primary_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn overrides_apply_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            (PRIMARY_ENABLED_ENV, "false"),
            (FALLBACK_ENABLED_ENV, "1"),
        ]);
        let mut config = DispatchConfig::default();
        config
            .apply_overrides(|var| env.get(var).map(|v| v.to_string()))
            .unwrap();
        assert!(!config.primary_enabled);
        assert!(config.fallback_enabled);
    }

    #[test]
    fn missing_variables_leave_config_untouched() {
        let mut config = DispatchConfig::default();
        config.fallback_enabled = false;
        config.apply_overrides(|_| None).unwrap();
        assert!(config.primary_enabled);
        assert!(!config.fallback_enabled);
    }

    #[test]
    fn unparseable_flag_is_rejected() {
        let mut config = DispatchConfig::default();
        let err = config
            .apply_overrides(|var| (var == PRIMARY_ENABLED_ENV).then(|| "maybe".to_string()))
            .unwrap_err();
        assert_eq!(err.var, PRIMARY_ENABLED_ENV);
        assert_eq!(err.value, "maybe");
    }
}
