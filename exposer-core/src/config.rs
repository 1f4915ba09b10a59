//! Top-level configuration surface (§6 "Configuration surface").
//!
//! Loading order mirrors the teacher's layered resolution (`R2eConfig`):
//! a base YAML document, optionally overridden by environment variables.
//! Unlike the teacher's generic key-value config registry, `ExposerConfig`
//! is a single typed struct — this crate has a small, fixed configuration
//! shape, so a flattened `HashMap<String, ConfigValue>` would be more
//! machinery than the surface needs.

use serde::Deserialize;

use crate::auth::config::{KeyFamilyConfig, SecurityConfig, TokenFamilyConfig};

/// Connection-lifecycle tuning, plumbed to the transport builder verbatim
/// (§4.4 "Server config"). A value of `0` means "unlimited" throughout.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub enabled: bool,
    pub port: u16,
    pub max_inbound_message_size: u64,
    pub max_concurrent_calls: u32,
    pub keepalive_time_secs: u64,
    pub keepalive_timeout_secs: u64,
    pub permit_keepalive_without_calls: bool,
    pub max_connection_idle_secs: u64,
    pub max_connection_age_secs: u64,
    pub enable_reflection: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 50051,
            max_inbound_message_size: 0,
            max_concurrent_calls: 0,
            keepalive_time_secs: 0,
            keepalive_timeout_secs: 0,
            permit_keepalive_without_calls: false,
            max_connection_idle_secs: 0,
            max_connection_age_secs: 0,
            enable_reflection: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
struct RawTokenFamilyConfig {
    enabled: bool,
    issuer: String,
    jwks_url: String,
    audience: Vec<String>,
    cache_ttl_secs: Option<u64>,
    clock_skew_secs: Option<u64>,
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
struct RawKeyFamilyConfig {
    enabled: bool,
    keys: Vec<String>,
    header_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
struct RawSecurityConfig {
    enabled: bool,
    token: RawTokenFamilyConfig,
    key: RawKeyFamilyConfig,
}

/// Shape of the on-disk/env-facing document; converted into the typed
/// [`ExposerConfig`] the rest of the crate consumes.
#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    transport: TransportConfig,
    security: RawSecurityConfig,
}

/// The fully resolved configuration consumed by `exposer-grpc` and the
/// `Authenticator` (§6).
#[derive(Clone, Debug)]
pub struct ExposerConfig {
    pub transport: TransportConfig,
    pub security: SecurityConfig,
}

impl Default for ExposerConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

impl From<RawConfig> for ExposerConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = TokenFamilyConfig::default();
        ExposerConfig {
            transport: raw.transport,
            security: SecurityConfig {
                enabled: raw.security.enabled,
                token: TokenFamilyConfig {
                    enabled: raw.security.token.enabled,
                    issuer: raw.security.token.issuer,
                    jwks_url: raw.security.token.jwks_url,
                    audience: raw.security.token.audience,
                    cache_ttl_secs: raw.security.token.cache_ttl_secs.unwrap_or(defaults.cache_ttl_secs),
                    clock_skew_secs: raw
                        .security
                        .token
                        .clock_skew_secs
                        .unwrap_or(defaults.clock_skew_secs),
                    ..defaults
                },
                key: KeyFamilyConfig {
                    enabled: raw.security.key.enabled,
                    keys: raw.security.key.keys,
                    header_name: raw
                        .security
                        .key
                        .header_name
                        .unwrap_or_else(|| "x-api-key".to_string()),
                },
            },
        }
    }
}

/// Error surfaced while loading [`ExposerConfig`] (§6).
#[derive(Debug)]
pub enum ConfigLoadError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadError::Io(msg) => write!(f, "failed to read config file: {msg}"),
            ConfigLoadError::Parse(msg) => write!(f, "failed to parse config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigLoadError {}

impl ExposerConfig {
    /// Load configuration from a YAML file at `path`, a `.env` file in the
    /// working directory (loaded first so plain environment variables still
    /// win), then environment variable overrides (§6: "env var overrides").
    ///
    /// `.env` is loaded best-effort — a missing file is not an error, since
    /// it is purely a development convenience (matching the teacher's
    /// "`.env` files never overwrite already-set environment variables").
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigLoadError> {
        let _ = dotenvy::dotenv();

        let raw: RawConfig = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
            serde_yaml::from_str(&content).map_err(|e| ConfigLoadError::Parse(e.to_string()))?
        } else {
            RawConfig::default()
        };

        let mut config: ExposerConfig = raw.into();
        apply_env_overrides(&mut config);
        Ok(config)
    }
}

fn env_u16(key: &str, into: &mut u16) {
    if let Ok(v) = std::env::var(key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent)) {
        *into = v;
    }
}

fn env_u64(key: &str, into: &mut u64) {
    if let Ok(v) = std::env::var(key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent)) {
        *into = v;
    }
}

fn env_bool(key: &str, into: &mut bool) {
    if let Ok(v) = std::env::var(key) {
        *into = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }
}

fn env_string(key: &str, into: &mut String) {
    if let Ok(v) = std::env::var(key) {
        *into = v;
    }
}

/// Apply `EXPOSER_*` environment overrides on top of the YAML-sourced
/// config (§6 "env var overrides").
fn apply_env_overrides(config: &mut ExposerConfig) {
    env_bool("EXPOSER_TRANSPORT_ENABLED", &mut config.transport.enabled);
    env_u16("EXPOSER_TRANSPORT_PORT", &mut config.transport.port);
    env_u64(
        "EXPOSER_TRANSPORT_MAX_INBOUND_MESSAGE_SIZE",
        &mut config.transport.max_inbound_message_size,
    );
    env_bool(
        "EXPOSER_SECURITY_ENABLED",
        &mut config.security.enabled,
    );
    env_bool(
        "EXPOSER_TOKEN_ENABLED",
        &mut config.security.token.enabled,
    );
    env_string("EXPOSER_TOKEN_ISSUER", &mut config.security.token.issuer);
    env_string("EXPOSER_TOKEN_JWKS_URL", &mut config.security.token.jwks_url);
    env_bool("EXPOSER_KEY_ENABLED", &mut config.security.key.enabled);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive_but_disabled() {
        let config = ExposerConfig::default();
        assert!(config.transport.enabled);
        assert!(!config.security.enabled);
        assert_eq!(config.transport.max_inbound_message_size, 0);
    }

    #[test]
    fn yaml_parses_nested_security_section() {
        let yaml = r#"
transport:
  port: 9090
security:
  enabled: true
  token:
    enabled: true
    issuer: "https://issuer.example.com"
    jwks_url: "https://issuer.example.com/jwks.json"
    audience: ["exposer"]
  key:
    enabled: true
    keys: ["k1", "k2"]
"#;
        let raw: RawConfig = serde_yaml::from_str(yaml).unwrap();
        let config: ExposerConfig = raw.into();
        assert_eq!(config.transport.port, 9090);
        assert!(config.security.enabled);
        assert_eq!(config.security.token.issuer, "https://issuer.example.com");
        assert_eq!(config.security.key.keys, vec!["k1", "k2"]);
    }
}
