//! Security configuration (§6 "Configuration surface").

use jsonwebtoken::Algorithm;

/// Token-family configuration (§6: "token-family: {enabled, issuer URI,
/// key-set URI, audience set, token-cache TTL in seconds, clock-skew
/// allowance in seconds}").
#[derive(Clone, Debug)]
pub struct TokenFamilyConfig {
    pub enabled: bool,
    pub issuer: String,
    pub jwks_url: String,
    pub audience: Vec<String>,
    pub cache_ttl_secs: u64,
    pub clock_skew_secs: u64,
    /// Minimum interval between JWKS refresh attempts, matching the
    /// teacher's `jwks_min_refresh_interval_secs` (not wire-facing; an
    /// internal tuning knob with a sane default).
    pub jwks_min_refresh_interval_secs: u64,
    pub allowed_algorithms: Vec<Algorithm>,
}

impl Default for TokenFamilyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            issuer: String::new(),
            jwks_url: String::new(),
            audience: Vec::new(),
            cache_ttl_secs: 3600,
            clock_skew_secs: 60,
            jwks_min_refresh_interval_secs: 10,
            allowed_algorithms: vec![Algorithm::RS256],
        }
    }
}

/// Key-family configuration (§6: "key-family: {enabled, sequence of keys,
/// key header name}").
#[derive(Clone, Debug)]
pub struct KeyFamilyConfig {
    pub enabled: bool,
    pub keys: Vec<String>,
    pub header_name: String,
}

impl Default for KeyFamilyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            keys: Vec::new(),
            header_name: "x-api-key".to_string(),
        }
    }
}

/// Top-level security configuration (§6): the global off-switch plus both
/// credential families.
#[derive(Clone, Debug, Default)]
pub struct SecurityConfig {
    /// Global off-switch (§4.3 "then global-disable"). When `false`, every
    /// call is treated as public regardless of a member's `secured` flag.
    pub enabled: bool,
    pub token: TokenFamilyConfig,
    pub key: KeyFamilyConfig,
}
