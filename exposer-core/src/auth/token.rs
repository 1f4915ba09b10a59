//! Token validation (§4.3 "Token validation") with a bounded, advisory
//! memoisation cache (§5 "Token cache is a concurrent map").

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use jsonwebtoken::{decode, decode_header, Validation};
use tracing::{debug, warn};

use crate::auth::config::TokenFamilyConfig;
use crate::auth::jwks::JwksCache;
use crate::error::DispatchError;

/// Above this many memoised entries, an insertion prunes expired entries
/// inline (§5 "prune expired entries on insertion when cache exceeds
/// threshold" — "this is an optimistic strategy, acceptable because cache
/// is advisory").
const CACHE_PRUNE_THRESHOLD: usize = 4096;

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Validates bearer tokens and memoises the outcome by raw token string.
///
/// Never logs a token or key (§6.2 of SPEC_FULL.md's logging section).
pub struct TokenValidator {
    jwks: Arc<JwksCache>,
    config: TokenFamilyConfig,
    cache: DashMap<String, CachedClaims>,
    cache_len_hint: AtomicI64,
}

struct CachedClaims {
    claims: serde_json::Value,
    expires_at: i64,
}

impl TokenValidator {
    pub fn new(jwks: Arc<JwksCache>, config: TokenFamilyConfig) -> Self {
        Self {
            jwks,
            config,
            cache: DashMap::new(),
            cache_len_hint: AtomicI64::new(0),
        }
    }

    /// Validate `token`, returning its claims on success (§4.3).
    pub async fn validate(&self, token: &str) -> Result<serde_json::Value, DispatchError> {
        if let Some(entry) = self.cache.get(token) {
            if entry.expires_at > now_unix() {
                return Ok(entry.claims.clone());
            }
        }

        let claims = self.validate_uncached(token).await?;

        let exp = claims
            .get("exp")
            .and_then(|v| v.as_i64())
            .unwrap_or_else(|| now_unix() + self.config.cache_ttl_secs as i64);

        self.cache.insert(
            token.to_string(),
            CachedClaims {
                claims: claims.clone(),
                expires_at: exp,
            },
        );

        if self.cache_len_hint.fetch_add(1, Ordering::Relaxed) as usize >= CACHE_PRUNE_THRESHOLD {
            self.prune_expired();
        }

        Ok(claims)
    }

    fn prune_expired(&self) {
        let now = now_unix();
        self.cache.retain(|_, entry| entry.expires_at > now);
        self.cache_len_hint
            .store(self.cache.len() as i64, Ordering::Relaxed);
    }

    async fn validate_uncached(&self, token: &str) -> Result<serde_json::Value, DispatchError> {
        let header = decode_header(token)
            .map_err(|e| DispatchError::NotAuthenticated(format!("malformed token: {e}")))?;

        let algorithm = header.alg;
        debug!(?algorithm, kid = ?header.kid, "decoded token header");

        if self.config.allowed_algorithms.is_empty() {
            return Err(DispatchError::MisconfiguredAuth(
                "no allowed token algorithms configured".into(),
            ));
        }
        if !self.config.allowed_algorithms.contains(&algorithm) {
            return Err(DispatchError::NotAuthenticated(format!(
                "disallowed token algorithm: {algorithm:?}"
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| DispatchError::NotAuthenticated("token header missing 'kid'".into()))?;
        let decoding_key = self.jwks.get_key(&kid).await?;

        let mut validation = Validation::new(algorithm);
        validation.algorithms = self.config.allowed_algorithms.clone();
        validation.set_issuer(&[&self.config.issuer]);
        if !self.config.audience.is_empty() {
            validation.set_audience(&self.config.audience);
        }
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = self.config.clock_skew_secs;

        let data = decode::<serde_json::Value>(token, &decoding_key, &validation).map_err(|e| {
            let err = DispatchError::NotAuthenticated(describe_jwt_error(&e));
            warn!(error = %err, "token validation failed");
            err
        })?;

        Ok(data.claims)
    }
}

fn describe_jwt_error(err: &jsonwebtoken::errors::Error) -> String {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => "token expired".to_string(),
        ErrorKind::InvalidIssuer => "invalid issuer".to_string(),
        ErrorKind::InvalidAudience => "invalid audience".to_string(),
        ErrorKind::ImmatureSignature => "token not yet valid".to_string(),
        ErrorKind::InvalidSignature => "invalid signature".to_string(),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_unix_is_positive() {
        assert!(now_unix() > 0);
    }
}
