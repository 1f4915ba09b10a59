//! JWKS fetch-and-cache layer backing token validation (§4.3 "resolved from
//! a remote key-set endpoint").
//!
//! Ported from the teacher's JWKS cache almost verbatim — the staleness and
//! refresh-throttling logic is orthogonal to what the key set is used for.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

use crate::auth::config::TokenFamilyConfig;
use crate::error::DispatchError;

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    #[serde(default)]
    alg: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// Raw key components, kept instead of a constructed `DecodingKey` since the
/// latter does not implement `Clone`.
#[derive(Debug, Clone)]
struct CachedJwk {
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

impl CachedJwk {
    fn to_decoding_key(&self) -> Result<DecodingKey, DispatchError> {
        match self.kty.as_str() {
            "RSA" => {
                let n = self.n.as_deref().ok_or_else(|| {
                    DispatchError::NotAuthenticated("RSA key missing 'n' component".into())
                })?;
                let e = self.e.as_deref().ok_or_else(|| {
                    DispatchError::NotAuthenticated("RSA key missing 'e' component".into())
                })?;
                DecodingKey::from_rsa_components(n, e).map_err(|err| {
                    DispatchError::NotAuthenticated(format!(
                        "failed to construct RSA decoding key: {err}"
                    ))
                })
            }
            "EC" => {
                let n = self.n.as_deref().ok_or_else(|| {
                    DispatchError::NotAuthenticated("EC key missing 'x' component".into())
                })?;
                let e = self.e.as_deref().ok_or_else(|| {
                    DispatchError::NotAuthenticated("EC key missing 'y' component".into())
                })?;
                DecodingKey::from_ec_components(n, e).map_err(|err| {
                    DispatchError::NotAuthenticated(format!(
                        "failed to construct EC decoding key: {err}"
                    ))
                })
            }
            other => Err(DispatchError::NotAuthenticated(format!(
                "unsupported key type: {other}"
            ))),
        }
    }
}

struct CacheInner {
    keys: HashMap<String, CachedJwk>,
    last_refresh: Option<Instant>,
    last_refresh_attempt: Option<Instant>,
}

/// Keyed by `kid`. On a miss, refreshes from the endpoint before failing
/// (§4.3, §5 "consulted during first-time validation of a token with an
/// unseen key-id").
pub struct JwksCache {
    inner: Arc<RwLock<CacheInner>>,
    config: TokenFamilyConfig,
    client: reqwest::Client,
    refresh_lock: Mutex<()>,
}

impl JwksCache {
    pub async fn new(config: TokenFamilyConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::new();
        let cache = Self {
            inner: Arc::new(RwLock::new(CacheInner {
                keys: HashMap::new(),
                last_refresh: None,
                last_refresh_attempt: None,
            })),
            config,
            client,
            refresh_lock: Mutex::new(()),
        };
        cache.refresh().await?;
        Ok(cache)
    }

    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, DispatchError> {
        let ttl = Duration::from_secs(self.config.cache_ttl_secs);

        let mut needs_refresh = false;
        let mut force_refresh = false;
        {
            let cache = self.inner.read().await;
            if let Some(jwk) = cache.keys.get(kid) {
                if is_stale(cache.last_refresh, ttl) {
                    needs_refresh = true;
                } else {
                    return jwk.to_decoding_key();
                }
            } else {
                needs_refresh = true;
                force_refresh = true;
            }
        }

        if needs_refresh {
            self.try_refresh(force_refresh).await?;
        }

        let cache = self.inner.read().await;
        cache
            .keys
            .get(kid)
            .ok_or_else(|| DispatchError::NotAuthenticated(format!("unknown signing key: {kid}")))?
            .to_decoding_key()
    }

    async fn refresh(&self) -> Result<(), DispatchError> {
        let response = self
            .client
            .get(&self.config.jwks_url)
            .send()
            .await
            .map_err(|e| DispatchError::NotAuthenticated(format!("jwks fetch error: {e}")))?;

        let response = response
            .error_for_status()
            .map_err(|e| DispatchError::NotAuthenticated(format!("jwks fetch error: {e}")))?;

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            DispatchError::NotAuthenticated(format!("failed to parse jwks: {e}"))
        })?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            if let Some(kid) = &jwk.kid {
                keys.insert(
                    kid.clone(),
                    CachedJwk {
                        kty: jwk.kty.clone(),
                        n: jwk.n.clone(),
                        e: jwk.e.clone(),
                    },
                );
            }
        }

        let now = Instant::now();
        let mut cache = self.inner.write().await;
        cache.keys = keys;
        cache.last_refresh = Some(now);
        cache.last_refresh_attempt = Some(now);

        Ok(())
    }

    async fn try_refresh(&self, force: bool) -> Result<(), DispatchError> {
        let ttl = Duration::from_secs(self.config.cache_ttl_secs);
        let min_interval = Duration::from_secs(self.config.jwks_min_refresh_interval_secs);

        {
            let cache = self.inner.read().await;
            if !force && !is_stale(cache.last_refresh, ttl) {
                return Ok(());
            }
            if !can_attempt(cache.last_refresh_attempt, min_interval) {
                return Ok(());
            }
        }

        let _guard = self.refresh_lock.lock().await;

        {
            let cache = self.inner.read().await;
            if !force && !is_stale(cache.last_refresh, ttl) {
                return Ok(());
            }
            if !can_attempt(cache.last_refresh_attempt, min_interval) {
                return Ok(());
            }
        }

        {
            let mut cache = self.inner.write().await;
            cache.last_refresh_attempt = Some(Instant::now());
        }

        self.refresh().await
    }
}

fn is_stale(last_refresh: Option<Instant>, ttl: Duration) -> bool {
    match last_refresh {
        None => true,
        Some(ts) => ts.elapsed() >= ttl,
    }
}

fn can_attempt(last_attempt: Option<Instant>, min_interval: Duration) -> bool {
    match last_attempt {
        None => true,
        Some(ts) => ts.elapsed() >= min_interval,
    }
}

#[cfg(test)]
mod tests {
    use super::{can_attempt, is_stale};
    use std::time::{Duration, Instant};

    #[test]
    fn stale_when_never_refreshed() {
        assert!(is_stale(None, Duration::from_secs(60)));
    }

    #[test]
    fn stale_when_ttl_elapsed() {
        let ts = Instant::now() - Duration::from_secs(61);
        assert!(is_stale(Some(ts), Duration::from_secs(60)));
    }

    #[test]
    fn not_stale_before_ttl() {
        let ts = Instant::now() - Duration::from_secs(10);
        assert!(!is_stale(Some(ts), Duration::from_secs(60)));
    }

    #[test]
    fn can_attempt_when_never_attempted() {
        assert!(can_attempt(None, Duration::from_secs(10)));
    }

    #[test]
    fn can_attempt_when_interval_elapsed() {
        let ts = Instant::now() - Duration::from_secs(11);
        assert!(can_attempt(Some(ts), Duration::from_secs(10)));
    }

    #[test]
    fn cannot_attempt_too_soon() {
        let ts = Instant::now() - Duration::from_secs(3);
        assert!(!can_attempt(Some(ts), Duration::from_secs(10)));
    }
}
