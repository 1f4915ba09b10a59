//! The metadata interceptor (§4.4): extracts a call-scoped
//! [`CredentialContext`] from the transport's metadata map.
//!
//! Unlike the teacher's `identity::extract_bearer_token` (which rejects a
//! missing/malformed header outright), this interceptor never rejects — per
//! §4.4 "Always runs; never rejects — decisions are made by the
//! Authenticator after the Registry has resolved the target." A missing or
//! malformed header just yields `None` for that credential.

use exposer_core::CredentialContext;
use tonic::metadata::MetadataMap;

const AUTHORIZATION_KEY: &str = "authorization";
const API_KEY_HEADER: &str = "x-api-key";

/// Extract a [`CredentialContext`] from `metadata` (§4.4 "Interceptor").
pub fn extract_credentials(metadata: &MetadataMap) -> CredentialContext {
    CredentialContext::new(extract_token(metadata), extract_key(metadata))
}

fn extract_token(metadata: &MetadataMap) -> Option<String> {
    let raw = metadata.get(AUTHORIZATION_KEY)?.to_str().ok()?;
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))
        .unwrap_or(trimmed);
    let token = without_scheme.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn extract_key(metadata: &MetadataMap) -> Option<String> {
    let raw = metadata.get(API_KEY_HEADER)?.to_str().ok()?;
    let key = raw.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::metadata::MetadataValue;

    fn metadata_with(key: &str, value: &str) -> MetadataMap {
        let mut metadata = MetadataMap::new();
        metadata.insert(key, MetadataValue::try_from(value).unwrap());
        metadata
    }

    #[test]
    fn strips_bearer_prefix_and_trims() {
        let metadata = metadata_with(AUTHORIZATION_KEY, "  Bearer abc123  ");
        assert_eq!(extract_credentials(&metadata).token.as_deref(), Some("abc123"));
    }

    #[test]
    fn accepts_bare_token_without_scheme() {
        let metadata = metadata_with(AUTHORIZATION_KEY, "abc123");
        assert_eq!(extract_credentials(&metadata).token.as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_headers_yield_no_credentials() {
        let metadata = MetadataMap::new();
        let credentials = extract_credentials(&metadata);
        assert!(credentials.token.is_none());
        assert!(credentials.key.is_none());
    }

    #[test]
    fn reads_trimmed_api_key() {
        let metadata = metadata_with(API_KEY_HEADER, "  k1  ");
        assert_eq!(extract_credentials(&metadata).key.as_deref(), Some("k1"));
    }
}
