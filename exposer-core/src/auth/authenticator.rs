//! The Authenticator (§4.3): credential-family enforcement in the order
//! public → global-disable → family-specific.

use std::sync::Arc;

use crate::auth::config::SecurityConfig;
use crate::auth::jwks::JwksCache;
use crate::auth::key::KeyValidator;
use crate::auth::token::TokenValidator;
use crate::error::DispatchError;
use crate::member::{CredentialFamily, ExposableMember};

/// Credentials read off the transport's metadata map once per call (unary)
/// or once per stream (bidi, §4.4), never logged verbatim.
#[derive(Clone, Debug, Default)]
pub struct CredentialContext {
    pub token: Option<String>,
    pub key: Option<String>,
}

impl CredentialContext {
    pub fn new(token: Option<String>, key: Option<String>) -> Self {
        Self { token, key }
    }
}

/// Owns the two family validators and runs the check order from §4.3.
pub struct Authenticator {
    config: SecurityConfig,
    token_validator: Option<TokenValidator>,
    key_validator: Option<KeyValidator>,
}

impl Authenticator {
    /// Build an authenticator from configuration, fetching the initial JWKS
    /// key set if the token family is enabled.
    pub async fn new(config: SecurityConfig) -> Result<Self, DispatchError> {
        let token_validator = if config.token.enabled {
            let jwks = JwksCache::new(config.token.clone()).await?;
            Some(TokenValidator::new(Arc::new(jwks), config.token.clone()))
        } else {
            None
        };

        let key_validator = if config.key.enabled {
            Some(KeyValidator::new(&config.key))
        } else {
            None
        };

        Ok(Self {
            config,
            token_validator,
            key_validator,
        })
    }

    /// Construct an authenticator with validators supplied directly
    /// (test/embedding seam — avoids a live JWKS fetch).
    pub fn with_validators(
        config: SecurityConfig,
        token_validator: Option<TokenValidator>,
        key_validator: Option<KeyValidator>,
    ) -> Self {
        Self {
            config,
            token_validator,
            key_validator,
        }
    }

    /// Authorize a call against `member`'s credential requirements (§4.3).
    pub async fn authenticate(
        &self,
        member: &ExposableMember,
        credentials: &CredentialContext,
    ) -> Result<(), DispatchError> {
        if !member.secured {
            return Ok(());
        }

        if !self.config.enabled {
            return Ok(());
        }

        match member.credential_family {
            None => Ok(()),
            Some(CredentialFamily::TokenOnly) => self.check_token(credentials).await,
            Some(CredentialFamily::KeyOnly) => self.check_key(credentials),
            Some(CredentialFamily::Either) => {
                if let Some(token) = credentials.token.as_deref().filter(|t| !t.is_empty()) {
                    match self.validate_token(token).await {
                        Ok(()) => return Ok(()),
                        Err(_) => {
                            // fall through to the key family, per §4.3
                            // "on token failure (or token absent), try key"
                        }
                    }
                }
                self.check_key(credentials)
            }
        }
    }

    async fn check_token(&self, credentials: &CredentialContext) -> Result<(), DispatchError> {
        match credentials.token.as_deref().filter(|t| !t.is_empty()) {
            None => Err(DispatchError::NotAuthenticated("missing token".into())),
            Some(token) => self.validate_token(token).await,
        }
    }

    async fn validate_token(&self, token: &str) -> Result<(), DispatchError> {
        match &self.token_validator {
            None => Err(DispatchError::MisconfiguredAuth(
                "token family required but no token validator configured".into(),
            )),
            Some(validator) => validator.validate(token).await.map(|_| ()),
        }
    }

    fn check_key(&self, credentials: &CredentialContext) -> Result<(), DispatchError> {
        match credentials.key.as_deref().filter(|k| !k.is_empty()) {
            None => Err(DispatchError::NotAuthenticated("missing key".into())),
            Some(key) => match &self.key_validator {
                None => Err(DispatchError::MisconfiguredAuth(
                    "key family required but no key validator configured".into(),
                )),
                Some(validator) => {
                    if validator.validate(key) {
                        Ok(())
                    } else {
                        Err(DispatchError::NotAuthenticated("key not recognised".into()))
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::config::KeyFamilyConfig;
    use crate::dispatcher::static_target;
    use crate::member::{MemberHandle, MemberKind};

    fn secured_member(family: CredentialFamily) -> ExposableMember {
        ExposableMember {
            container_name: "Vault",
            member_name: "secret",
            kind: MemberKind::Datum,
            secured: true,
            credential_family: Some(family),
            immutable: true,
            is_static: false,
            parameters: Vec::new(),
            return_type_name: "String",
            description: "",
            target: static_target(),
            handle: MemberHandle::Datum {
                read: Arc::new(|_| Ok(serde_json::Value::String("shh".into()))),
                write: None,
            },
        }
    }

    fn unsecured_member() -> ExposableMember {
        let mut m = secured_member(CredentialFamily::KeyOnly);
        m.secured = false;
        m.credential_family = None;
        m
    }

    fn authenticator(enabled: bool, keys: &[&str]) -> Authenticator {
        let config = SecurityConfig {
            enabled,
            token: Default::default(),
            key: KeyFamilyConfig {
                enabled: true,
                keys: keys.iter().map(|k| k.to_string()).collect(),
                header_name: "x-api-key".into(),
            },
        };
        let key_validator = KeyValidator::new(&config.key);
        Authenticator::with_validators(config, None, Some(key_validator))
    }

    #[tokio::test]
    async fn public_member_bypasses_credentials() {
        let auth = authenticator(true, &["k1"]);
        let result = auth
            .authenticate(&unsecured_member(), &CredentialContext::default())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn global_disable_bypasses_credentials() {
        let auth = authenticator(false, &["k1"]);
        let member = secured_member(CredentialFamily::KeyOnly);
        let result = auth.authenticate(&member, &CredentialContext::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn key_only_accepts_configured_key() {
        let auth = authenticator(true, &["k1"]);
        let member = secured_member(CredentialFamily::KeyOnly);
        let creds = CredentialContext::new(None, Some("k1".to_string()));
        assert!(auth.authenticate(&member, &creds).await.is_ok());
    }

    #[tokio::test]
    async fn key_only_rejects_missing_key() {
        let auth = authenticator(true, &["k1"]);
        let member = secured_member(CredentialFamily::KeyOnly);
        let result = auth.authenticate(&member, &CredentialContext::default()).await;
        assert!(matches!(result, Err(DispatchError::NotAuthenticated(_))));
    }

    #[tokio::test]
    async fn key_only_ignores_a_present_token() {
        let auth = authenticator(true, &["k1"]);
        let member = secured_member(CredentialFamily::KeyOnly);
        let creds = CredentialContext::new(Some("some-token".to_string()), None);
        let result = auth.authenticate(&member, &creds).await;
        assert!(matches!(result, Err(DispatchError::NotAuthenticated(_))));
    }

    #[tokio::test]
    async fn token_only_without_validator_is_misconfigured() {
        let auth = authenticator(true, &[]);
        let member = secured_member(CredentialFamily::TokenOnly);
        let creds = CredentialContext::new(Some("anything".to_string()), None);
        let result = auth.authenticate(&member, &creds).await;
        assert!(matches!(result, Err(DispatchError::MisconfiguredAuth(_))));
    }

    #[tokio::test]
    async fn either_falls_back_to_key_when_token_absent() {
        let auth = authenticator(true, &["k1"]);
        let member = secured_member(CredentialFamily::Either);
        let creds = CredentialContext::new(None, Some("k1".to_string()));
        assert!(auth.authenticate(&member, &creds).await.is_ok());
    }

    #[tokio::test]
    async fn either_fails_when_both_absent() {
        let auth = authenticator(true, &["k1"]);
        let member = secured_member(CredentialFamily::Either);
        let result = auth.authenticate(&member, &CredentialContext::default()).await;
        assert!(matches!(result, Err(DispatchError::NotAuthenticated(_))));
    }
}
