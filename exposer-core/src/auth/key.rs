//! Key-family validation (§4.3 "Key validation").

use crate::auth::config::KeyFamilyConfig;

/// Validates a shared key by linear search (§4.3: "the set size is small
/// and operator-controlled... permits operator-driven rotation without
/// downtime").
pub struct KeyValidator {
    keys: Vec<String>,
}

impl KeyValidator {
    pub fn new(config: &KeyFamilyConfig) -> Self {
        Self {
            keys: config.keys.clone(),
        }
    }

    pub fn validate(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(keys: &[&str]) -> KeyFamilyConfig {
        KeyFamilyConfig {
            enabled: true,
            keys: keys.iter().map(|k| k.to_string()).collect(),
            header_name: "x-api-key".to_string(),
        }
    }

    #[test]
    fn accepts_a_configured_key() {
        let validator = KeyValidator::new(&config(&["alpha", "beta"]));
        assert!(validator.validate("beta"));
    }

    #[test]
    fn rejects_an_unconfigured_key() {
        let validator = KeyValidator::new(&config(&["alpha", "beta"]));
        assert!(!validator.validate("gamma"));
    }

    #[test]
    fn rotation_is_additive() {
        let mut cfg = config(&["alpha"]);
        cfg.keys.push("beta".to_string());
        let validator = KeyValidator::new(&cfg);
        assert!(validator.validate("alpha"));
        assert!(validator.validate("beta"));
    }
}
