//! The Authenticator subsystem (§4.3).

pub mod authenticator;
pub mod config;
pub mod jwks;
pub mod key;
pub mod token;

pub use authenticator::{Authenticator, CredentialContext};
pub use config::{KeyFamilyConfig, SecurityConfig, TokenFamilyConfig};
