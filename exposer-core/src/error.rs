//! Error kinds shared by the Registry, Dispatcher and Authenticator (§7).
//!
//! Kept as a plain hand-rolled enum, matching the teacher's `AppError` and
//! `SecurityError` rather than reaching for `thiserror` — the kind set here
//! is closed and the transport-status mapping lives at the RPC edge
//! (`exposer-grpc`), not in this crate.

use std::fmt;

/// The member referenced by `kind` was not found during a candidate scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKindName {
    Callable,
    Datum,
}

impl fmt::Display for MemberKindName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKindName::Callable => write!(f, "callable"),
            MemberKindName::Datum => write!(f, "datum"),
        }
    }
}

/// Unified error kind for lookup, dispatch and authentication failures (§7).
#[derive(Debug)]
pub enum DispatchError {
    /// No canonical or alias key matched the lookup (§4.1 "Fails with").
    NotFound(String),

    /// More than one candidate remained after overload-shape narrowing
    /// (§4.1 "AmbiguousInvocation", §4.2 "Overload inference").
    AmbiguousInvocation {
        base_key: String,
        candidates: Vec<String>,
    },

    /// Argument count did not match the resolved member's parameter count.
    ArityMismatch {
        expected: usize,
        actual: usize,
    },

    /// A write was attempted on a CALLABLE (§4.2 "Writes are NOT permitted").
    WrongKindForWrite,

    /// A write was attempted on an immutable DATUM (§4.2 "Write path").
    ImmutableTarget,

    /// The target method/accessor raised while running.
    InvocationFailure(String),

    /// All credential-related failures (§7): missing, malformed, expired,
    /// signature-invalid, issuer-mismatch, audience-mismatch, wrong-family.
    NotAuthenticated(String),

    /// A credential family is declared on a member but no validator for
    /// that family was configured (§4.3 "On validator-absent").
    MisconfiguredAuth(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NotFound(key) => write!(f, "member not found: {key}"),
            DispatchError::AmbiguousInvocation { base_key, candidates } => write!(
                f,
                "ambiguous invocation for '{base_key}', candidates: [{}]",
                candidates.join(", ")
            ),
            DispatchError::ArityMismatch { expected, actual } => {
                write!(f, "arity mismatch: expected {expected} arguments, got {actual}")
            }
            DispatchError::WrongKindForWrite => {
                write!(f, "write attempted on a callable member")
            }
            DispatchError::ImmutableTarget => write!(f, "write attempted on an immutable datum"),
            DispatchError::InvocationFailure(msg) => write!(f, "invocation failed: {msg}"),
            DispatchError::NotAuthenticated(msg) => write!(f, "not authenticated: {msg}"),
            DispatchError::MisconfiguredAuth(msg) => write!(f, "misconfigured authentication: {msg}"),
        }
    }
}

impl std::error::Error for DispatchError {}
