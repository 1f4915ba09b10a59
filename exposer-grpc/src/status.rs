//! `DispatchError` -> `tonic::Status` mapping (§6 "Error code mapping").
//!
//! Resolves the open question in §9 #1 (`PERMISSION_DENIED` vs
//! `UNAUTHENTICATED` for a wrong-family credential) the same way
//! `exposer_core`'s own error kind already does: `DispatchError::NotAuthenticated`
//! is the single kind for every credential-related failure, wrong-family
//! included, and always maps to `UNAUTHENTICATED`. `PERMISSION_DENIED` is
//! left unused rather than wired to a guess at "well-formed but wrong
//! family", since the Authenticator has no way to tell that case apart from
//! "absent" without validating a credential the member's family doesn't even
//! accept.

use exposer_core::DispatchError;
use tonic::Status;

pub fn to_status(err: DispatchError) -> Status {
    match err {
        DispatchError::NotFound(key) => Status::not_found(format!("no such member: {key}")),
        DispatchError::NotAuthenticated(msg) => Status::unauthenticated(msg),
        DispatchError::MisconfiguredAuth(msg) => Status::unauthenticated(msg),
        DispatchError::ImmutableTarget => {
            Status::failed_precondition("datum is immutable")
        }
        DispatchError::WrongKindForWrite => {
            Status::invalid_argument("write requested on a callable member")
        }
        DispatchError::ArityMismatch { expected, actual } => Status::invalid_argument(format!(
            "arity mismatch: expected {expected} arguments, got {actual}"
        )),
        DispatchError::AmbiguousInvocation { base_key, candidates } => Status::invalid_argument(
            format!("ambiguous invocation for '{base_key}', candidates: [{}]", candidates.join(", ")),
        ),
        DispatchError::InvocationFailure(msg) => Status::internal(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn not_found_maps_to_not_found() {
        let status = to_status(DispatchError::NotFound("Foo.bar".into()));
        assert_eq!(status.code(), Code::NotFound);
    }

    #[test]
    fn immutable_target_maps_to_failed_precondition() {
        let status = to_status(DispatchError::ImmutableTarget);
        assert_eq!(status.code(), Code::FailedPrecondition);
    }

    #[test]
    fn invocation_failure_preserves_message() {
        let status = to_status(DispatchError::InvocationFailure("fail".into()));
        assert_eq!(status.code(), Code::Internal);
        assert!(status.message().contains("fail"));
    }
}
