//! The Dispatcher (§4.2): invoke/read/write paths and overload inference.
//!
//! Unlike the Registry, the Dispatcher holds no state of its own — it is a
//! set of free functions operating on an already-resolved [`ExposableMember`]
//! (or, for the overload case, a [`Resolution::Ambiguous`] set still to be
//! narrowed). Per-parameter coercion happens inside the generated
//! [`MemberHandle::Callable::invoke`] closure via [`crate::value::coerce`];
//! this module is the part of §4.2 that is the same for every container
//! type — arity checking, the void sentinel, the immutable gate, and
//! overload-shape narrowing.

use std::any::Any;
use std::sync::Arc;

use serde_json::Value as DynamicValue;

use crate::error::DispatchError;
use crate::member::{ExposableMember, MemberHandle, MemberKind};
use crate::registry::Resolution;
use crate::value::{kind_of, is_shape_compatible};

/// The sentinel yielded for a void/unit-returning CALLABLE (§4.2 "Result handling").
pub fn void_sentinel() -> DynamicValue {
    serde_json::json!({"status": "accepted"})
}

/// Dispatch an already-resolved CALLABLE invocation (§4.2 "Invoke path").
///
/// `resolution` may still be [`Resolution::Ambiguous`] — this performs
/// overload narrowing (§4.2 "Overload inference") before dispatching.
pub async fn invoke(
    resolution: Resolution,
    args: Vec<DynamicValue>,
) -> Result<DynamicValue, DispatchError> {
    let member = narrow(resolution, &args)?;

    let MemberKind::Callable = member.kind else {
        // A direct base-key hit can resolve to a DATUM (§4.1 step 2) just as
        // easily as a CALLABLE — `InvokeCallable` on a DATUM is a read, not
        // a not-found (§4.2 "Invoke path" is silent on this, but §8 S3 and
        // property P5 both require `InvokeCallable` to return the datum's
        // current value).
        return read(&member);
    };

    let expected = member.parameters.len();
    if args.len() != expected {
        return Err(DispatchError::ArityMismatch {
            expected,
            actual: args.len(),
        });
    }

    let MemberHandle::Callable { invoke } = &member.handle else {
        unreachable!("MemberKind::Callable always pairs with MemberHandle::Callable");
    };

    invoke(Arc::clone(&member.target), args).await
}

/// Dispatch a DATUM read (§4.2 "Read path").
pub fn read(member: &ExposableMember) -> Result<DynamicValue, DispatchError> {
    match &member.handle {
        MemberHandle::Datum { read, .. } => read(Arc::clone(&member.target)),
        MemberHandle::Callable { .. } => Err(DispatchError::NotFound(member.base_key())),
    }
}

/// Dispatch a DATUM write (§4.2 "Write path").
///
/// Returns the previous value's serialisation on success, per §6
/// `WriteResponse.previousValue`.
pub fn write(member: &ExposableMember, value: DynamicValue) -> Result<DynamicValue, DispatchError> {
    match &member.handle {
        MemberHandle::Callable { .. } => Err(DispatchError::WrongKindForWrite),
        MemberHandle::Datum { write, .. } => match write {
            None => Err(DispatchError::ImmutableTarget),
            Some(write) => write(Arc::clone(&member.target), value),
        },
    }
}

/// Narrow a [`Resolution`] to a single member (§4.2 "Overload inference").
///
/// A [`Resolution::Found`] passes through unchanged. A
/// [`Resolution::Ambiguous`] is filtered by argument-shape compatibility; if
/// exactly one candidate survives, it is used; otherwise the ambiguity is
/// re-surfaced with the surviving candidate set (which may be the original
/// set, if none or more than one matched).
fn narrow(resolution: Resolution, args: &[DynamicValue]) -> Result<ExposableMember, DispatchError> {
    match resolution {
        Resolution::Found(member) => Ok(member),
        Resolution::Ambiguous(candidates) => {
            let base_key = candidates
                .first()
                .map(|m| m.base_key())
                .unwrap_or_default();

            let matches: Vec<ExposableMember> = candidates
                .iter()
                .filter(|m| shape_matches(m, args))
                .cloned()
                .collect();

            match matches.len() {
                1 => Ok(matches.into_iter().next().unwrap()),
                _ => Err(DispatchError::AmbiguousInvocation {
                    base_key,
                    candidates: candidates.iter().map(|m| m.full_key()).collect(),
                }),
            }
        }
    }
}

/// Whether every argument's shape is compatible with `candidate`'s declared
/// parameter types, in order (§4.2 "Overload inference").
fn shape_matches(candidate: &ExposableMember, args: &[DynamicValue]) -> bool {
    if candidate.parameters.len() != args.len() {
        return false;
    }
    candidate
        .parameters
        .iter()
        .zip(args.iter())
        .all(|(param, arg)| is_shape_compatible(kind_of(arg), param.type_name))
}

/// Serialise a target-raised failure into a [`DispatchError::InvocationFailure`].
///
/// Generated invoke closures call this when the underlying method's `Result`
/// comes back `Err`; kept here rather than in `value.rs` since it is purely
/// about dispatch-path error mapping, not value shaping.
pub fn invocation_failure<E: std::fmt::Display>(err: E) -> DispatchError {
    DispatchError::InvocationFailure(err.to_string())
}

/// Marker used by generated code to produce a target instance for static
/// members, which have no real container instance to downcast.
///
/// `exposer-macros` registers static members with this as their `target`.
pub struct StaticMarker;

pub fn static_target() -> Arc<dyn Any + Send + Sync> {
    Arc::new(StaticMarker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{MemberHandle, ParameterInfo};
    use std::sync::Arc;

    fn datum_member(name: &'static str, value: i64, immutable: bool) -> ExposableMember {
        let cell = Arc::new(std::sync::Mutex::new(value));
        let read_cell = Arc::clone(&cell);
        let write_cell = Arc::clone(&cell);
        ExposableMember {
            container_name: "Counter",
            member_name: name,
            kind: MemberKind::Datum,
            secured: false,
            credential_family: None,
            immutable,
            is_static: false,
            parameters: Vec::new(),
            return_type_name: "i64",
            description: "",
            target: static_target(),
            handle: MemberHandle::Datum {
                read: Arc::new(move |_target| {
                    Ok(DynamicValue::from(*read_cell.lock().unwrap()))
                }),
                write: if immutable {
                    None
                } else {
                    Some(Arc::new(move |_target, value| {
                        let previous = *write_cell.lock().unwrap();
                        let new_value: i64 = crate::value::coerce(value)
                            .map_err(DispatchError::InvocationFailure)?;
                        *write_cell.lock().unwrap() = new_value;
                        Ok(DynamicValue::from(previous))
                    }))
                },
            },
        }
    }

    fn callable_member(name: &'static str, param_type: &'static str) -> ExposableMember {
        ExposableMember {
            container_name: "Calc",
            member_name: name,
            kind: MemberKind::Callable,
            secured: false,
            credential_family: None,
            immutable: true,
            is_static: false,
            parameters: vec![ParameterInfo {
                name: "x",
                type_name: param_type,
                index: 0,
            }],
            return_type_name: "i64",
            description: "",
            target: static_target(),
            handle: MemberHandle::Callable {
                invoke: Arc::new(|_target, args| {
                    Box::pin(async move {
                        let x: i64 = crate::value::coerce(args[0].clone())
                            .map_err(DispatchError::InvocationFailure)?;
                        Ok(DynamicValue::from(x * 2))
                    })
                }),
            },
        }
    }

    #[tokio::test]
    async fn invoke_dispatches_and_serialises() {
        let member = callable_member("double", "i64");
        let result = invoke(Resolution::Found(member), vec![DynamicValue::from(21)])
            .await
            .unwrap();
        assert_eq!(result, DynamicValue::from(42));
    }

    #[tokio::test]
    async fn invoke_arity_mismatch() {
        let member = callable_member("double", "i64");
        let err = invoke(Resolution::Found(member), vec![]).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::ArityMismatch {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn read_yields_current_value() {
        let member = datum_member("count", 7, false);
        assert_eq!(read(&member).unwrap(), DynamicValue::from(7));
    }

    #[test]
    fn write_rejects_immutable() {
        let member = datum_member("count", 7, true);
        let err = write(&member, DynamicValue::from(9)).unwrap_err();
        assert!(matches!(err, DispatchError::ImmutableTarget));
    }

    #[test]
    fn write_returns_previous_value() {
        let member = datum_member("count", 7, false);
        let previous = write(&member, DynamicValue::from(9)).unwrap();
        assert_eq!(previous, DynamicValue::from(7));
        assert_eq!(read(&member).unwrap(), DynamicValue::from(9));
    }

    #[test]
    fn write_rejects_callable() {
        let member = callable_member("double", "i64");
        let err = write(&member, DynamicValue::from(1)).unwrap_err();
        assert!(matches!(err, DispatchError::WrongKindForWrite));
    }

    #[tokio::test]
    async fn overload_narrows_by_shape() {
        let str_overload = callable_member("format", "String");
        let int_overload = callable_member("format", "i64");
        let resolution = Resolution::Ambiguous(vec![str_overload, int_overload]);
        let result = invoke(resolution, vec![DynamicValue::from(5)]).await.unwrap();
        assert_eq!(result, DynamicValue::from(10));
    }

    #[tokio::test]
    async fn overload_stays_ambiguous_when_multiple_shapes_match() {
        let a = callable_member("id", "Value");
        let b = callable_member("id", "serde_json::Value");
        let resolution = Resolution::Ambiguous(vec![a, b]);
        let err = invoke(resolution, vec![DynamicValue::from(5)])
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::AmbiguousInvocation { .. }));
    }
}
