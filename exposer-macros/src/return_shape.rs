//! Classifies a `#[expose]`d method's return type so `expose_impl` can
//! generate the right result-handling tail (§4.2 "Result handling").
//!
//! Follows the teacher's `is_result_type` pattern in
//! `codegen/handlers.rs` (match on the last path segment's ident) rather
//! than attempting full type resolution, which a proc-macro cannot do
//! anyway (it never sees trait impls).

use syn::{GenericArgument, PathArguments, ReturnType, Type};

/// How a method's declared return type should be unwrapped before
/// serialisation (§4.2 "Result handling", §9 "Reactive unwrap").
pub enum ReturnShape<'a> {
    /// No return type, or an explicit `()` — yields the void sentinel.
    Void,
    /// A future-like value is implicit in every `async fn` already being
    /// `.await`ed; what remains here is the value type itself.
    Plain(&'a Type),
    /// `Result<(), E>` — void on `Ok`, `InvocationFailure` on `Err`.
    ResultVoid,
    /// `Result<T, E>` for a non-unit `T`.
    ResultPlain(&'a Type),
    /// `ExposedStream<T>` (§9 "multi-valued reactive stream") — collect all
    /// items into a sequence, then yield.
    Stream(&'a Type),
    /// `Result<ExposedStream<T>, E>`.
    ResultStream(&'a Type),
}

pub fn classify(return_type: &ReturnType) -> ReturnShape<'_> {
    let ty = match return_type {
        ReturnType::Default => return ReturnShape::Void,
        ReturnType::Type(_, ty) => ty.as_ref(),
    };

    if is_unit(ty) {
        return ReturnShape::Void;
    }

    if let Some(inner) = stream_item_type(ty) {
        return ReturnShape::Stream(inner);
    }

    if let Some(ok_ty) = result_ok_type(ty) {
        if is_unit(ok_ty) {
            return ReturnShape::ResultVoid;
        }
        if let Some(inner) = stream_item_type(ok_ty) {
            return ReturnShape::ResultStream(inner);
        }
        return ReturnShape::ResultPlain(ok_ty);
    }

    ReturnShape::Plain(ty)
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(t) if t.elems.is_empty())
}

/// `Result<T, E>` → `Some(T)`; anything else → `None`.
fn result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(t) => Some(t),
        _ => None,
    })
}

/// `ExposedStream<T>` → `Some(T)`; anything else → `None`.
fn stream_item_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "ExposedStream" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(t) => Some(t),
        _ => None,
    })
}
