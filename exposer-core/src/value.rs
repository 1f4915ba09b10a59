//! The wire-facing dynamic value shape (§6 `DynamicValue`) and the coercion
//! rules the dispatcher uses to turn a `DynamicValue` into a concrete
//! parameter type (§4.2 "Coercion rules").
//!
//! This crate models `DynamicValue` directly as `serde_json::Value` — the
//! sum-of-{null,bool,number,string,object,array} shape in §9 is exactly what
//! `serde_json::Value` already is, so there is no separate tagged enum to
//! maintain in parallel with it.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as DynamicValue;

/// The kind of a [`DynamicValue`], used for overload-shape inference
/// (§4.2 "Overload inference").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Object,
    Array,
}

/// Classify a `DynamicValue` into its shape kind.
pub fn kind_of(value: &DynamicValue) -> ValueKind {
    match value {
        DynamicValue::Null => ValueKind::Null,
        DynamicValue::Bool(_) => ValueKind::Bool,
        DynamicValue::Number(_) => ValueKind::Number,
        DynamicValue::String(_) => ValueKind::String,
        DynamicValue::Object(_) => ValueKind::Object,
        DynamicValue::Array(_) => ValueKind::Array,
    }
}

/// Whether a `DynamicValue` of shape `kind` is coercible to a parameter
/// declared with `type_name`, per §4.2's coercion table.
///
/// `type_name` is the short type name as recorded by the `#[expose_impl]`
/// macro (e.g. `"i64"`, `"String"`, `"bool"`, `"Vec<i64>"`, `"Value"`).
/// This is a best-effort classification used only to narrow overload sets
/// (§4.2 "Overload inference") — actual coercion happens via
/// `serde_json::from_value` against the real Rust type, which is strictly
/// more precise than this name-based check.
pub fn is_shape_compatible(kind: ValueKind, type_name: &str) -> bool {
    if type_name == "Value" || type_name == "serde_json::Value" {
        // The universal top type (§4.2): any kind matches.
        return true;
    }
    match kind {
        ValueKind::Null => !is_primitive_type_name(type_name),
        ValueKind::Bool => type_name == "bool",
        ValueKind::Number => is_numeric_type_name(type_name),
        ValueKind::String => is_string_type_name(type_name),
        ValueKind::Object => {
            !is_string_type_name(type_name)
                && !is_numeric_type_name(type_name)
                && type_name != "bool"
                && !is_collection_type_name(type_name)
        }
        ValueKind::Array => is_collection_type_name(type_name),
    }
}

fn is_numeric_type_name(name: &str) -> bool {
    matches!(
        name,
        "i8" | "i16"
            | "i32"
            | "i64"
            | "i128"
            | "isize"
            | "u8"
            | "u16"
            | "u32"
            | "u64"
            | "u128"
            | "usize"
            | "f32"
            | "f64"
            | "BigInt"
            | "BigDecimal"
    )
}

fn is_string_type_name(name: &str) -> bool {
    matches!(name, "String" | "str" | "Box<str>" | "Arc<str>")
}

fn is_collection_type_name(name: &str) -> bool {
    name.starts_with("Vec<") || name.starts_with('[') || name.ends_with(']')
}

fn is_primitive_type_name(name: &str) -> bool {
    is_numeric_type_name(name) || name == "bool"
}

/// Deserialize a `DynamicValue` into a concrete parameter type `T`.
///
/// This is the actual coercion step (§4.2): generated handler code calls
/// this once per formal parameter. Errors surface as a plain string so the
/// dispatcher can wrap them into `DispatchError::InvocationFailure` /
/// `ArityMismatch` without depending on `serde_json`'s error type directly.
pub fn coerce<T: DeserializeOwned>(value: DynamicValue) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Serialize a concrete result type into a `DynamicValue` for the wire.
///
/// §9 open question 3: when a result cannot be represented as JSON (should
/// not normally happen for `Serialize` impls), we fall back to its `Debug`
/// string rather than erroring, matching the source behavior the spec
/// preserves ("the spec preserves that behavior but flags it").
pub fn to_dynamic<T: Serialize + std::fmt::Debug>(value: &T) -> DynamicValue {
    serde_json::to_value(value).unwrap_or_else(|_| DynamicValue::String(format!("{value:?}")))
}
