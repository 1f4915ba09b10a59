//! Wire <-> domain conversions (§6 "DynamicValue", "MemberInfo").
//!
//! `exposer_core` represents a dynamic value as `serde_json::Value`
//! directly; the wire format is the hand-rolled `pb::DynamicValue` oneof
//! generated from `proto/exposer.proto`. These functions are the only place
//! the two representations meet.

use exposer_core::{DynamicValue, MemberDescription, MemberKind};

use crate::pb;

pub fn to_wire(value: &DynamicValue) -> pb::DynamicValue {
    let kind = match value {
        DynamicValue::Null => pb::dynamic_value::Kind::NullValue(true),
        DynamicValue::Bool(b) => pb::dynamic_value::Kind::BoolValue(*b),
        DynamicValue::Number(n) => pb::dynamic_value::Kind::NumberValue(n.as_f64().unwrap_or(0.0)),
        DynamicValue::String(s) => pb::dynamic_value::Kind::StringValue(s.clone()),
        DynamicValue::Array(items) => pb::dynamic_value::Kind::ListValue(pb::DynamicList {
            values: items.iter().map(to_wire).collect(),
        }),
        DynamicValue::Object(map) => pb::dynamic_value::Kind::StructValue(pb::DynamicStruct {
            fields: map.iter().map(|(k, v)| (k.clone(), to_wire(v))).collect(),
        }),
    };
    pb::DynamicValue { kind: Some(kind) }
}

pub fn from_wire(value: pb::DynamicValue) -> DynamicValue {
    match value.kind {
        None => DynamicValue::Null,
        Some(pb::dynamic_value::Kind::NullValue(_)) => DynamicValue::Null,
        Some(pb::dynamic_value::Kind::BoolValue(b)) => DynamicValue::Bool(b),
        Some(pb::dynamic_value::Kind::NumberValue(n)) => serde_json::Number::from_f64(n)
            .map(DynamicValue::Number)
            .unwrap_or(DynamicValue::Null),
        Some(pb::dynamic_value::Kind::StringValue(s)) => DynamicValue::String(s),
        Some(pb::dynamic_value::Kind::ListValue(list)) => {
            DynamicValue::Array(list.values.into_iter().map(from_wire).collect())
        }
        Some(pb::dynamic_value::Kind::StructValue(st)) => DynamicValue::Object(
            st.fields.into_iter().map(|(k, v)| (k, from_wire(v))).collect(),
        ),
    }
}

pub fn member_info(description: &MemberDescription) -> pb::MemberInfo {
    pb::MemberInfo {
        container_name: description.container_name.to_string(),
        member_name: description.member_name.to_string(),
        secured: description.secured,
        return_type_name: description.return_type_name.to_string(),
        parameters: description
            .parameters
            .iter()
            .map(|p| pb::ParameterInfo {
                name: p.name.to_string(),
                type_name: p.type_name.to_string(),
                index: p.index as u32,
            })
            .collect(),
        description: description.description.to_string(),
        kind: match description.kind {
            MemberKind::Callable => pb::MemberKind::Callable as i32,
            MemberKind::Datum => pb::MemberKind::Datum as i32,
        },
        writeable: description.writeable,
        is_static: description.is_static,
        immutable: description.immutable,
    }
}
