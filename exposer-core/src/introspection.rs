//! Introspection (§4.5): the `DescribeAll` payload built from the registry's
//! canonical entries.

use crate::member::{ExposableMember, MemberKind};
use crate::registry::Registry;

/// One parameter's description (§6 `ParameterInfo`).
#[derive(Debug, Clone)]
pub struct ParameterDescription {
    pub name: &'static str,
    pub type_name: &'static str,
    pub index: usize,
}

/// One member's description (§6 `MemberInfo`).
#[derive(Debug, Clone)]
pub struct MemberDescription {
    pub container_name: &'static str,
    pub member_name: &'static str,
    pub kind: MemberKind,
    pub return_type_name: &'static str,
    pub parameters: Vec<ParameterDescription>,
    pub secured: bool,
    pub writeable: bool,
    pub is_static: bool,
    pub immutable: bool,
    pub description: &'static str,
}

impl From<&ExposableMember> for MemberDescription {
    fn from(member: &ExposableMember) -> Self {
        Self {
            container_name: member.container_name,
            member_name: member.member_name,
            kind: member.kind,
            return_type_name: member.return_type_name,
            parameters: member
                .parameters
                .iter()
                .map(|p| ParameterDescription {
                    name: p.name,
                    type_name: p.type_name,
                    index: p.index,
                })
                .collect(),
            secured: member.secured,
            writeable: member.writeable(),
            is_static: member.is_static,
            immutable: member.immutable,
            description: member.description,
        }
    }
}

/// Build the `DescribeAll` payload (§4.5: "for every canonical entry
/// (aliases excluded)... no alias forms are emitted").
///
/// Ordering follows the registry's scan order (§5 "Introspection responses
/// are ordered by scan order").
pub fn describe_all(registry: &Registry) -> Vec<MemberDescription> {
    registry
        .canonical_members()
        .iter()
        .map(MemberDescription::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::static_target;
    use crate::member::{MemberHandle, ParameterInfo};
    use crate::registry::ContainerDescriptor;
    use std::sync::Arc;

    fn datum(name: &'static str, immutable: bool) -> ExposableMember {
        ExposableMember {
            container_name: "Thermostat",
            member_name: name,
            kind: MemberKind::Datum,
            secured: false,
            credential_family: None,
            immutable,
            is_static: false,
            parameters: Vec::new(),
            return_type_name: "f64",
            description: "current temperature",
            target: static_target(),
            handle: MemberHandle::Datum {
                read: Arc::new(|_| Ok(serde_json::Value::from(21.5))),
                write: if immutable {
                    None
                } else {
                    Some(Arc::new(|_, v| Ok(v)))
                },
            },
        }
    }

    fn callable(name: &'static str) -> ExposableMember {
        ExposableMember {
            container_name: "Thermostat",
            member_name: name,
            kind: MemberKind::Callable,
            secured: true,
            credential_family: None,
            immutable: true,
            is_static: false,
            parameters: vec![ParameterInfo {
                name: "degrees",
                type_name: "f64",
                index: 0,
            }],
            return_type_name: "()",
            description: "",
            target: static_target(),
            handle: MemberHandle::Callable {
                invoke: Arc::new(|_, _| Box::pin(async { Ok(serde_json::Value::Null) })),
            },
        }
    }

    #[test]
    fn describe_all_excludes_aliases_and_reports_flags() {
        let registry = Registry::new();
        registry.register_container(ContainerDescriptor {
            container_name: "Thermostat",
            members: vec![datum("temperature", false), callable("setTarget")],
            aliases: vec!["Adjustable"],
        });

        let descriptions = describe_all(&registry);
        assert_eq!(descriptions.len(), 2);

        let temp = descriptions
            .iter()
            .find(|d| d.member_name == "temperature")
            .unwrap();
        assert!(temp.writeable);
        assert_eq!(temp.kind, MemberKind::Datum);

        let set_target = descriptions
            .iter()
            .find(|d| d.member_name == "setTarget")
            .unwrap();
        assert!(set_target.secured);
        assert!(!set_target.writeable);
    }
}
