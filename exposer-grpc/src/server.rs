//! Standalone tonic server wiring (§4.4 "Server config").
//!
//! Unlike the teacher's `r2e_grpc::GrpcServer`, this does not plug into a
//! host framework's plugin/builder system — `exposer-core` has no such
//! framework, and the spec's surface is exactly one service. `serve` takes
//! [`exposer_core::TransportConfig`] and an [`ExposerService`] and starts a
//! `tonic::transport::Server` directly, with every connection-lifecycle knob
//! plumbed through verbatim (`0` means "unlimited", per §4.4).
//!
//! `TransportConfig::enable_reflection` (§6) is honored only when this crate
//! is built with the `reflection` feature, which pulls in `tonic-reflection`
//! and the `exposer.v1` descriptor set `build.rs` emits; without the
//! feature, a `true` value just logs a warning rather than silently doing
//! nothing.

use std::net::SocketAddr;
use std::time::Duration;

use exposer_core::TransportConfig;
use tonic::transport::Server;

use crate::pb::exposer_server::ExposerServer;
use crate::service::ExposerService;

/// Start the `Exposer` gRPC service and run until the process is signalled
/// to stop (the caller decides shutdown policy; this never returns on its
/// own short of a transport error).
pub async fn serve(
    config: TransportConfig,
    service: ExposerService,
) -> Result<(), tonic::transport::Error> {
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();

    let mut builder = Server::builder();

    if config.keepalive_time_secs > 0 {
        builder = builder.http2_keepalive_interval(Some(Duration::from_secs(config.keepalive_time_secs)));
    }
    if config.keepalive_timeout_secs > 0 {
        builder = builder.http2_keepalive_timeout(Some(Duration::from_secs(config.keepalive_timeout_secs)));
    }
    if config.max_connection_idle_secs > 0 {
        builder = builder.timeout(Duration::from_secs(config.max_connection_idle_secs));
    }
    if config.max_concurrent_calls > 0 {
        builder = builder.max_concurrent_streams(config.max_concurrent_calls);
    }
    // `max_connection_age` and `permit_keepalive_without_calls` have no
    // direct equivalent in tonic's `Server` builder (they are Go-gRPC-core
    // concepts); left unwired rather than faked.

    let mut exposer_server = ExposerServer::new(service);
    if config.max_inbound_message_size > 0 {
        exposer_server = exposer_server.max_decoding_message_size(config.max_inbound_message_size as usize);
    }

    tracing::info!(%addr, "starting Exposer gRPC server");
    let router = builder.add_service(exposer_server);

    #[cfg(feature = "reflection")]
    let router = if config.enable_reflection {
        router.add_service(reflection_service())
    } else {
        router
    };
    #[cfg(not(feature = "reflection"))]
    if config.enable_reflection {
        tracing::warn!(
            "transport.enable_reflection is set, but exposer-grpc was built without the \
             `reflection` feature — server reflection will not be served"
        );
    }

    router.serve(addr).await
}

/// Build the `ServerReflection` service over `exposer.v1`'s descriptor set
/// (§6 "enable-reflection").
#[cfg(feature = "reflection")]
fn reflection_service(
) -> tonic_reflection::server::v1::ServerReflectionServer<impl tonic_reflection::server::v1::ServerReflection> {
    tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(crate::FILE_DESCRIPTOR_SET)
        .build_v1()
        .expect("exposer.v1's descriptor set must be valid for ServerReflection")
}
