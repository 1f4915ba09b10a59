//! The gRPC RPC Surface (§4.4): the four-operation `Exposer` service wired
//! onto [`exposer_core`]'s registry/dispatcher/authenticator core.
//!
//! ```ignore
//! use exposer_grpc::{serve, ExposerService};
//!
//! let registry = Arc::new(registry);
//! let authenticator = Arc::new(authenticator);
//! serve(config.transport, ExposerService::new(registry, authenticator)).await?;
//! ```

pub mod interceptor;
pub mod server;
pub mod service;
pub mod status;
pub mod wire;

pub mod pb {
    tonic::include_proto!("exposer.v1");
}

/// Encoded `FileDescriptorSet` for `exposer.v1`, used to answer
/// `ServerReflection` queries when `TransportConfig::enable_reflection` is
/// set (requires the `reflection` feature — see `server::serve`).
#[cfg(feature = "reflection")]
pub(crate) const FILE_DESCRIPTOR_SET: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/exposer_descriptor.bin"));

pub use server::serve;
pub use service::ExposerService;

// Re-exported so downstream crates (the facade, the demo) can name generated
// types without depending on `tonic`/`prost` directly (matches the teacher's
// `pub use tonic; pub use prost;`).
pub use prost;
pub use tonic;
