//! Registry, dispatcher and authenticator core for the Exposer RPC surface.
//!
//! This crate holds the transport-agnostic pieces of the system (§1–§5):
//! the [`registry`] that indexes exposable members, the [`dispatcher`] that
//! invokes/reads/writes them, and the [`auth`] module that enforces
//! credential requirements. `exposer-grpc` wires these onto a concrete wire
//! protocol; `exposer-macros` generates the [`registry::ContainerDescriptor`]
//! values application code feeds into the [`registry::Registry`].

pub mod auth;
pub mod cell;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod introspection;
pub mod member;
pub mod registry;
pub mod stream;
pub mod value;

pub use auth::{Authenticator, CredentialContext, SecurityConfig};
pub use cell::ExposedCell;
pub use config::{ConfigLoadError, ExposerConfig, TransportConfig};
pub use error::{DispatchError, MemberKindName};
pub use introspection::{describe_all, MemberDescription, ParameterDescription};
pub use member::{CredentialFamily, ExposableMember, MemberHandle, MemberKind, ParameterInfo};
pub use registry::{ContainerDescriptor, Registry, Resolution};
pub use stream::{collect as collect_stream, ExposedStream};
pub use value::{coerce, is_shape_compatible, kind_of, to_dynamic, DynamicValue, ValueKind};
