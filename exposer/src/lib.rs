//! Exposer — make in-process methods and fields callable over a gRPC wire
//! protocol, with member discovery generated at compile time instead of
//! walked via runtime reflection (§9).
//!
//! This facade crate re-exports [`exposer_core`] and [`exposer_macros`]
//! through a single dependency, and [`exposer_grpc`] behind the default
//! `grpc` feature:
//!
//! ```ignore
//! use exposer::prelude::*;
//! ```
//!
//! | Feature | Default | Crate          |
//! |---------|---------|----------------|
//! | `grpc`  | **yes** | `exposer-grpc` |

// Re-export sub-crates as public modules, matching the teacher's
// `pub extern crate r2e_core;` pattern — `exposer_macros::crate_path`
// resolves `crate::exposer_core` against this when macro-generated code is
// expanded inside this crate itself (its doctests/tests).
pub extern crate exposer_core;
pub extern crate exposer_macros;

#[cfg(feature = "grpc")]
pub extern crate exposer_grpc;

pub use exposer_core::*;
pub use exposer_macros::{expose_impl, Exposed};

pub mod prelude {
    //! Re-exports of the most commonly used types.
    pub use crate::exposer_core::{
        Authenticator, ContainerDescriptor, CredentialContext, CredentialFamily, DispatchError,
        DynamicValue, ExposableMember, ExposedCell, ExposerConfig, Registry, SecurityConfig,
    };
    pub use crate::{expose_impl, Exposed};

    #[cfg(feature = "grpc")]
    pub use crate::exposer_grpc::{serve, ExposerService};
}
