//! The `ExposableMember` data model (§3).
//!
//! In the source system, a member's "reflection handle" is a live handle
//! into the runtime's reflection API. Rust has no equivalent, so per §9's
//! design note ("Reflection-by-name → data-driven dispatch"), the handle
//! here is a set of closures generated at compile time by `exposer-macros`,
//! closed over the concrete container type and captured in
//! [`MemberHandle`]. The back-reference to the target object (§3) is the
//! type-erased `Arc<dyn Any + Send + Sync>` carried alongside it.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value as DynamicValue;

use crate::error::DispatchError;

/// One exposable member's kind (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Accepts an ordered list of typed parameters and returns one value.
    Callable,
    /// A named cell holding one value.
    Datum,
}

/// Coarse credential-family gate attached to a secured member (§3, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFamily {
    TokenOnly,
    KeyOnly,
    Either,
}

/// One formal parameter of a CALLABLE (§3).
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub type_name: &'static str,
    pub index: usize,
}

/// Future type returned by a generated invoke closure.
pub type InvokeFuture = Pin<Box<dyn Future<Output = Result<DynamicValue, DispatchError>> + Send>>;

/// A type-erased handle to a member's behavior, generated by
/// `exposer-macros` for each concrete container type.
///
/// Exactly one of `invoke` (CALLABLE) or `read`/`write` (DATUM) is populated,
/// matching the member's [`MemberKind`].
#[derive(Clone)]
pub enum MemberHandle {
    Callable {
        /// Invoke the member on `target`, coercing `args` per §4.2.
        invoke: Arc<
            dyn Fn(Arc<dyn Any + Send + Sync>, Vec<DynamicValue>) -> InvokeFuture + Send + Sync,
        >,
    },
    Datum {
        read: Arc<dyn Fn(Arc<dyn Any + Send + Sync>) -> Result<DynamicValue, DispatchError> + Send + Sync>,
        /// `None` for immutable datums (the macro never generates a writer
        /// for a `#[expose(immutable)]` field).
        write: Option<
            Arc<
                dyn Fn(
                        Arc<dyn Any + Send + Sync>,
                        DynamicValue,
                    ) -> Result<DynamicValue, DispatchError>
                    + Send
                    + Sync,
            >,
        >,
    },
}

impl fmt::Debug for MemberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberHandle::Callable { .. } => f.write_str("MemberHandle::Callable"),
            MemberHandle::Datum { write, .. } => f
                .debug_struct("MemberHandle::Datum")
                .field("writeable", &write.is_some())
                .finish(),
        }
    }
}

/// The central registry entity (§3).
#[derive(Clone)]
pub struct ExposableMember {
    pub container_name: &'static str,
    pub member_name: &'static str,
    pub kind: MemberKind,
    pub secured: bool,
    pub credential_family: Option<CredentialFamily>,
    /// Always `true` for CALLABLE; for DATUM, whether writes are refused.
    pub immutable: bool,
    pub is_static: bool,
    pub parameters: Vec<ParameterInfo>,
    pub return_type_name: &'static str,
    pub description: &'static str,
    /// Non-owning-in-spirit back-reference to the target object. For static
    /// members this still holds a unit marker so the handle closures have
    /// something to downcast against.
    pub target: Arc<dyn Any + Send + Sync>,
    pub handle: MemberHandle,
}

impl fmt::Debug for ExposableMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposableMember")
            .field("full_key", &self.full_key())
            .field("kind", &self.kind)
            .field("secured", &self.secured)
            .field("credential_family", &self.credential_family)
            .field("immutable", &self.immutable)
            .field("static", &self.is_static)
            .finish()
    }
}

impl ExposableMember {
    /// `containerName.memberName` (§3) — used for DATUM lookup and as the
    /// overload-set key for CALLABLEs.
    pub fn base_key(&self) -> String {
        format!("{}.{}", self.container_name, self.member_name)
    }

    /// The canonical key (§3): `base_key` for DATUM, or
    /// `base_key(T1,T2,...)` for CALLABLE.
    pub fn full_key(&self) -> String {
        match self.kind {
            MemberKind::Datum => self.base_key(),
            MemberKind::Callable => {
                let params = self
                    .parameters
                    .iter()
                    .map(|p| p.type_name)
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}({})", self.base_key(), params)
            }
        }
    }

    /// Parameter type names in declaration order, used for exact overload
    /// pinning (§6 `parameterTypeNames`) and round-trip identity (§8 P1).
    pub fn parameter_type_names(&self) -> Vec<&'static str> {
        self.parameters.iter().map(|p| p.type_name).collect()
    }

    /// Whether a DATUM can be written (§4.5 "writeable flag").
    pub fn writeable(&self) -> bool {
        self.kind == MemberKind::Datum && !self.immutable
    }
}
