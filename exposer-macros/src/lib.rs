//! Procedural macros that replace runtime reflection with compile-time
//! member discovery for Exposer (§9 "Reflection-by-name → data-driven
//! dispatch").
//!
//! Two entry points cover the two member kinds (§3):
//!
//! - [`macro@expose_impl`] on an `impl Container { ... }` block generates
//!   CALLABLE members from `#[expose(...)]`-annotated methods.
//! - [`macro@Exposed`] derived on a struct generates DATUM members from
//!   `#[expose(...)]`-annotated [`exposer_core::ExposedCell`] fields.
//!
//! A container exposing both methods and fields implements both on the same
//! type; application code combines `__expose_callable_members` and
//! `__expose_datum_members` into one [`exposer_core::ContainerDescriptor`]
//! before handing it to [`exposer_core::Registry::register_container`]:
//!
//! ```ignore
//! let members = Container::__expose_callable_members(target.clone())
//!     .into_iter()
//!     .chain(Container::__expose_datum_members(target))
//!     .collect();
//! registry.register_container(ContainerDescriptor {
//!     container_name: Container::__EXPOSE_CONTAINER_NAME,
//!     members,
//!     aliases: Container::__expose_callable_aliases(),
//! });
//! ```
//!
//! The two macros name their container-identifier consts differently —
//! `#[expose_impl]` emits `__EXPOSE_CONTAINER_NAME`, `#[derive(Exposed)]`
//! emits `__EXPOSE_DATUM_CONTAINER_NAME` — so that a combined container
//! never ends up with two definitions of the same associated const. A
//! combined container uses `__EXPOSE_CONTAINER_NAME` (from its
//! `#[expose_impl]` block) for both halves above; a DATUM-only container
//! (no `#[expose_impl]`) uses `__EXPOSE_DATUM_CONTAINER_NAME` instead.

mod crate_path;
mod expose_impl;
mod exposed_derive;
mod parsing;
mod return_shape;

use proc_macro::TokenStream;

/// Generate CALLABLE members for every `#[expose(...)]`-annotated method in
/// an `impl` block (§3, §4.1 steps 2, 4, 5).
///
/// Accepts an optional `aliases(Trait1, Trait2, ...)` argument naming
/// user-defined trait paths this container should also answer to (§4.1 step
/// 6); these are subject to the reserved-prefix filtering
/// `exposer_core::registry` applies at registration time.
#[proc_macro_attribute]
pub fn expose_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    expose_impl::expand(args, input)
}

/// Generate DATUM members for every `#[expose(...)]`-annotated
/// [`exposer_core::ExposedCell`] field on a struct (§3, §4.1 steps 3, 4, 5).
#[proc_macro_derive(Exposed, attributes(expose))]
pub fn derive_exposed(input: TokenStream) -> TokenStream {
    exposed_derive::expand(input)
}
