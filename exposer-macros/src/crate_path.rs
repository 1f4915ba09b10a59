//! Crate path resolution for generated code.
//!
//! Detects whether the user depends on `exposer` (facade) or `exposer-core`
//! directly, and returns the appropriate path prefix for generated code.
//! Mirrors the teacher's `r2e_core_path` resolver exactly — same two-tier
//! lookup, same `Itself`/`Name` handling.

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;

/// Returns the token stream for accessing `exposer_core` types.
///
/// If the user depends on `exposer`, returns `::exposer::exposer_core`.
/// Otherwise returns `::exposer_core`.
pub fn exposer_core_path() -> TokenStream {
    if let Ok(found) = crate_name("exposer") {
        return match found {
            FoundCrate::Itself => quote!(crate::exposer_core),
            FoundCrate::Name(name) => {
                let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
                quote!(::#ident::exposer_core)
            }
        };
    }

    if let Ok(found) = crate_name("exposer-core") {
        return match found {
            FoundCrate::Itself => quote!(crate),
            FoundCrate::Name(name) => {
                let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
                quote!(::#ident)
            }
        };
    }

    // Fallback — keeps compile errors pointing at a plausible path instead
    // of a bare resolver failure.
    quote!(::exposer_core)
}
