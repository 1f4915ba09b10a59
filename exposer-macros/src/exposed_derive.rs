//! `#[derive(Exposed)]` — the DATUM half of discovery (§4.1 steps 3, 4, 5).
//!
//! Applied to a struct whose fields hold [`exposer_core::ExposedCell<T>`]
//! values. Every field carrying `#[expose(...)]` becomes one DATUM
//! `ExposableMember`; a field without `#[expose(immutable)]` gets a writer
//! closure, an immutable one does not (§3 "Always true for CALLABLE; for
//! DATUM, whether the cell refuses writes").

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, GenericArgument, PathArguments, Type};

use crate::crate_path::exposer_core_path;
use crate::parsing::{credential_family_ident, find_expose_attr};

pub fn expand(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match generate(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let self_ty = &input.ident;
    let container_name = self_ty.to_string();

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Exposed)] only supports structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Exposed)] requires named fields",
        ));
    };

    let krate = exposer_core_path();
    let mut member_literals = Vec::new();

    for field in &fields.named {
        let Some(expose) = find_expose_attr(&field.attrs)? else {
            continue;
        };
        let field_ident = field.ident.as_ref().expect("named field");
        let cell_item_type = cell_item_type(&field.ty).ok_or_else(|| {
            syn::Error::new_spanned(
                &field.ty,
                "#[expose] fields must be declared as exposer_core::ExposedCell<T>",
            )
        })?;

        let member_name = field_ident.to_string();
        let type_name = quote!(#cell_item_type).to_string().replace(' ', "");
        let description = expose.description.unwrap_or_default();
        let secured = expose.secured.is_some();
        let credential_family = match &expose.secured {
            None => quote! { ::std::option::Option::None },
            Some(value) => {
                let ident_name = credential_family_ident(value, field_ident.span())?;
                let ident = syn::Ident::new(ident_name, field_ident.span());
                quote! { ::std::option::Option::Some(#krate::CredentialFamily::#ident) }
            }
        };
        let immutable = expose.immutable;

        let error_msg = format!("invalid target type for {container_name}");
        let write_handle = if immutable {
            quote! { ::std::option::Option::None }
        } else {
            quote! {
                ::std::option::Option::Some(::std::sync::Arc::new(move |__target: ::std::sync::Arc<dyn ::std::any::Any + Send + Sync>, __value: #krate::DynamicValue| {
                    let __self = __target.downcast::<#self_ty>().map_err(|_| {
                        #krate::DispatchError::InvocationFailure(#error_msg.to_string())
                    })?;
                    let __new: #cell_item_type = #krate::coerce(__value)
                        .map_err(#krate::DispatchError::InvocationFailure)?;
                    let __previous = __self.#field_ident.set(__new);
                    Ok(#krate::to_dynamic(&__previous))
                }) as ::std::sync::Arc<dyn Fn(::std::sync::Arc<dyn ::std::any::Any + Send + Sync>, #krate::DynamicValue) -> ::std::result::Result<#krate::DynamicValue, #krate::DispatchError> + Send + Sync>)
            }
        };

        member_literals.push(quote! {
            #krate::ExposableMember {
                container_name: #container_name,
                member_name: #member_name,
                kind: #krate::MemberKind::Datum,
                secured: #secured,
                credential_family: #credential_family,
                immutable: #immutable,
                is_static: false,
                parameters: ::std::vec::Vec::new(),
                return_type_name: #type_name,
                description: #description,
                target: __self.clone() as ::std::sync::Arc<dyn ::std::any::Any + Send + Sync>,
                handle: #krate::MemberHandle::Datum {
                    read: ::std::sync::Arc::new(move |__target: ::std::sync::Arc<dyn ::std::any::Any + Send + Sync>| {
                        let __self = __target.downcast::<#self_ty>().map_err(|_| {
                            #krate::DispatchError::InvocationFailure(#error_msg.to_string())
                        })?;
                        Ok(#krate::to_dynamic(&__self.#field_ident.get()))
                    }),
                    write: #write_handle,
                },
            }
        });
    }

    Ok(quote! {
        impl #self_ty {
            /// This container's stable identifier on the wire (§3
            /// `containerName`), under a name distinct from
            /// `#[expose_impl]`'s `__EXPOSE_CONTAINER_NAME` so that a
            /// combined container (both macros on one type) never ends up
            /// with two definitions of the same associated const. A
            /// DATUM-only container (no companion `#[expose_impl]`) uses
            /// this one directly; a combined container uses
            /// `__EXPOSE_CONTAINER_NAME` from its `#[expose_impl]` block for
            /// both halves.
            pub const __EXPOSE_DATUM_CONTAINER_NAME: &'static str = #container_name;

            /// Build this container's DATUM members for
            /// [`#krate::Registry::register_container`] (§4.1 steps 3, 4, 5).
            pub fn __expose_datum_members(
                __self: ::std::sync::Arc<Self>,
            ) -> ::std::vec::Vec<#krate::ExposableMember> {
                ::std::vec![ #(#member_literals),* ]
            }
        }
    })
}

/// `ExposedCell<T>` → `Some(T)`; anything else → `None`.
fn cell_item_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "ExposedCell" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(t) => Some(t),
        _ => None,
    })
}
