//! `#[expose_impl]` — the CALLABLE half of discovery (§4.1 steps 2, 4, 5).
//!
//! Applied to an `impl ContainerName { ... }` block. Every method carrying
//! `#[expose(...)]` becomes one CALLABLE `ExposableMember`; the macro emits
//! an associated function, `__expose_descriptor`, that builds a
//! [`exposer_core::ContainerDescriptor`] for the container — the compile-time
//! replacement for the source system's reflective method scan (§9
//! "Reflection-by-name → data-driven dispatch").

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    FnArg, Ident, ImplItem, ItemImpl, ReturnType, Token, Type,
};

use crate::crate_path::exposer_core_path;
use crate::parsing::{credential_family_ident, find_expose_attr, strip_expose_attrs};
use crate::return_shape::{classify, ReturnShape};

struct ExposeImplArgs {
    aliases: Vec<Ident>,
}

impl Parse for ExposeImplArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(Self { aliases: Vec::new() });
        }
        let keyword: Ident = input.parse()?;
        if keyword != "aliases" {
            return Err(syn::Error::new_spanned(
                keyword,
                "expected `aliases(...)` — the only supported #[expose_impl(...)] argument",
            ));
        }
        let content;
        syn::parenthesized!(content in input);
        let idents: Punctuated<Ident, Token![,]> = content.parse_terminated(Ident::parse, Token![,])?;
        Ok(Self {
            aliases: idents.into_iter().collect(),
        })
    }
}

struct ExposedMethod {
    member_name: String,
    fn_ident: Ident,
    is_static: bool,
    asyncness: bool,
    secured: bool,
    credential_family_ident: Option<&'static str>,
    description: String,
    params: Vec<(String, Type)>,
    return_type: ReturnType,
}

pub fn expand(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = syn::parse_macro_input!(args as ExposeImplArgs);
    let mut item_impl = syn::parse_macro_input!(input as ItemImpl);

    match generate(&args, &mut item_impl) {
        Ok(descriptor_impl) => {
            let output = quote! {
                #item_impl
                #descriptor_impl
            };
            output.into()
        }
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate(args: &ExposeImplArgs, item_impl: &mut ItemImpl) -> syn::Result<TokenStream2> {
    let self_ty = item_impl.self_ty.clone();
    let container_name = quote!(#self_ty).to_string().replace(' ', "");

    let mut methods = Vec::new();

    for item in &mut item_impl.items {
        let ImplItem::Fn(method) = item else { continue };
        let Some(expose) = find_expose_attr(&method.attrs)? else {
            continue;
        };
        if expose.immutable {
            return Err(syn::Error::new_spanned(
                &method.sig.ident,
                "#[expose(immutable)] is only meaningful on a field inside #[derive(Exposed)] — CALLABLEs are always immutable (§3)",
            ));
        }

        let credential_family_ident = match &expose.secured {
            None => None,
            Some(value) => Some(credential_family_ident(value, method.sig.ident.span())?),
        };

        let mut is_static = true;
        let mut params = Vec::new();
        for (i, input) in method.sig.inputs.iter().enumerate() {
            match input {
                FnArg::Receiver(_) => {
                    if i != 0 {
                        return Err(syn::Error::new_spanned(input, "self receiver must be the first parameter"));
                    }
                    is_static = false;
                }
                FnArg::Typed(pat_type) => {
                    let name = match pat_type.pat.as_ref() {
                        syn::Pat::Ident(p) => p.ident.to_string(),
                        other => {
                            return Err(syn::Error::new_spanned(
                                other,
                                "#[expose] parameters must be simple identifiers",
                            ))
                        }
                    };
                    params.push((name, (*pat_type.ty).clone()));
                }
            }
        }

        methods.push(ExposedMethod {
            member_name: method.sig.ident.to_string(),
            fn_ident: method.sig.ident.clone(),
            is_static,
            asyncness: method.sig.asyncness.is_some(),
            secured: credential_family_ident.is_some(),
            credential_family_ident,
            description: expose.description.unwrap_or_default(),
            params,
            return_type: method.sig.output.clone(),
        });

        strip_expose_attrs(&mut method.attrs);
    }

    let krate = exposer_core_path();
    let alias_strs: Vec<String> = args.aliases.iter().map(|a| a.to_string()).collect();

    let member_literals: Vec<TokenStream2> = methods
        .iter()
        .map(|m| member_literal(&krate, &container_name, m, &self_ty))
        .collect::<syn::Result<_>>()?;

    Ok(quote! {
        impl #self_ty {
            /// This container's stable identifier on the wire (§3 `containerName`).
            pub const __EXPOSE_CONTAINER_NAME: &'static str = #container_name;

            /// Build this container's CALLABLE members for
            /// [`#krate::Registry::register_container`] (§4.1 steps 2, 4, 5 —
            /// the compile-time replacement for the reflective method scan).
            /// A type that also `#[derive(Exposed)]`s DATUM fields combines
            /// both vectors before registering — see
            /// `exposer-macros`' crate docs for the combined-container
            /// pattern.
            pub fn __expose_callable_members(
                __self: ::std::sync::Arc<Self>,
            ) -> ::std::vec::Vec<#krate::ExposableMember> {
                ::std::vec![ #(#member_literals),* ]
            }

            /// User-defined trait names aliased to this container (§4.1 step 6).
            pub fn __expose_callable_aliases() -> ::std::vec::Vec<&'static str> {
                ::std::vec![ #(#alias_strs),* ]
            }
        }
    })
}

fn member_literal(
    krate: &TokenStream2,
    container_name: &str,
    method: &ExposedMethod,
    self_ty: &Type,
) -> syn::Result<TokenStream2> {
    let member_name = &method.member_name;
    let fn_ident = &method.fn_ident;

    let param_infos: Vec<TokenStream2> = method
        .params
        .iter()
        .enumerate()
        .map(|(i, (name, ty))| {
            let type_name = type_name_string(ty);
            quote! { #krate::ParameterInfo { name: #name, type_name: #type_name, index: #i } }
        })
        .collect();

    let param_coercions: Vec<TokenStream2> = method
        .params
        .iter()
        .map(|(name, ty)| {
            let ident = format_ident!("__arg_{}", name);
            quote! {
                let #ident: #ty = #krate::coerce(
                    __args_iter.next().unwrap_or(#krate::DynamicValue::Null)
                ).map_err(#krate::DispatchError::InvocationFailure)?;
            }
        })
        .collect();

    let arg_forwards: Vec<TokenStream2> = method
        .params
        .iter()
        .map(|(name, _)| {
            let ident = format_ident!("__arg_{}", name);
            quote! { #ident }
        })
        .collect();

    let call_target = if method.is_static {
        quote! { #self_ty::#fn_ident(#(#arg_forwards),*) }
    } else {
        quote! { __self.#fn_ident(#(#arg_forwards),*) }
    };
    let call = if method.asyncness {
        quote! { #call_target.await }
    } else {
        quote! { #call_target }
    };

    let (return_type_name, result_tail) = match classify(&method.return_type) {
        ReturnShape::Void => (
            "void".to_string(),
            quote! { #call; Ok(#krate::dispatcher::void_sentinel()) },
        ),
        ReturnShape::Plain(ty) => (
            type_name_string(ty),
            quote! { let __result = #call; Ok(#krate::to_dynamic(&__result)) },
        ),
        ReturnShape::ResultVoid => (
            "void".to_string(),
            quote! {
                match #call {
                    ::std::result::Result::Ok(()) => Ok(#krate::dispatcher::void_sentinel()),
                    ::std::result::Result::Err(__e) => Err(#krate::dispatcher::invocation_failure(__e)),
                }
            },
        ),
        ReturnShape::ResultPlain(ty) => (
            type_name_string(ty),
            quote! {
                match #call {
                    ::std::result::Result::Ok(__v) => Ok(#krate::to_dynamic(&__v)),
                    ::std::result::Result::Err(__e) => Err(#krate::dispatcher::invocation_failure(__e)),
                }
            },
        ),
        ReturnShape::Stream(ty) => (
            format!("Vec<{}>", type_name_string(ty)),
            quote! {
                let __items = #krate::collect_stream(#call).await;
                Ok(#krate::to_dynamic(&__items))
            },
        ),
        ReturnShape::ResultStream(ty) => (
            format!("Vec<{}>", type_name_string(ty)),
            quote! {
                match #call {
                    ::std::result::Result::Ok(__s) => {
                        let __items = #krate::collect_stream(__s).await;
                        Ok(#krate::to_dynamic(&__items))
                    }
                    ::std::result::Result::Err(__e) => Err(#krate::dispatcher::invocation_failure(__e)),
                }
            },
        ),
    };

    let downcast = if method.is_static {
        quote! {}
    } else {
        let error_msg = format!("invalid target type for {container_name}");
        quote! {
            let __self = __target.downcast::<#self_ty>().map_err(|_| {
                #krate::DispatchError::InvocationFailure(#error_msg.to_string())
            })?;
        }
    };

    let target_expr = if method.is_static {
        quote! { #krate::dispatcher::static_target() }
    } else {
        quote! { __self.clone() as ::std::sync::Arc<dyn ::std::any::Any + Send + Sync> }
    };

    let secured = method.secured;
    let is_static = method.is_static;
    let credential_family = match method.credential_family_ident {
        None => quote! { ::std::option::Option::None },
        Some(ident_name) => {
            let ident = format_ident!("{}", ident_name);
            quote! { ::std::option::Option::Some(#krate::CredentialFamily::#ident) }
        }
    };
    let description = &method.description;

    Ok(quote! {
        #krate::ExposableMember {
            container_name: #container_name,
            member_name: #member_name,
            kind: #krate::MemberKind::Callable,
            secured: #secured,
            credential_family: #credential_family,
            immutable: true,
            is_static: #is_static,
            parameters: ::std::vec![ #(#param_infos),* ],
            return_type_name: #return_type_name,
            description: #description,
            target: #target_expr,
            handle: #krate::MemberHandle::Callable {
                invoke: ::std::sync::Arc::new(move |__target, __args| -> #krate::member::InvokeFuture {
                    ::std::boxed::Box::pin(async move {
                        #downcast
                        let mut __args_iter = __args.into_iter();
                        #(#param_coercions)*
                        #result_tail
                    })
                }),
            },
        }
    })
}

/// Render a `syn::Type` as a compact, space-free short name, matching the
/// strings `exposer_core::value::is_shape_compatible` expects (e.g.
/// `"Vec<i64>"`, not `"Vec < i64 >"`).
fn type_name_string(ty: &Type) -> String {
    quote!(#ty).to_string().replace(' ', "")
}
