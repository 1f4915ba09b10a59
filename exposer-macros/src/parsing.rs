//! Shared parsing for the `#[expose(...)]` attribute used on both methods
//! (inside `#[expose_impl]`) and struct fields (inside `#[derive(Exposed)]`).
//!
//! Mirrors the teacher's attribute-parsing style in `derive_parsing.rs` —
//! walk `Meta::List`/`Meta::NameValue` pairs by hand rather than pulling in
//! `darling`, since the attribute surface here is small and fixed.

use syn::{Attribute, Expr, ExprLit, Lit, Meta, Token};

/// Parsed contents of one `#[expose(...)]` (or bare `#[expose]`) attribute.
#[derive(Default, Clone)]
pub struct ExposeAttr {
    /// `secured = "token_only" | "key_only" | "either"`. Absent means public.
    pub secured: Option<String>,
    /// `description = "..."`.
    pub description: Option<String>,
    /// `immutable` — DATUM only; rejected by the caller on methods.
    pub immutable: bool,
}

const EXPOSE_IDENT: &str = "expose";

/// Find the `#[expose(...)]` attribute among `attrs`, if any, and parse it.
///
/// Returns `Ok(None)` when no `#[expose]` attribute is present at all — the
/// caller treats that as "not an exposable member".
pub fn find_expose_attr(attrs: &[Attribute]) -> syn::Result<Option<ExposeAttr>> {
    for attr in attrs {
        if !attr.path().is_ident(EXPOSE_IDENT) {
            continue;
        }
        return Ok(Some(parse_one(attr)?));
    }
    Ok(None)
}

/// Drop every `#[expose(...)]` attribute from `attrs` in place, leaving all
/// other attributes (doc comments, derives, etc.) untouched — these must not
/// reach the real `impl`/struct definition since `expose` is not a real
/// attribute macro registered anywhere else.
pub fn strip_expose_attrs(attrs: &mut Vec<Attribute>) {
    attrs.retain(|a| !a.path().is_ident(EXPOSE_IDENT));
}

fn parse_one(attr: &Attribute) -> syn::Result<ExposeAttr> {
    let mut parsed = ExposeAttr::default();

    // Bare `#[expose]` with no parenthesised list is valid — a public,
    // undocumented member.
    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(parsed);
    }

    let nested = attr.parse_args_with(
        syn::punctuated::Punctuated::<Meta, Token![,]>::parse_terminated,
    )?;

    for meta in nested {
        match &meta {
            Meta::Path(path) if path.is_ident("immutable") => {
                parsed.immutable = true;
            }
            Meta::NameValue(nv) if nv.path.is_ident("secured") => {
                parsed.secured = Some(expect_str_lit(&nv.value, "secured")?);
            }
            Meta::NameValue(nv) if nv.path.is_ident("description") => {
                parsed.description = Some(expect_str_lit(&nv.value, "description")?);
            }
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "unrecognised #[expose(...)] key — expected `secured`, `description` or `immutable`",
                ));
            }
        }
    }

    Ok(parsed)
}

fn expect_str_lit(expr: &Expr, key: &str) -> syn::Result<String> {
    if let Expr::Lit(ExprLit {
        lit: Lit::Str(s), ..
    }) = expr
    {
        Ok(s.value())
    } else {
        Err(syn::Error::new_spanned(
            expr,
            format!("#[expose({key} = ...)] expects a string literal"),
        ))
    }
}

/// Map a parsed `secured` string to the `CredentialFamily` variant path, or
/// error on an unrecognised value (§3: `{TOKEN_ONLY, KEY_ONLY, EITHER}`).
pub fn credential_family_ident(value: &str, span: proc_macro2::Span) -> syn::Result<&'static str> {
    match value {
        "token_only" => Ok("TokenOnly"),
        "key_only" => Ok("KeyOnly"),
        "either" => Ok("Either"),
        other => Err(syn::Error::new(
            span,
            format!(
                "unrecognised credential family '{other}' — expected 'token_only', 'key_only' or 'either'"
            ),
        )),
    }
}
