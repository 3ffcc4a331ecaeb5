use super::error::derived_traits;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Meta, Token, Type, parse_quote};

struct ModelArgs {
    rename_all: Option<LitStr>,
    extends: Vec<Ident>,
}

/// Expands `#[versioned_model]`.
///
/// Adds `Debug`, `Clone` and `serde::Serialize` when missing, a camelCase serde policy, and a
/// `verneg_core::Describe` impl whose lineage lists the `extends(...)` fields.
pub fn expand(args: TokenStream, input: DeriveInput) -> TokenStream {
    match try_expand(args, &input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn try_expand(args: TokenStream, input: &DeriveInput) -> syn::Result<TokenStream> {
    let ModelArgs { rename_all, extends } = parse_args(args)?;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "versioned_model does not support generic types",
        ));
    }

    let ident = &input.ident;
    let parents = extends
        .iter()
        .map(|field| {
            let ty = field_type(input, field)?;
            Ok(quote! {
                ::verneg_core::Upcast::new(
                    <#ty as ::verneg_core::Describe>::describe,
                    |model| model.downcast_ref::<#ident>().map(|m| &m.#field as &dyn ::std::any::Any),
                )
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let mut item = input.clone();
    if let Some(derive) = missing_derives(&input.attrs) {
        item.attrs.insert(0, derive);
    }
    if let Some(rename) = rename_attr(rename_all, &input.attrs)? {
        item.attrs.push(rename);
    }

    Ok(quote! {
        #item

        #[automatically_derived]
        impl ::verneg_core::Describe for #ident {
            fn describe() -> ::verneg_core::TypeDescriptor {
                fn lineage() -> ::std::vec::Vec<::verneg_core::Upcast> {
                    ::std::vec![#(#parents),*]
                }
                ::verneg_core::TypeDescriptor::model::<#ident>(lineage)
            }
        }
    })
}

fn parse_args(args: TokenStream) -> syn::Result<ModelArgs> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;

    let mut rename_all = None;
    let mut extends = Vec::new();

    for meta in metas {
        match &meta {
            Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                if rename_all.is_some() {
                    return Err(syn::Error::new_spanned(nv, "Duplicate `rename_all` argument"));
                }
                let syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Str(lit), .. }) = &nv.value else {
                    return Err(syn::Error::new_spanned(
                        &nv.value,
                        "rename_all must be a string literal",
                    ));
                };
                rename_all = Some(lit.clone());
            },
            Meta::List(list) if list.path.is_ident("extends") => {
                let fields = list.parse_args_with(Punctuated::<Ident, Token![,]>::parse_terminated)?;
                extends.extend(fields);
            },
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "Unsupported argument; expected `rename_all = \"...\"` or `extends(field, ...)`",
                ));
            },
        }
    }

    Ok(ModelArgs { rename_all, extends })
}

fn field_type<'a>(input: &'a DeriveInput, field: &Ident) -> syn::Result<&'a Type> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(field, "`extends` is only supported on structs"));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(field, "`extends` requires named fields"));
    };

    fields
        .named
        .iter()
        .find(|f| f.ident.as_ref() == Some(field))
        .map(|f| &f.ty)
        .ok_or_else(|| syn::Error::new_spanned(field, format!("No field named `{field}`")))
}

fn missing_derives(attrs: &[Attribute]) -> Option<Attribute> {
    let present = derived_traits(attrs);
    let mut derives = Vec::new();
    if !present.contains("Debug") {
        derives.push(quote! { Debug });
    }
    if !present.contains("Clone") {
        derives.push(quote! { Clone });
    }
    if !present.contains("Serialize") {
        derives.push(quote! { ::serde::Serialize });
    }

    (!derives.is_empty()).then(|| parse_quote! { #[derive(#(#derives),*)] })
}

fn rename_attr(rename_all: Option<LitStr>, attrs: &[Attribute]) -> syn::Result<Option<Attribute>> {
    let wanted = rename_all.unwrap_or_else(|| LitStr::new("camelCase", Span::call_site()));

    let mut existing: Option<LitStr> = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                existing = Some(meta.value()?.parse()?);
            } else if meta.input.peek(Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            } else if meta.input.peek(syn::token::Paren) {
                let nested;
                syn::parenthesized!(nested in meta.input);
                let _: TokenStream = nested.parse()?;
            }
            Ok(())
        })?;
    }

    match existing {
        Some(lit) if lit.value() != wanted.value() => Err(syn::Error::new_spanned(
            lit,
            "Conflicting serde rename_all; remove it or pass versioned_model(rename_all = \"...\")",
        )),
        Some(_) => Ok(None),
        None => Ok(Some(parse_quote! { #[serde(rename_all = #wanted)] })),
    }
}
