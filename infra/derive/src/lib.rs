#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the version negotiation workspace.
//!
//! * [`macro@verneg_error`] turns an enum into a `thiserror` error with `.context()` support.
//! * [`macro@versioned_model`] marks a struct as a negotiable model and generates its
//!   `verneg_core::Describe` impl.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Declares a model type that can take part in version negotiation.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug`, `Clone` and `serde::Serialize` when missing.
/// * **Serde Policy**: `rename_all = "camelCase"` unless overridden.
/// * **Type descriptor**: implements `verneg_core::Describe`, so the model can be classified,
///   looked up by provider, and rendered.
///
/// # Arguments
///
/// * `rename_all = "snake_case"` - Overrides the default serde rename policy.
/// * `extends(field, ...)` - Declares embedded fields whose types this model can stand in for.
///   A provider registered for the field's type also applies to this model, and its mappers
///   receive the embedded value.
///
/// # Example
///
/// ```rust,ignore
/// use verneg_derive::versioned_model;
///
/// #[versioned_model]
/// pub struct Person {
///     pub name: String,
///     pub age: u32,
/// }
///
/// #[versioned_model(extends(person))]
/// pub struct Employee {
///     pub person: Person,
///     pub employer: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn versioned_model(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::model::expand(args.into(), input).into()
}

/// Attribute macro for domain error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to `Result<T, Name>` and to results of every wrapped source error.
/// * **Standard Conversions**: Implements `From<T>` for variants with a `source` field,
///   enabling the `?` operator for upstream errors.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant is present.
///
/// # Requirements
///
/// 1. Applies to enums only.
/// 2. Variants use named fields; tuple and unit variants are rejected.
/// 3. Variants with a source need `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[verneg_derive::verneg_error]
/// pub enum LoaderError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read() -> Result<String, LoaderError> {
///     std::fs::read_to_string("server.toml").context("Reading server config")
/// }
/// ```
#[proc_macro_attribute]
pub fn verneg_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
