use crate::descriptor::TypeDescriptor;
use std::borrow::Cow;

/// Errors raised while negotiating a response representation.
#[verneg_derive::verneg_error]
pub enum NegotiationError {
    /// A mapper received a model that is not (and does not embed) its declared model type.
    /// Always a provider configuration bug.
    #[error(
        "Type mismatch{}: expected `{expected}`, got `{actual}`",
        format_context(.context)
    )]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
        context: Option<Cow<'static, str>>,
    },

    /// No provider covers the element type, or its registry has neither a mapper for the
    /// negotiated version nor a default.
    #[error(
        "Missing model mapper{}: `{model}` has no mapper for version {}",
        format_context(.context),
        format_version(.version)
    )]
    MissingModelMapper {
        model: TypeDescriptor,
        version: Option<u32>,
        context: Option<Cow<'static, str>>,
    },

    /// The payload could not be rendered to JSON.
    #[error("Render error{}: {source}", format_context(.context))]
    Render { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal negotiation error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_version(version: &Option<u32>) -> Cow<'static, str> {
    version.map_or(Cow::Borrowed("<none>"), |v| Cow::Owned(v.to_string()))
}
