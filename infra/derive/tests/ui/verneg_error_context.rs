use std::borrow::Cow;
use verneg_derive::verneg_error;

#[verneg_error]
pub enum MappingError {
    #[error("Mapping failed{}: {message}", format_context(.context))]
    Failed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn fail() -> Result<(), MappingError> {
    Err(MappingError::Failed { message: "boom".into(), context: None })
}

fn main() {
    let err = fail().context("mapping Person v2").unwrap_err();
    assert_eq!(err.to_string(), "Mapping failed (mapping Person v2): boom");

    let MappingError::Failed { context, .. } = err;
    assert_eq!(context.as_deref(), Some("mapping Person v2"));
}
