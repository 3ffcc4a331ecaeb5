use std::borrow::Cow;
use verneg_derive::verneg_error;

#[verneg_error]
pub enum LoaderError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Unknown model{}: {name}", format_context(.context))]
    UnknownModel { name: &'static str, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let io = std::io::Error::other("disk");
    let _: LoaderError = io.into();
    let _: LoaderError = "plain".into();
    let _: LoaderError = String::from("owned").into();
}
