use verneg_derive::verneg_error;

#[verneg_error]
pub enum LoaderError {
    Io { source: std::io::Error, context: String },
}

fn main() {}
