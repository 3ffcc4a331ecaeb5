use verneg_derive::verneg_error;

#[verneg_error]
pub struct LoaderError {
    message: String,
}

fn main() {}
