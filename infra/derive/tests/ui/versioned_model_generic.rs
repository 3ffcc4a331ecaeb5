use verneg_derive::versioned_model;

#[versioned_model]
pub struct Envelope<T> {
    pub inner: T,
}

fn main() {}
