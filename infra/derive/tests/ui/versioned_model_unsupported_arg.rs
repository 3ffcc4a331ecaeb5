use verneg_derive::versioned_model;

#[versioned_model(deny_unknown_fields)]
pub struct Person {
    pub display_name: String,
}

fn main() {}
