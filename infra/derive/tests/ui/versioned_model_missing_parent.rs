use verneg_derive::versioned_model;

#[versioned_model(extends(person))]
pub struct Employee {
    pub employer: String,
}

fn main() {}
