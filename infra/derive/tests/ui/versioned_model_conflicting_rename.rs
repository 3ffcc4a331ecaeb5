use verneg_derive::versioned_model;

#[versioned_model]
#[serde(rename_all = "snake_case")]
pub struct Person {
    pub display_name: String,
}

fn main() {}
