use axum::extract::Path;
use verneg_axum::Negotiated;
use verneg_core::{ModelMapperProvider, versioned_model};

/// A person as the service stores it. Served unchanged to clients that ask for no version.
#[versioned_model]
pub struct Person {
    pub name: String,
    pub id: String,
    pub age: u32,
}

impl Person {
    pub fn new(name: impl Into<String>, id: impl Into<String>, age: u32) -> Self {
        Self { name: name.into(), id: id.into(), age }
    }
}

/// Version 2 of the person resource: the name carries the id and the age is dropped.
#[versioned_model]
pub struct PersonV2 {
    pub id: String,
    pub display_name: String,
}

impl From<&Person> for PersonV2 {
    fn from(person: &Person) -> Self {
        Self { id: person.id.clone(), display_name: format!("{} {}", person.name, person.id) }
    }
}

/// Mapper provider of [`Person`]: identity by default, [`PersonV2`] for version 2.
#[must_use]
pub fn provider() -> ModelMapperProvider<Person> {
    ModelMapperProvider::<Person>::new(|registry| {
        registry.map_default(Person::clone).map(2, |person: &Person| PersonV2::from(person));
    })
}

pub(crate) async fn get_person(Path(id): Path<u32>) -> Negotiated<Person> {
    Negotiated(Person::new("Person", format!("#{id}"), 12))
}

pub(crate) async fn list_people() -> Negotiated<Vec<Person>> {
    Negotiated(vec![Person::new("Person", "#1", 12), Person::new("Person", "#2", 26)])
}
