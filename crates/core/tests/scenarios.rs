use serde_json::json;
use verneg_core::{
    MissingMapperPolicy, ModelMapperProvider, NegotiatedVersion, NegotiationError,
    NegotiationOptions, Negotiator, Payload, TypeDescriptor, versioned_model,
};

#[versioned_model]
pub struct Person {
    pub name: String,
    pub id: String,
    pub age: u32,
}

#[versioned_model]
pub struct PersonV2 {
    pub id: String,
    pub display_name: String,
    pub age: u32,
}

impl From<&Person> for PersonV2 {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id.clone(),
            display_name: format!("{} {}", person.name, person.id),
            age: person.age,
        }
    }
}

#[versioned_model]
pub struct Widget {
    pub sku: String,
}

fn person(id: &str, age: u32) -> Person {
    Person { name: "Person".into(), id: id.into(), age }
}

fn negotiator(policy: MissingMapperPolicy) -> Negotiator {
    Negotiator::builder()
        .options(NegotiationOptions { missing_mapper: policy, ..NegotiationOptions::default() })
        .provider(ModelMapperProvider::<Person>::new(|r| {
            r.map_default(Person::clone).map(2, |p: &Person| PersonV2::from(p));
        }))
        .build()
}

#[test]
fn version_two_maps_person_to_person_v2() {
    let mapped = negotiator(MissingMapperPolicy::Fail)
        .map_response(Some(Payload::new(person("#1", 12))), Some(2))
        .unwrap()
        .unwrap();

    assert_eq!(mapped.runtime_type(), TypeDescriptor::of::<PersonV2>());
    let v2 = mapped.downcast_ref::<PersonV2>().unwrap();
    assert_eq!(v2.display_name, "Person #1");
    assert_eq!(
        mapped.to_json().unwrap(),
        json!({ "id": "#1", "displayName": "Person #1", "age": 12 })
    );
}

#[test]
fn no_version_keeps_the_person() {
    let (payload, changed) = negotiator(MissingMapperPolicy::Fail)
        .map_payload(Payload::new(person("#1", 12)), None)
        .unwrap();

    assert!(!changed);
    let kept = payload.downcast::<Person>().unwrap();
    assert_eq!((kept.id.as_str(), kept.age), ("#1", 12));
}

#[test]
fn person_lists_are_mapped_element_wise() {
    let people = vec![person("#1", 12), person("#2", 26)];
    let mapped = negotiator(MissingMapperPolicy::Fail)
        .map_response(Some(Payload::new(people)), Some(2))
        .unwrap()
        .unwrap();

    let v2 = mapped.downcast::<Vec<PersonV2>>().unwrap();
    let ids: Vec<_> = v2.iter().map(|p| (p.id.as_str(), p.age)).collect();
    assert_eq!(ids, [("#1", 12), ("#2", 26)]);
}

#[test]
fn unknown_models_fail_by_default() {
    let err = negotiator(MissingMapperPolicy::Fail)
        .map_response(Some(Payload::new(Widget { sku: "w-1".into() })), Some(2))
        .unwrap_err();

    let NegotiationError::MissingModelMapper { model, version, .. } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(*model, TypeDescriptor::of::<Widget>());
    assert_eq!(*version, Some(2));
    assert!(err.to_string().contains("Widget"), "{err}");
}

#[test]
fn unknown_models_pass_through_when_allowed() {
    let negotiated = NegotiatedVersion::of(2);
    let outcome = negotiator(MissingMapperPolicy::Passthrough)
        .negotiate(Some(&negotiated), Some(Payload::new(Widget { sku: "w-1".into() })))
        .unwrap();

    assert!(!outcome.changed);
    assert!(outcome.vary.is_none());
    let widget = outcome.payload.unwrap().downcast::<Widget>().unwrap();
    assert_eq!(widget.sku, "w-1");
}

#[test]
fn vary_is_emitted_even_for_a_no_op_mapping() {
    let negotiated = NegotiatedVersion::new(None).with_vary("api-version");
    let outcome = negotiator(MissingMapperPolicy::Fail)
        .negotiate(Some(&negotiated), Some(Payload::new(person("#1", 12))))
        .unwrap();

    assert!(!outcome.changed);
    assert_eq!(outcome.vary.as_deref(), Some("api-version"));
}

#[test]
fn text_is_scalar_and_slices_are_collections() {
    let negotiator = negotiator(MissingMapperPolicy::Fail);

    // A text payload is one value, never a sequence of characters.
    let text = Payload::new(String::from("Person"));
    assert!(matches!(
        negotiator.map_response(Some(text), Some(2)),
        Err(NegotiationError::MissingModelMapper { .. })
    ));

    let boxed: Box<[Person]> = vec![person("#1", 1)].into_boxed_slice();
    let mapped = negotiator.map_response(Some(Payload::new(boxed)), Some(2)).unwrap().unwrap();
    assert_eq!(mapped.runtime_type(), TypeDescriptor::of::<Vec<PersonV2>>());
}
