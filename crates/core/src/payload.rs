use crate::descriptor::{Describe, ModelRef, TypeDescriptor, TypeKind};
use crate::error::NegotiationError;
use serde::Serialize;
use std::any::{Any, type_name};
use std::borrow::Cow;
use std::fmt;

type RenderFn = fn(&(dyn Any + Send + Sync)) -> Result<serde_json::Value, NegotiationError>;

/// An owned, type-erased response body on its way to the serializer.
///
/// The payload remembers its runtime type, an optional declared (static) type, and how to render
/// itself as JSON, so whatever object graph negotiation produces can still be serialized.
pub struct Payload {
    value: Box<dyn Any + Send + Sync>,
    runtime: TypeDescriptor,
    declared: Option<TypeDescriptor>,
    render: RenderFn,
}

impl Payload {
    pub fn new<T>(value: T) -> Self
    where
        T: Describe + Serialize + Send + Sync,
    {
        Self { value: Box::new(value), runtime: T::describe(), declared: None, render: render::<T> }
    }

    /// Records the static type the payload was declared with. It takes precedence over the
    /// runtime type when the payload is classified.
    #[must_use]
    pub const fn with_declared_type(mut self, declared: TypeDescriptor) -> Self {
        self.declared = Some(declared);
        self
    }

    #[must_use]
    pub const fn runtime_type(&self) -> TypeDescriptor {
        self.runtime
    }

    #[must_use]
    pub const fn declared_type(&self) -> Option<TypeDescriptor> {
        self.declared
    }

    /// The type negotiation reasons about: the declared type when known, the runtime type
    /// otherwise.
    #[must_use]
    pub fn effective_type(&self) -> TypeDescriptor {
        self.declared.unwrap_or(self.runtime)
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Takes the value back out.
    ///
    /// # Errors
    /// Returns the payload unchanged if it does not hold a `T`.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let Self { value, runtime, declared, render } = self;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { value, runtime, declared, render }),
        }
    }

    /// The payload viewed as a single model.
    #[must_use]
    pub fn as_model(&self) -> ModelRef<'_> {
        ModelRef::new(self.erased(), self.runtime)
    }

    /// The payload viewed as a sequence of models, in order.
    ///
    /// Elements are read through the runtime type, so each one keeps its concrete descriptor even
    /// when the payload was declared as a sequence of a parent type.
    ///
    /// # Errors
    /// Returns [`NegotiationError::TypeMismatch`] if the runtime type is not a sequence.
    pub fn elements(&self) -> Result<Vec<ModelRef<'_>>, NegotiationError> {
        let ty = self.runtime;
        let mismatch = || NegotiationError::TypeMismatch {
            expected: "a sequence type",
            actual: ty.name(),
            context: self.declared.is_some().then_some(Cow::Borrowed("declared as a sequence")),
        };

        let TypeKind::Sequence(seq) = ty.kind() else {
            return Err(mismatch());
        };
        let element = seq.element();
        let items = seq.elements(self.erased()).ok_or_else(mismatch)?;

        Ok(items.into_iter().map(|item| ModelRef::new(item, element)).collect())
    }

    /// Renders the payload with `serde_json`.
    ///
    /// # Errors
    /// Returns [`NegotiationError::Render`] if serialization fails.
    pub fn to_json(&self) -> Result<serde_json::Value, NegotiationError> {
        (self.render)(self.value.as_ref())
    }

    /// Renders the payload to JSON bytes.
    ///
    /// # Errors
    /// Returns [`NegotiationError::Render`] if serialization fails.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, NegotiationError> {
        Ok(serde_json::to_vec(&self.to_json()?)?)
    }

    fn erased(&self) -> &dyn Any {
        &*self.value
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("runtime", &self.runtime.name())
            .field("declared", &self.declared.map(|d| d.name()))
            .finish_non_exhaustive()
    }
}

fn render<T: Serialize + 'static>(
    value: &(dyn Any + Send + Sync),
) -> Result<serde_json::Value, NegotiationError> {
    let value = value.downcast_ref::<T>().ok_or_else(|| NegotiationError::TypeMismatch {
        expected: type_name::<T>(),
        actual: "<erased payload>",
        context: Some("render".into()),
    })?;
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_and_downcasts() {
        let payload = Payload::new(vec![1_u32, 2, 3]);
        assert_eq!(payload.to_json().unwrap(), json!([1, 2, 3]));
        assert_eq!(payload.downcast_ref::<Vec<u32>>().map(Vec::len), Some(3));

        let payload = payload.downcast::<String>().expect_err("not a string");
        assert_eq!(payload.downcast::<Vec<u32>>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn declared_type_wins_over_runtime_type() {
        let payload = Payload::new(String::from("abc"));
        assert_eq!(payload.effective_type(), TypeDescriptor::of::<String>());

        let payload = payload.with_declared_type(TypeDescriptor::of::<&'static str>());
        assert_eq!(payload.effective_type(), TypeDescriptor::of::<&'static str>());
        assert_eq!(payload.runtime_type(), TypeDescriptor::of::<String>());
    }

    #[test]
    fn elements_require_a_matching_sequence() {
        let payload = Payload::new(vec![String::from("a"), String::from("b")]);
        let items = payload.elements().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].downcast::<String>().map(String::as_str), Some("a"));

        let scalar = Payload::new(5_u8);
        assert!(matches!(scalar.elements(), Err(NegotiationError::TypeMismatch { .. })));

        let lying = Payload::new(5_u8).with_declared_type(TypeDescriptor::of::<Vec<u8>>());
        assert!(matches!(lying.elements(), Err(NegotiationError::TypeMismatch { .. })));
    }
}
