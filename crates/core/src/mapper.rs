use crate::descriptor::{Describe, ModelRef, TypeDescriptor};
use crate::error::NegotiationError;
use crate::payload::Payload;
use serde::Serialize;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

/// A version-specific transformation of one model type into its wire representation.
///
/// Mappers are pure: they only read the model they are given and always produce a new value.
pub trait Mapper: Send + Sync + fmt::Debug {
    /// The version this mapper answers for; `None` for the default mapper.
    fn version(&self) -> Option<u32>;

    fn model_type(&self) -> TypeDescriptor;

    fn result_type(&self) -> TypeDescriptor;

    /// Transforms a single model.
    ///
    /// # Errors
    /// Returns [`NegotiationError::TypeMismatch`] if `model` is not, and does not embed, the
    /// mapper's model type.
    fn map(&self, model: ModelRef<'_>) -> Result<Payload, NegotiationError>;

    /// Transforms every model of a sequence, preserving order and length.
    ///
    /// # Errors
    /// Returns [`NegotiationError::TypeMismatch`] on the first element that does not fit.
    fn map_collection(&self, models: &[ModelRef<'_>]) -> Result<Payload, NegotiationError>;
}

type Transform<M, R> = Box<dyn Fn(&M) -> R + Send + Sync>;

/// A [`Mapper`] backed by a closure from `&M` to `R`.
pub struct ModelMapper<M, R> {
    version: Option<u32>,
    transform: Transform<M, R>,
    _marker: PhantomData<fn() -> M>,
}

impl<M, R> ModelMapper<M, R>
where
    M: Describe,
    R: Describe + Serialize + Send + Sync,
{
    pub fn new<F>(version: Option<u32>, transform: F) -> Self
    where
        F: Fn(&M) -> R + Send + Sync + 'static,
    {
        Self { version, transform: Box::new(transform), _marker: PhantomData }
    }

    /// Runs the transformation on a statically typed model.
    pub fn apply(&self, model: &M) -> R {
        (self.transform)(model)
    }

    fn view<'a>(&self, model: &ModelRef<'a>) -> Result<&'a M, NegotiationError> {
        model.downcast::<M>().ok_or_else(|| NegotiationError::TypeMismatch {
            expected: type_name::<M>(),
            actual: model.type_descriptor().name(),
            context: Some(format!("mapper {self:?}").into()),
        })
    }
}

impl<M, R> Mapper for ModelMapper<M, R>
where
    M: Describe,
    R: Describe + Serialize + Send + Sync,
{
    fn version(&self) -> Option<u32> {
        self.version
    }

    fn model_type(&self) -> TypeDescriptor {
        M::describe()
    }

    fn result_type(&self) -> TypeDescriptor {
        R::describe()
    }

    fn map(&self, model: ModelRef<'_>) -> Result<Payload, NegotiationError> {
        let model = self.view(&model)?;
        Ok(Payload::new(self.apply(model)))
    }

    fn map_collection(&self, models: &[ModelRef<'_>]) -> Result<Payload, NegotiationError> {
        let mapped = models
            .iter()
            .map(|model| self.view(model).map(|m| self.apply(m)))
            .collect::<Result<Vec<R>, _>>()?;
        Ok(Payload::new(mapped))
    }
}

impl<M, R> fmt::Debug for ModelMapper<M, R>
where
    M: Describe,
    R: Describe,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = M::describe().short_name();
        let result = R::describe().short_name();
        match self.version {
            Some(version) => write!(f, "{model} v{version} -> {result}"),
            None => write!(f, "{model} vAny -> {result}"),
        }
    }
}
