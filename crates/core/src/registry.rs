use crate::descriptor::{Describe, TypeDescriptor};
use crate::error::NegotiationError;
use crate::mapper::{Mapper, ModelMapper};
use fxhash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Per-model-type table of mappers keyed by version, with an optional default.
pub struct MapperRegistry {
    model: TypeDescriptor,
    mappers: FxHashMap<u32, Arc<dyn Mapper>>,
    default: Option<Arc<dyn Mapper>>,
}

impl MapperRegistry {
    /// An empty registry bound to `model`.
    #[must_use]
    pub fn new(model: TypeDescriptor) -> Self {
        Self { model, mappers: FxHashMap::default(), default: None }
    }

    /// Builds a registry for `M` through the typed [`RegistryBuilder`].
    ///
    /// ```rust
    /// use verneg_core::MapperRegistry;
    ///
    /// let registry = MapperRegistry::of::<u32>(|r| {
    ///     r.map_default(|n: &u32| *n).map(2, |n: &u32| n.to_string());
    /// });
    /// assert!(registry.resolve(Some(2)).is_some());
    /// assert_eq!(registry.resolve(Some(7)).and_then(|m| m.version()), None);
    /// ```
    pub fn of<M: Describe>(populate: impl FnOnce(&mut RegistryBuilder<'_, M>)) -> Self {
        let mut registry = Self::new(M::describe());
        populate(&mut RegistryBuilder { registry: &mut registry, _marker: PhantomData });
        registry
    }

    /// Installs `mapper` under its own version, or as the default when it has none.
    /// Returns the mapper it replaced.
    ///
    /// # Errors
    /// Returns [`NegotiationError::TypeMismatch`] if the mapper was built for another model type.
    pub fn insert(
        &mut self,
        mapper: Arc<dyn Mapper>,
    ) -> Result<Option<Arc<dyn Mapper>>, NegotiationError> {
        if mapper.model_type() != self.model {
            return Err(NegotiationError::TypeMismatch {
                expected: self.model.name(),
                actual: mapper.model_type().name(),
                context: Some("registering mapper".into()),
            });
        }
        Ok(self.put(mapper))
    }

    fn put(&mut self, mapper: Arc<dyn Mapper>) -> Option<Arc<dyn Mapper>> {
        match mapper.version() {
            Some(version) => self.mappers.insert(version, mapper),
            None => self.default.replace(mapper),
        }
    }

    /// The mapper registered for exactly `version`, else the default mapper, else `None`.
    #[must_use]
    pub fn resolve(&self, version: Option<u32>) -> Option<&Arc<dyn Mapper>> {
        version.and_then(|v| self.mappers.get(&v)).or(self.default.as_ref())
    }

    #[must_use]
    pub const fn model_type(&self) -> TypeDescriptor {
        self.model
    }

    /// Registered versions in ascending order, not counting the default.
    #[must_use]
    pub fn versions(&self) -> Vec<u32> {
        let mut versions: Vec<u32> = self.mappers.keys().copied().collect();
        versions.sort_unstable();
        versions
    }

    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Number of mappers, the default included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.len() + usize::from(self.default.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mappers: Vec<&Arc<dyn Mapper>> =
            self.versions().iter().filter_map(|v| self.mappers.get(v)).collect();
        mappers.extend(self.default.as_ref());
        f.debug_struct("MapperRegistry")
            .field("model", &self.model.short_name())
            .field("mappers", &mappers)
            .finish()
    }
}

/// Typed view over a [`MapperRegistry`] used to populate it.
///
/// Registering a version twice keeps the last mapper; the same goes for the default.
pub struct RegistryBuilder<'a, M> {
    registry: &'a mut MapperRegistry,
    _marker: PhantomData<fn() -> M>,
}

impl<M: Describe> RegistryBuilder<'_, M> {
    /// Installs (or replaces) the mapper used when no version-specific one applies.
    pub fn map_default<R, F>(&mut self, transform: F) -> &mut Self
    where
        R: Describe + Serialize + Send + Sync,
        F: Fn(&M) -> R + Send + Sync + 'static,
    {
        self.registry.put(Arc::new(ModelMapper::<M, R>::new(None, transform)));
        self
    }

    /// Installs (or replaces) the mapper for `version`.
    pub fn map<R, F>(&mut self, version: u32, transform: F) -> &mut Self
    where
        R: Describe + Serialize + Send + Sync,
        F: Fn(&M) -> R + Send + Sync + 'static,
    {
        self.registry.put(Arc::new(ModelMapper::<M, R>::new(Some(version), transform)));
        self
    }
}

impl<M: Describe> fmt::Debug for RegistryBuilder<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegistryBuilder").field(&self.registry).finish()
    }
}
