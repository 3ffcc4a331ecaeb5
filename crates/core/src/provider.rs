use crate::descriptor::{Describe, TypeDescriptor};
use crate::registry::{MapperRegistry, RegistryBuilder};
use fxhash::{FxHashMap, FxHashSet};
use parking_lot::RwLock;
use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Supplies the mapper registry of one model type.
///
/// Providers are registered once at startup and never change afterwards.
pub trait MapperProvider: Send + Sync + fmt::Debug {
    fn model_type(&self) -> TypeDescriptor;

    /// A freshly populated registry for [`MapperProvider::model_type`].
    fn build_registry(&self) -> MapperRegistry;
}

type Populate<M> = Box<dyn Fn(&mut RegistryBuilder<'_, M>) + Send + Sync>;

/// A [`MapperProvider`] whose registry is populated by a closure.
///
/// ```rust
/// use verneg_core::{MapperProvider, ModelMapperProvider};
///
/// let provider = ModelMapperProvider::<u32>::new(|r| {
///     r.map_default(|n: &u32| *n).map(2, |n: &u32| n.to_string());
/// });
/// assert_eq!(provider.build_registry().versions(), vec![2]);
/// ```
pub struct ModelMapperProvider<M> {
    populate: Populate<M>,
    _marker: PhantomData<fn() -> M>,
}

impl<M: Describe> ModelMapperProvider<M> {
    pub fn new<F>(populate: F) -> Self
    where
        F: Fn(&mut RegistryBuilder<'_, M>) + Send + Sync + 'static,
    {
        Self { populate: Box::new(populate), _marker: PhantomData }
    }
}

impl<M: Describe> MapperProvider for ModelMapperProvider<M> {
    fn model_type(&self) -> TypeDescriptor {
        M::describe()
    }

    fn build_registry(&self) -> MapperRegistry {
        MapperRegistry::of::<M>(|registry| (self.populate)(registry))
    }
}

impl<M: Describe> fmt::Debug for ModelMapperProvider<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelMapperProvider<{}>", M::describe().short_name())
    }
}

/// The process-wide, ordered collection of mapper providers.
pub struct ProviderSet {
    providers: Vec<Arc<dyn MapperProvider>>,
    cache: Option<RwLock<FxHashMap<TypeId, Arc<MapperRegistry>>>>,
}

impl ProviderSet {
    #[must_use]
    pub fn builder() -> ProviderSetBuilder {
        ProviderSetBuilder::default()
    }

    /// The first registered provider whose model type is assignable from `element`.
    #[must_use]
    pub fn find(&self, element: &TypeDescriptor) -> Option<&Arc<dyn MapperProvider>> {
        self.providers.iter().find(|provider| provider.model_type().is_assignable_from(element))
    }

    /// The registry of `provider`, built on demand or taken from the cache when enabled.
    pub fn registry(&self, provider: &dyn MapperProvider) -> Arc<MapperRegistry> {
        let Some(cache) = &self.cache else {
            return Arc::new(provider.build_registry());
        };

        let key = provider.model_type().id();
        if let Some(registry) = cache.read().get(&key) {
            return Arc::clone(registry);
        }

        let mut cache = cache.write();
        let registry = cache.entry(key).or_insert_with(|| {
            debug!(provider = ?provider, "Caching mapper registry");
            Arc::new(provider.build_registry())
        });
        Arc::clone(registry)
    }

    #[must_use]
    pub const fn caches_registries(&self) -> bool {
        self.cache.is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn MapperProvider>> {
        self.providers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSet")
            .field("providers", &self.providers)
            .field("cached", &self.cache.as_ref().map(|c| c.read().len()))
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct ProviderSetBuilder {
    providers: Vec<Arc<dyn MapperProvider>>,
    cache_registries: bool,
}

impl ProviderSetBuilder {
    #[must_use]
    pub fn provider<P: MapperProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Registers several shared providers, keeping their order.
    #[must_use]
    pub fn providers<I>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn MapperProvider>>,
    {
        self.providers.extend(providers);
        self
    }

    #[must_use]
    pub const fn cache_registries(mut self, enabled: bool) -> Self {
        self.cache_registries = enabled;
        self
    }

    /// Freezes the set. Registration order is lookup order.
    #[must_use]
    pub fn build(self) -> ProviderSet {
        let mut seen = FxHashSet::default();
        for provider in &self.providers {
            let model = provider.model_type();
            if !seen.insert(model) {
                warn!(model = %model, "Duplicate mapper provider; the first registration wins");
            }
        }

        debug!(
            count = self.providers.len(),
            cache = self.cache_registries,
            "Mapper providers registered"
        );

        ProviderSet {
            providers: self.providers,
            cache: self.cache_registries.then(|| RwLock::new(FxHashMap::default())),
        }
    }
}
