use crate::descriptor::TypeDescriptor;
use crate::error::NegotiationError;
use crate::options::{MissingMapperPolicy, NegotiationOptions};
use crate::payload::Payload;
use crate::provider::{MapperProvider, ProviderSet, ProviderSetBuilder};
use crate::shape::classify;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// The result of a version strategy: the requested version, if any, and the request header the
/// response varies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegotiatedVersion {
    pub version: Option<u32>,
    pub vary_on: Option<String>,
}

impl NegotiatedVersion {
    #[must_use]
    pub const fn new(version: Option<u32>) -> Self {
        Self { version, vary_on: None }
    }

    #[must_use]
    pub const fn of(version: u32) -> Self {
        Self::new(Some(version))
    }

    #[must_use]
    pub fn with_vary(mut self, header: impl Into<String>) -> Self {
        self.vary_on = Some(header.into());
        self
    }
}

/// Outcome of [`Negotiator::negotiate`].
#[derive(Debug)]
pub struct Negotiation {
    /// The payload to serialize. Same as the input unless `changed` is set.
    pub payload: Option<Payload>,
    /// Value of the `Vary` header to append, if any.
    pub vary: Option<String>,
    /// Whether a mapper replaced the payload.
    pub changed: bool,
}

#[derive(Debug)]
pub struct NegotiatorInner {
    pub options: NegotiationOptions,
    pub providers: ProviderSet,
}

/// The negotiation dispatcher.
///
/// Cheap to clone; the options and provider set are shared and read-only after
/// [`NegotiatorBuilder::build`].
#[derive(Debug, Clone)]
pub struct Negotiator {
    inner: Arc<NegotiatorInner>,
}

impl Negotiator {
    #[must_use]
    pub fn builder() -> NegotiatorBuilder {
        NegotiatorBuilder::default()
    }

    /// Rewrites a response payload for `version`.
    ///
    /// An empty payload is returned as is. Otherwise the payload is classified as a scalar or a
    /// collection, the first provider covering its element type is looked up, and the mapper
    /// resolved for `version` transforms it. A mapper whose result type is the element type leaves
    /// the payload untouched.
    ///
    /// # Errors
    /// * [`NegotiationError::MissingModelMapper`] when nothing applies and the policy is
    ///   [`MissingMapperPolicy::Fail`].
    /// * [`NegotiationError::TypeMismatch`] when a provider hands out a mapper that does not fit.
    pub fn map_response(
        &self,
        payload: Option<Payload>,
        version: Option<u32>,
    ) -> Result<Option<Payload>, NegotiationError> {
        payload.map(|payload| self.map_payload(payload, version).map(|(p, _)| p)).transpose()
    }

    /// Rewrites a non-empty payload for `version`, reporting whether it was replaced.
    ///
    /// # Errors
    /// See [`Negotiator::map_response`].
    pub fn map_payload(
        &self,
        payload: Payload,
        version: Option<u32>,
    ) -> Result<(Payload, bool), NegotiationError> {
        let shape = classify(&payload.effective_type());
        let element = shape.element();
        debug!(
            element = %element.short_name(),
            collection = shape.is_collection(),
            ?version,
            "Negotiating response"
        );

        let Some(provider) = self.providers.find(&element) else {
            return self.missing_mapper(payload, element, version, "no provider registered");
        };

        let registry = self.providers.registry(provider.as_ref());
        let Some(mapper) = registry.resolve(version) else {
            return self.missing_mapper(payload, element, version, "no mapper and no default");
        };

        if mapper.result_type() == element {
            trace!(?mapper, "Mapper keeps the element type; payload left untouched");
            return Ok((payload, false));
        }

        debug!(?mapper, "Mapping response");
        let mapped = if shape.is_collection() {
            mapper.map_collection(&payload.elements()?)?
        } else {
            mapper.map(payload.as_model())?
        };
        Ok((mapped, true))
    }

    /// Runs a whole negotiation: maps the payload for the strategy's version and decides on the
    /// `Vary` header.
    ///
    /// `negotiated` is `None` when the strategy produced nothing. The `Vary` value is only set when
    /// the strategy produced a result with a non-empty hint, the header is enabled, and there was
    /// a payload to negotiate, regardless of whether the mapper changed it.
    ///
    /// # Errors
    /// See [`Negotiator::map_response`].
    pub fn negotiate(
        &self,
        negotiated: Option<&NegotiatedVersion>,
        payload: Option<Payload>,
    ) -> Result<Negotiation, NegotiationError> {
        let Some(payload) = payload else {
            return Ok(Negotiation { payload: None, vary: None, changed: false });
        };

        let version = negotiated.and_then(|n| n.version);
        let (payload, changed) = self.map_payload(payload, version)?;

        let vary = negotiated
            .and_then(|n| n.vary_on.as_deref())
            .filter(|hint| self.options.emit_vary_header && !hint.is_empty())
            .map(str::to_owned);

        Ok(Negotiation { payload: Some(payload), vary, changed })
    }

    fn missing_mapper(
        &self,
        payload: Payload,
        element: TypeDescriptor,
        version: Option<u32>,
        reason: &'static str,
    ) -> Result<(Payload, bool), NegotiationError> {
        match self.options.missing_mapper {
            MissingMapperPolicy::Fail => Err(NegotiationError::MissingModelMapper {
                model: element,
                version,
                context: Some(Cow::Borrowed(reason)),
            }),
            MissingMapperPolicy::Passthrough => {
                warn!(element = %element, ?version, reason, "Missing model mapper; passing through");
                Ok((payload, false))
            },
        }
    }
}

impl Deref for Negotiator {
    type Target = NegotiatorInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Default)]
pub struct NegotiatorBuilder {
    options: NegotiationOptions,
    providers: ProviderSetBuilder,
}

impl NegotiatorBuilder {
    #[must_use]
    pub fn options(mut self, options: NegotiationOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn provider<P: MapperProvider + 'static>(mut self, provider: P) -> Self {
        self.providers = self.providers.provider(provider);
        self
    }

    /// Registers several providers, keeping their order.
    #[must_use]
    pub fn providers<I>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn MapperProvider>>,
    {
        self.providers = self.providers.providers(providers);
        self
    }

    /// Freezes the configuration. The provider set caches registries when
    /// [`NegotiationOptions::cache_registries`] is on.
    #[must_use]
    pub fn build(self) -> Negotiator {
        let providers = self.providers.cache_registries(self.options.cache_registries).build();
        Negotiator { inner: Arc::new(NegotiatorInner { options: self.options, providers }) }
    }
}
