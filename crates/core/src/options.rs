use serde::{Deserialize, Serialize};

/// What the dispatcher does when a payload's element type has no provider, or the provider has
/// no mapper for the negotiated version and no default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMapperPolicy {
    /// Fail the negotiation with `NegotiationError::MissingModelMapper`.
    #[default]
    Fail,
    /// Leave the payload untouched.
    Passthrough,
}

/// Negotiation settings, usually loaded as the `[negotiation]` section of the service config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationOptions {
    /// Append a `Vary` header naming the strategy's hint.
    pub emit_vary_header: bool,
    pub missing_mapper: MissingMapperPolicy,
    /// Build each provider's registry once and share it across requests.
    pub cache_registries: bool,
}

impl Default for NegotiationOptions {
    fn default() -> Self {
        Self {
            emit_vary_header: true,
            missing_mapper: MissingMapperPolicy::Fail,
            cache_registries: false,
        }
    }
}

impl NegotiationOptions {
    #[must_use]
    pub const fn fails_on_missing_mapper(&self) -> bool {
        matches!(self.missing_mapper, MissingMapperPolicy::Fail)
    }
}
