//! # Axum integration
//!
//! Version negotiation for axum services.
//!
//! * Handlers return [`Negotiated<T>`] instead of `Json<T>`.
//! * A [`VersionStrategy`] reads the requested version from the request.
//! * [`VersionNegotiation::attach`] installs the [`negotiate_version`] middleware, which rewrites
//!   negotiated responses through a [`verneg_core::Negotiator`] and appends `Vary` headers.
//!
//! ```rust
//! use axum::Router;
//! use axum::http::HeaderName;
//! use axum::routing::get;
//! use verneg_axum::{HeaderStrategy, Negotiated, VersionNegotiation};
//! use verneg_core::{ModelMapperProvider, Negotiator};
//!
//! let negotiator = Negotiator::builder()
//!     .provider(ModelMapperProvider::<u32>::new(|r| {
//!         r.map_default(|n: &u32| *n).map(2, |n: &u32| n.to_string());
//!     }))
//!     .build();
//!
//! let negotiation =
//!     VersionNegotiation::new(negotiator, HeaderStrategy::new(HeaderName::from_static("api-version")));
//!
//! let app: Router = negotiation.attach(Router::new().route("/answer", get(|| async { Negotiated(42_u32) })));
//! ```

mod middleware;
mod response;
mod strategy;

pub use middleware::{VersionNegotiation, negotiate_version};
pub use response::{Negotiated, NegotiatedPayload, NegotiationFailure};
pub use strategy::{HeaderStrategy, VersionStrategy};
