//! # Version negotiation core
//!
//! Picks the representation of a response model for the version an API consumer asked for.
//!
//! *Which* version was requested is decided elsewhere, by a version strategy. This crate decides
//! *how* a model looks in that version:
//!
//! * A [`Mapper`] turns one model type into one representation.
//! * A [`MapperRegistry`] holds the mappers of one model type, keyed by version, with an optional
//!   default.
//! * A [`MapperProvider`] populates the registry of its model type; providers are collected in a
//!   [`ProviderSet`] at startup.
//! * The [`Negotiator`] classifies a response [`Payload`] as a scalar or a collection, finds the
//!   provider for its element type, resolves the mapper for the version and rewrites the payload.
//!
//! ```rust
//! use verneg_core::{ModelMapperProvider, Negotiator, Payload};
//!
//! let negotiator = Negotiator::builder()
//!     .provider(ModelMapperProvider::<u32>::new(|r| {
//!         r.map_default(|n: &u32| *n).map(2, |n: &u32| format!("#{n}"));
//!     }))
//!     .build();
//!
//! let mapped = negotiator.map_response(Some(Payload::new(vec![1_u32, 2])), Some(2)).unwrap();
//! assert_eq!(mapped.unwrap().to_json().unwrap(), serde_json::json!(["#1", "#2"]));
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod mapper;
pub mod negotiator;
pub mod options;
pub mod payload;
pub mod provider;
pub mod registry;
pub mod shape;

pub use descriptor::{Describe, ModelRef, SequenceKind, TypeDescriptor, TypeKind, Upcast};
pub use error::{NegotiationError, NegotiationErrorExt};
pub use mapper::{Mapper, ModelMapper};
pub use negotiator::{NegotiatedVersion, Negotiation, Negotiator, NegotiatorBuilder};
pub use options::{MissingMapperPolicy, NegotiationOptions};
pub use payload::Payload;
pub use provider::{MapperProvider, ModelMapperProvider, ProviderSet, ProviderSetBuilder};
pub use registry::{MapperRegistry, RegistryBuilder};
pub use shape::{ResponseShape, classify};

pub use verneg_derive::versioned_model;
