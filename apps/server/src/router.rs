use crate::config::AppConfig;
use crate::people;
use anyhow::{Context, Result};
use axum::Router;
use axum::http::HeaderName;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use verneg_axum::{HeaderStrategy, VersionNegotiation};
use verneg_core::Negotiator;

/// Builds the application router: the people routes wrapped in version negotiation.
///
/// # Errors
/// Returns an error if the configured version header is not a valid header name.
pub fn init(cfg: &AppConfig) -> Result<Router> {
    let header = HeaderName::try_from(cfg.versioning.header.as_str())
        .with_context(|| format!("Invalid version header '{}'", cfg.versioning.header))?;

    let negotiator =
        Negotiator::builder().options(cfg.negotiation.clone()).provider(people::provider()).build();

    let api = Router::new()
        .route("/api/versioned", get(people::list_people))
        .route("/api/versioned/{id}", get(people::get_person));

    Ok(VersionNegotiation::new(negotiator, HeaderStrategy::new(header))
        .attach(api)
        .layer(TraceLayer::new_for_http()))
}
