use crate::response::{NegotiationFailure, PendingPayload, render};
use crate::strategy::VersionStrategy;
use axum::Router;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};
use verneg_core::{Negotiation, Negotiator};

/// Shared state of the negotiation middleware: the dispatcher and the version strategy.
#[derive(Clone)]
pub struct VersionNegotiation {
    negotiator: Negotiator,
    strategy: Arc<dyn VersionStrategy>,
}

impl VersionNegotiation {
    #[must_use]
    pub fn new(negotiator: Negotiator, strategy: impl VersionStrategy) -> Self {
        Self { negotiator, strategy: Arc::new(strategy) }
    }

    #[must_use]
    pub const fn negotiator(&self) -> &Negotiator {
        &self.negotiator
    }

    /// Wraps every route of `router` with [`negotiate_version`].
    #[must_use]
    pub fn attach<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(self, negotiate_version))
    }
}

impl fmt::Debug for VersionNegotiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionNegotiation")
            .field("negotiator", &self.negotiator)
            .finish_non_exhaustive()
    }
}

/// Middleware negotiating [`Negotiated`](crate::Negotiated) responses.
///
/// The strategy sees the request before the handler runs. Afterwards the handler's payload goes
/// through the dispatcher; the body is re-rendered only if a mapper replaced it, and a `Vary`
/// header is appended when the negotiation asks for one. Responses that carry no negotiated
/// payload pass through untouched. A failed negotiation becomes a `500`.
pub async fn negotiate_version(
    State(negotiation): State<VersionNegotiation>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let negotiated = negotiation.strategy.version(&parts);
    trace!(?negotiated, path = %parts.uri.path(), "Version strategy result");

    let mut response = next.run(Request::from_parts(parts, body)).await;

    let Some(payload) = response.extensions_mut().remove::<PendingPayload>().and_then(|p| p.take())
    else {
        return response;
    };

    let Negotiation { payload, vary, changed } =
        match negotiation.negotiator.negotiate(negotiated.as_ref(), Some(payload)) {
            Ok(outcome) => outcome,
            Err(err) => return NegotiationFailure(err).into_response(),
        };

    if changed && let Some(payload) = payload {
        let rendered = match render(&payload) {
            Ok(rendered) => rendered,
            Err(err) => return NegotiationFailure(err).into_response(),
        };
        let (rendered, body) = rendered.into_parts();
        let headers = response.headers_mut();
        headers.remove(header::CONTENT_LENGTH);
        headers.extend(rendered.headers);
        *response.body_mut() = body;
    }

    if let Some(vary) = vary {
        match HeaderValue::from_str(&vary) {
            Ok(value) => {
                response.headers_mut().append(header::VARY, value);
            },
            Err(err) => warn!(%vary, %err, "Strategy produced an invalid Vary header"),
        }
    }

    response
}
