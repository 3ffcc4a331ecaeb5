use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::error;
use verneg_core::{Describe, NegotiationError, Payload, TypeDescriptor};

/// Handler return type for responses that take part in version negotiation.
///
/// The value is rendered as JSON right away, so the response is valid even without the
/// negotiation middleware. The middleware picks the payload back up and re-renders it when a
/// mapper rewrites it.
///
/// ```rust
/// use verneg_axum::Negotiated;
///
/// async fn numbers() -> Negotiated<Vec<u32>> {
///     Negotiated(vec![1, 2, 3])
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Negotiated<T>(pub T);

impl<T> Negotiated<T>
where
    T: Describe + Serialize + Send + Sync,
{
    /// Negotiates the value as if it were a `D`, e.g. a child model as its parent type.
    #[must_use]
    pub fn declared_as<D: Describe>(self) -> NegotiatedPayload {
        NegotiatedPayload(Payload::new(self.0).with_declared_type(TypeDescriptor::of::<D>()))
    }
}

impl<T> IntoResponse for Negotiated<T>
where
    T: Describe + Serialize + Send + Sync,
{
    fn into_response(self) -> Response {
        NegotiatedPayload(Payload::new(self.0)).into_response()
    }
}

/// A type-erased [`Negotiated`] response.
#[derive(Debug)]
pub struct NegotiatedPayload(pub Payload);

impl IntoResponse for NegotiatedPayload {
    fn into_response(self) -> Response {
        let mut response = match render(&self.0) {
            Ok(response) => response,
            Err(err) => return NegotiationFailure(err).into_response(),
        };
        response.extensions_mut().insert(PendingPayload::new(self.0));
        response
    }
}

/// Payload handed from the response to the middleware through the response extensions.
#[derive(Clone)]
pub(crate) struct PendingPayload(Arc<Mutex<Option<Payload>>>);

impl PendingPayload {
    fn new(payload: Payload) -> Self {
        Self(Arc::new(Mutex::new(Some(payload))))
    }

    pub(crate) fn take(&self) -> Option<Payload> {
        self.0.lock().take()
    }
}

impl fmt::Debug for PendingPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PendingPayload").field(&self.0.lock().as_ref()).finish()
    }
}

/// A `200 OK` JSON response for `payload`.
pub(crate) fn render(payload: &Payload) -> Result<Response, NegotiationError> {
    let body = payload.to_json_vec()?;
    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))],
        Body::from(body),
    )
        .into_response())
}

const APPLICATION_JSON: &str = "application/json";

/// Turns a failed negotiation into a `500 Internal Server Error`.
///
/// The error is logged; the body never carries its details.
#[derive(Debug)]
pub struct NegotiationFailure(pub NegotiationError);

impl IntoResponse for NegotiationFailure {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Version negotiation failed");

        let body = serde_json::json!({ "error": "Internal server error" });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}
