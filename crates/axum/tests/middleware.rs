use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderName, Request, StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use serde_json::{Value, json};
use tower::ServiceExt;
use verneg_axum::{HeaderStrategy, Negotiated, VersionNegotiation};
use verneg_core::{
    MissingMapperPolicy, ModelMapperProvider, NegotiatedVersion, NegotiationOptions, Negotiator,
    versioned_model,
};

#[versioned_model]
pub struct Person {
    pub name: String,
    pub id: String,
    pub age: u32,
}

#[versioned_model]
pub struct PersonV2 {
    pub id: String,
    pub full_name: String,
}

#[versioned_model]
pub struct Widget {
    pub sku: String,
}

fn person(id: &str) -> Person {
    Person { name: "Person".into(), id: id.into(), age: 12 }
}

fn negotiator(options: NegotiationOptions) -> Negotiator {
    Negotiator::builder()
        .options(options)
        .provider(ModelMapperProvider::<Person>::new(|r| {
            r.map_default(Person::clone).map(2, |p: &Person| PersonV2 {
                id: p.id.clone(),
                full_name: format!("{} {}", p.name, p.id),
            });
        }))
        .build()
}

fn routes() -> Router {
    Router::new()
        .route("/person", get(|| async { Negotiated(person("#1")) }))
        .route("/people", get(|| async { Negotiated(vec![person("#1"), person("#2")]) }))
        .route("/widget", get(|| async { Negotiated(Widget { sku: "w-1".into() }) }))
        .route("/plain", get(|| async { axum::Json(person("#9")) }))
}

fn app(options: NegotiationOptions) -> Router {
    let strategy = HeaderStrategy::new(HeaderName::from_static("api-version"));
    VersionNegotiation::new(negotiator(options), strategy).attach(routes())
}

async fn call(app: Router, uri: &str, version: Option<&str>) -> (Response<()>, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(version) = version {
        request = request.header("api-version", version);
    }

    let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap();
    (Response::from_parts(parts, ()), json)
}

fn vary(response: &Response<()>) -> Vec<&str> {
    response.headers().get_all(header::VARY).iter().filter_map(|v| v.to_str().ok()).collect()
}

#[tokio::test]
async fn version_two_rewrites_the_body() {
    let (response, body) = call(app(NegotiationOptions::default()), "/person", Some("2")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body, json!({ "id": "#1", "fullName": "Person #1" }));
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(vary(&response), ["api-version"]);
}

#[tokio::test]
async fn collections_are_rewritten_in_order() {
    let (_, body) = call(app(NegotiationOptions::default()), "/people", Some("v2")).await;

    assert_eq!(
        body,
        json!([
            { "id": "#1", "fullName": "Person #1" },
            { "id": "#2", "fullName": "Person #2" },
        ])
    );
}

#[tokio::test]
async fn default_mapping_keeps_the_body_and_still_varies() {
    let (response, body) = call(app(NegotiationOptions::default()), "/person", None).await;

    assert_eq!(body, json!({ "name": "Person", "id": "#1", "age": 12 }));
    assert_eq!(vary(&response), ["api-version"]);
}

#[tokio::test]
async fn vary_header_can_be_disabled() {
    let options = NegotiationOptions { emit_vary_header: false, ..NegotiationOptions::default() };
    let (response, _) = call(app(options), "/person", Some("2")).await;

    assert!(vary(&response).is_empty());
}

#[tokio::test]
async fn no_strategy_result_means_no_vary() {
    let silent = |_: &axum::http::request::Parts| None::<NegotiatedVersion>;
    let app = VersionNegotiation::new(negotiator(NegotiationOptions::default()), silent)
        .attach(routes());

    let (response, body) = call(app, "/person", Some("2")).await;
    assert!(vary(&response).is_empty());
    assert_eq!(body["name"], "Person");
}

#[tokio::test]
async fn missing_mapper_fails_with_500() {
    let (response, body) = call(app(NegotiationOptions::default()), "/widget", Some("2")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
    assert!(vary(&response).is_empty());
}

#[tokio::test]
async fn missing_mapper_passes_through_when_allowed() {
    let options = NegotiationOptions {
        missing_mapper: MissingMapperPolicy::Passthrough,
        ..NegotiationOptions::default()
    };
    let (response, body) = call(app(options), "/widget", Some("2")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body, json!({ "sku": "w-1" }));
    assert_eq!(vary(&response), ["api-version"]);
}

#[tokio::test]
async fn plain_responses_are_untouched() {
    let (response, body) = call(app(NegotiationOptions::default()), "/plain", Some("2")).await;

    assert_eq!(body["id"], "#9");
    assert!(vary(&response).is_empty());
}
