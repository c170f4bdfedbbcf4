//! Remote schema retrieval over HTTP

use crate::integration::test_utils::{Harness, ToyEngine};
use graphgen::error::FetchError;
use graphgen::orchestrator::GenerationOrchestrator;
use graphgen::schema::{DefaultSourceFetcher, LoadOptions, RawSchema, SchemaSource, SourceFetcher};
use graphgen::GenerateError;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn introspection_body() -> serde_json::Value {
    json!({
        "data": {
            "__schema": {
                "types": [
                    { "name": "Query", "fields": [{ "name": "viewer" }] },
                    { "name": "User", "fields": [{ "name": "id" }, { "name": "login" }] }
                ]
            }
        }
    })
}

#[tokio::test]
async fn test_introspection_request_carries_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "Bearer secret"))
        .and(body_partial_json(json!({ "query": graphgen::schema::source::INTROSPECTION_QUERY })))
        .respond_with(ResponseTemplate::new(200).set_body_json(introspection_body()))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempfile::TempDir::new().unwrap();
    let mut options = LoadOptions::new(temp.path());
    options.headers = vec![("Authorization".to_string(), "Bearer secret".to_string())];

    let url = format!("{}/graphql", server.uri());
    let raw = DefaultSourceFetcher::new()
        .fetch(&SchemaSource::parse(&url), &options)
        .await
        .unwrap();
    match raw {
        RawSchema::Introspection { origin, data } => {
            assert_eq!(origin, url);
            assert!(data.get("__schema").is_some());
        }
        other => panic!("unexpected raw schema: {:?}", other),
    }
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down for maintenance"))
        .mount(&server)
        .await;

    let temp = tempfile::TempDir::new().unwrap();
    let err = DefaultSourceFetcher::new()
        .fetch(
            &SchemaSource::parse(&server.uri()),
            &LoadOptions::new(temp.path()),
        )
        .await
        .unwrap_err();
    match err {
        FetchError::Status { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "down for maintenance");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_graphql_errors_are_invalid_introspection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "errors": [{ "message": "introspection disabled" }] })),
        )
        .mount(&server)
        .await;

    let temp = tempfile::TempDir::new().unwrap();
    let err = DefaultSourceFetcher::new()
        .fetch(
            &SchemaSource::parse(&server.uri()),
            &LoadOptions::new(temp.path()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidIntrospection { .. }));
    assert!(err.to_string().contains("introspection disabled"));
}

#[tokio::test]
async fn test_remote_schema_through_orchestrator() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(introspection_body()))
        .mount(&server)
        .await;

    let harness = Harness::new();
    let orchestrator = GenerationOrchestrator::new(
        Arc::new(ToyEngine::default()),
        harness.emitter.clone(),
    )
    .with_module_loader(harness.registry.clone());

    let mut request = harness.request();
    request.schema = SchemaSource::parse(&format!("{}/graphql", server.uri()));
    orchestrator
        .generate(&harness.context(), &request)
        .await
        .unwrap();

    let call = harness.emitter.single_call();
    let names: Vec<_> = call.context.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Query", "User"]);
}

#[tokio::test]
async fn test_unreachable_server_is_schema_load_error() {
    let server = MockServer::start().await;
    let url = format!("{}/graphql", server.uri());
    drop(server);

    let harness = Harness::new();
    let orchestrator = GenerationOrchestrator::new(
        Arc::new(ToyEngine::default()),
        harness.emitter.clone(),
    )
    .with_module_loader(harness.registry.clone());

    let mut request = harness.request();
    request.schema = SchemaSource::parse(&url);
    let err = orchestrator
        .generate(&harness.context(), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::SchemaLoad { .. }));
}
