//! Resolving templates from manifest files on disk

use crate::integration::test_utils::{Harness, PRIMARY};
use graphgen::types::InputType;
use graphgen::GenerateError;
use serde_json::{json, Value};

#[tokio::test]
async fn test_json_manifest_with_extensions() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness.write("tpl/types.hbs", "{{#each types}}{{name}}{{/each}}");
    harness.write(
        "tpl/manifest.json",
        r#"{
            "default": {
                "inputType": "SINGLE_FILE",
                "templates": ["types.hbs"],
                "flattenTypes": true,
                "config": { "prefix": "I" },
                "addToSchema": ["type Local { flag }"]
            }
        }"#,
    );

    let mut request = harness.request();
    request.template = Some("tpl/manifest.json".to_string());
    harness.generate(&harness.context(), &request).await.unwrap();

    let call = harness.emitter.single_call();
    let config = call.config.unwrap();
    assert_eq!(config.input_type, InputType::SingleFile);
    assert!(config.flatten_types);
    assert_eq!(config.templates.len(), 1);
    assert_eq!(config.templates[0].content, "{{#each types}}{{name}}{{/each}}");
    assert_eq!(Value::Object(config.config), json!({ "prefix": "I" }));
    assert!(call.context.types.iter().any(|t| t.name == "Local"));
}

#[tokio::test]
async fn test_toml_manifest_without_default_uses_document() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness.write(
        "generator.toml",
        "flattenTypes = true\n\n[primitives]\nID = \"number\"\n",
    );

    let mut request = harness.request();
    request.template = Some("generator.toml".to_string());
    harness.generate(&harness.context(), &request).await.unwrap();

    let config = harness.emitter.single_call().config.unwrap();
    assert!(config.flatten_types);
    assert_eq!(config.primitives.id, "number");
    assert_eq!(config.primitives.string, "string");
}

#[tokio::test]
async fn test_data_manifest_is_shape_error() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness.write("data.json", r#"{ "name": "not a generator" }"#);

    let mut request = harness.request();
    request.template = Some("data.json".to_string());
    let err = harness
        .generate(&harness.context(), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::TemplateShape { .. }));
    assert_eq!(harness.fetcher.fetch_count(), 0);
}
