//! End-to-end orchestrator runs against the toy engine

use crate::integration::test_utils::{
    generator_with, CapturedLogs, Harness, ToyEngine, CLIENT, PRIMARY,
};
use async_trait::async_trait;
use graphgen::emitter::{Emitter, ProcessorDispatch};
use graphgen::error::{BoxError, EngineError, SchemaRole};
use graphgen::orchestrator::{GenerationOrchestrator, RunContext};
use graphgen::schema::{canonicalize, SchemaEngine, SchemaSource};
use graphgen::template::{LoadedModule, ResolvedTemplate};
use graphgen::types::{
    CustomProcessor, DocumentCollection, EmitFlags, FileOutput, GeneratorConfig, SchemaContext,
};
use graphgen::GenerateError;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

fn type_names(context: &SchemaContext) -> Vec<String> {
    context.types.iter().map(|t| t.name.clone()).collect()
}

fn members(context: &SchemaContext, name: &str) -> Vec<String> {
    context
        .types
        .iter()
        .find(|t| t.name == name)
        .map(|t| t.members.clone())
        .unwrap_or_default()
}

#[test]
fn test_single_schema_is_not_merged() {
    let engine = ToyEngine::default();
    let schema = Arc::new(
        engine
            .build_schema(graphgen::schema::RawSchema::Sdl {
                origin: PRIMARY.to_string(),
                text: "type Query { a }".to_string(),
            })
            .unwrap(),
    );
    let canonical = canonicalize(&engine, vec![schema.clone()]).unwrap();
    assert!(Arc::ptr_eq(&schema, &canonical));
    assert_eq!(engine.merge_count(), 0);
}

#[tokio::test]
async fn test_single_schema_run_skips_merge() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a b }");

    harness
        .generate(&harness.context(), &harness.request())
        .await
        .unwrap();

    assert_eq!(harness.engine.merge_count(), 0);
    let call = harness.emitter.single_call();
    assert_eq!(members(&call.context, "Query"), vec!["a", "b"]);
}

#[tokio::test]
async fn test_client_schema_is_merged() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness
        .fetcher
        .insert_sdl(CLIENT, "type Query { b } type Local { flag }");

    let mut request = harness.request();
    request.client_schema = Some(SchemaSource::parse(CLIENT));
    harness.generate(&harness.context(), &request).await.unwrap();

    assert_eq!(harness.engine.merge_count(), 1);
    let call = harness.emitter.single_call();
    assert_eq!(type_names(&call.context), vec!["Local", "Query"]);
    assert_eq!(members(&call.context, "Query"), vec!["a", "b"]);
}

#[tokio::test]
async fn test_both_schema_failures_reported() {
    let harness = Harness::new();
    let mut request = harness.request();
    request.client_schema = Some(SchemaSource::parse(CLIENT));

    let err = harness
        .generate(&harness.context(), &request)
        .await
        .unwrap_err();
    match err {
        GenerateError::SchemaLoadMany(errors) => {
            assert_eq!(errors.len(), 2);
            assert!(matches!(
                errors[0],
                GenerateError::SchemaLoad {
                    role: SchemaRole::Primary,
                    ..
                }
            ));
            assert!(matches!(
                errors[1],
                GenerateError::SchemaLoad {
                    role: SchemaRole::Client,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(harness.fetcher.fetch_count(), 2);
    assert!(harness.emitter.calls().is_empty());
}

#[tokio::test]
async fn test_client_schema_failure_names_client() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    let mut request = harness.request();
    request.client_schema = Some(SchemaSource::parse(CLIENT));

    let err = harness
        .generate(&harness.context(), &request)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GenerateError::SchemaLoad {
            role: SchemaRole::Client,
            ref location,
            ..
        } if location == CLIENT
    ));
    assert!(err.to_string().contains("Failed to load client schema"));
}

fn register_extensions(harness: &Harness, add_to_schema: serde_json::Value) {
    harness.registry.register_package(
        "extending",
        generator_with(GeneratorConfig {
            add_to_schema: Some(add_to_schema),
            ..Default::default()
        }),
    );
}

#[tokio::test]
async fn test_extensions_apply_in_order() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    register_extensions(
        &harness,
        json!([
            "type Extra { e }",
            "extend type Extra { f }",
            { "name": "Query", "fields": ["z"], "extend": true }
        ]),
    );
    let mut request = harness.request();
    request.template = Some("extending".to_string());

    harness.generate(&harness.context(), &request).await.unwrap();
    let call = harness.emitter.single_call();
    assert_eq!(members(&call.context, "Extra"), vec!["e", "f"]);
    assert_eq!(members(&call.context, "Query"), vec!["a", "z"]);
}

#[tokio::test]
async fn test_extension_order_is_significant() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    register_extensions(&harness, json!(["extend type Extra { f }", "type Extra { e }"]));
    let mut request = harness.request();
    request.template = Some("extending".to_string());

    let err = harness
        .generate(&harness.context(), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::Engine(EngineError::Extend(_))));
    assert!(harness.emitter.calls().is_empty());
}

#[tokio::test]
async fn test_bare_string_extension_is_a_singleton() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    register_extensions(&harness, json!("extend type Query { added }"));
    let mut request = harness.request();
    request.template = Some("extending".to_string());

    harness.generate(&harness.context(), &request).await.unwrap();
    let call = harness.emitter.single_call();
    assert_eq!(members(&call.context, "Query"), vec!["a", "added"]);
}

#[tokio::test]
async fn test_invalid_document_reported_once() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness.write("ops/good.graphql", "query Good { a }");
    let bad = harness.write("ops/bad.graphql", "query Bad { a missing other }");

    let mut request = harness.request();
    request.documents = vec!["ops/*.graphql".to_string()];
    let err = harness
        .generate(&harness.context(), &request)
        .await
        .unwrap_err();

    match err {
        GenerateError::DocumentValidation(report) => {
            assert_eq!(report.entries.len(), 1);
            assert_eq!(report.entries[0].file_path, bad);
            assert_eq!(
                report.entries[0].errors,
                vec![
                    "Cannot query field \"missing\" on type \"Query\".".to_string(),
                    "Cannot query field \"other\" on type \"Query\".".to_string(),
                ]
            );
            assert!(report.to_string().starts_with("Found 2 errors in 1 documents"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(harness.emitter.calls().is_empty());
}

#[tokio::test]
async fn test_watch_mode_reports_and_continues() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness.write("ops/bad.graphql", "query Bad { missing }");

    let mut ctx = harness.context();
    ctx.watch = true;
    let mut request = harness.request();
    request.documents = vec!["ops/*.graphql".to_string()];

    harness.generate(&ctx, &request).await.unwrap();
    let call = harness.emitter.single_call();
    assert_eq!(call.documents.len(), 1);
    assert_eq!(call.documents[0].operations[0].name, "Bad");
}

#[tokio::test]
async fn test_watch_mode_reports_failures_even_when_silent() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness.write("ops/bad.graphql", "query Bad { missing }");

    let mut ctx = harness.context();
    ctx.watch = true;
    ctx.silent = true;
    let mut request = harness.request();
    request.documents = vec!["ops/*.graphql".to_string()];

    let logs = CapturedLogs::default();
    let _guard = logs.install();
    harness.generate(&ctx, &request).await.unwrap();

    let output = logs.contents();
    assert!(output.contains("ERROR"), "no error logged: {}", output);
    assert!(output.contains("Found 1 errors in 1 documents"), "{}", output);
    assert!(output.contains("Watcher will try to continue."), "{}", output);
    assert!(!output.contains("Generating output"), "silent run logged progress: {}", output);
    assert_eq!(harness.emitter.calls().len(), 1);
}

#[tokio::test]
async fn test_documents_load_when_working_dir_has_glob_characters() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness.write("proj[1]/ops/bad.graphql", "query Bad { missing }");

    let ctx = RunContext::new(harness.root().join("proj[1]"));
    let mut request = harness.request();
    request.documents = vec!["ops/*.graphql".to_string()];

    let err = harness.generate(&ctx, &request).await.unwrap_err();
    match err {
        GenerateError::DocumentValidation(report) => {
            assert_eq!(report.entries.len(), 1);
            assert!(report.entries[0].file_path.ends_with("ops/bad.graphql"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(harness.emitter.calls().is_empty());
}

#[tokio::test]
async fn test_no_documents_still_emits() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness
        .emitter
        .respond_with(vec![FileOutput::new("schema.ts", "export {}")]);

    let files = harness
        .generate(&harness.context(), &harness.request())
        .await
        .unwrap();

    assert_eq!(files, vec![FileOutput::new("schema.ts", "export {}")]);
    assert_eq!(harness.engine.transform_count(), 0);
    let call = harness.emitter.single_call();
    assert_eq!(call.documents, vec![DocumentCollection::default()]);
}

#[tokio::test]
async fn test_valid_documents_are_transformed() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a b }");
    harness.write("ops/a.graphql", "query First { a }");
    harness.write("ops/b.graphql", "query Second { b }");

    let mut request = harness.request();
    request.documents = vec!["ops/*.graphql".to_string()];
    harness.generate(&harness.context(), &request).await.unwrap();

    assert_eq!(harness.engine.transform_count(), 1);
    let call = harness.emitter.single_call();
    let names: Vec<_> = call.documents[0]
        .operations
        .iter()
        .map(|op| op.name.as_str())
        .collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[tokio::test]
async fn test_unparseable_document_is_load_error() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness.write("ops/broken.graphql", "mutation { a }");

    let mut request = harness.request();
    request.documents = vec!["ops/broken.graphql".to_string()];
    let err = harness
        .generate(&harness.context(), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::DocumentLoad { .. }));
}

#[tokio::test]
async fn test_skip_flags_reach_emitter() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    let mut request = harness.request();
    request.skip_schema = true;

    harness.generate(&harness.context(), &request).await.unwrap();
    assert_eq!(
        harness.emitter.single_call().flags,
        EmitFlags {
            generate_schema: false,
            generate_documents: true,
        }
    );
}

#[tokio::test]
async fn test_emitter_failure_names_template() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness.emitter.fail_with("template exploded");

    let err = harness
        .generate(&harness.context(), &harness.request())
        .await
        .unwrap_err();
    match err {
        GenerateError::Emitter { template, message } => {
            assert_eq!(template, "ts");
            assert!(message.contains("template exploded"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_unknown_template_fails_before_fetch() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    let mut request = harness.request();
    request.template = Some("not-installed".to_string());

    let err = harness
        .generate(&harness.context(), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::TemplateResolution { .. }));
    assert_eq!(harness.fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_project_mode_requires_config_before_fetch() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness.write("templates/index.hbs", "{{#each types}}{{name}}{{/each}}");
    let mut request = harness.request();
    request.template = None;
    request.project = Some(PathBuf::from("templates"));

    let err = harness
        .generate(&harness.context(), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::ProjectConfigMissing { .. }));
    assert_eq!(harness.fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_project_mode_scans_templates() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    harness.write("templates/index.hbs", "{{#each types}}{{name}}{{/each}}");
    harness.write("templates/notes.md", "ignored");
    let mut request = harness.request();
    request.template = None;
    request.project = Some(PathBuf::from("templates"));
    request.project_config = Some(Default::default());

    harness.generate(&harness.context(), &request).await.unwrap();
    let config = harness.emitter.single_call().config.unwrap();
    assert_eq!(config.input_type, graphgen::types::InputType::Project);
    assert!(config.flatten_types);
    assert_eq!(config.templates.len(), 1);
}

#[tokio::test]
async fn test_missing_preload_module_fails() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a }");
    let mut request = harness.request();
    request.preload = vec!["not-a-module".to_string()];

    let err = harness
        .generate(&harness.context(), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::Preload { ref name, .. } if name == "not-a-module"));

    harness
        .registry
        .register_package("not-a-module", LoadedModule::default());
    harness
        .generate(&harness.context(), &request)
        .await
        .unwrap();
}

struct TypeListProcessor;

#[async_trait]
impl CustomProcessor for TypeListProcessor {
    async fn process(
        &self,
        context: &SchemaContext,
        _documents: &[DocumentCollection],
        _flags: EmitFlags,
    ) -> Result<Vec<FileOutput>, BoxError> {
        Ok(vec![FileOutput::new("types.txt", type_names(context).join(","))])
    }
}

struct UnusedRenderer;

#[async_trait]
impl Emitter for UnusedRenderer {
    async fn emit(
        &self,
        _template: &ResolvedTemplate,
        _context: &SchemaContext,
        _documents: &[DocumentCollection],
        _flags: EmitFlags,
    ) -> Result<Vec<FileOutput>, BoxError> {
        Err("renderer should not run for processors".into())
    }
}

#[tokio::test]
async fn test_processor_template_runs_directly() {
    let harness = Harness::new();
    harness.fetcher.insert_sdl(PRIMARY, "type Query { a } type User { id }");
    harness.registry.register_package(
        "list-types",
        LoadedModule::processor(Arc::new(TypeListProcessor)),
    );

    let orchestrator = GenerationOrchestrator::new(
        harness.engine.clone(),
        Arc::new(ProcessorDispatch::new(UnusedRenderer)),
    )
    .with_fetcher(harness.fetcher.clone())
    .with_module_loader(harness.registry.clone());

    let mut request = harness.request();
    request.template = Some("list-types".to_string());
    let files = orchestrator
        .generate(&harness.context(), &request)
        .await
        .unwrap();
    assert_eq!(files, vec![FileOutput::new("types.txt", "Query,User")]);
}
