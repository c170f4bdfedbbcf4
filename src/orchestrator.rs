//! Generation Orchestrator
//!
//! Single entry point for a generation run: resolve the template, layer the config, build
//! the canonical schema, validate documents, and call the emitter. Each run builds its own
//! state from its inputs; nothing is shared between runs.

use crate::documents::{
    parse_documents, validate_documents, DocumentSource, DocumentValidationReport,
    GlobDocumentSource,
};
use crate::emitter::Emitter;
use crate::error::GenerateError;
use crate::layers::{layer_generator_config, normalize_extensions, ConfigLayers};
use crate::project_config::ProjectConfigFile;
use crate::schema::engine::SchemaEngine;
use crate::schema::loader::build_canonical_schema;
use crate::schema::source::{DefaultSourceFetcher, LoadOptions, SchemaSource, SourceFetcher};
use crate::template::{
    resolve_project, ModuleLoader, ResolvedTemplate, TemplateRegistry, TemplateResolver,
    TemplateScanner, WalkdirScanner,
};
use crate::types::{ConfigMap, DocumentCollection, EmitFlags, FileOutput};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Variable whose presence turns on canonical schema dumping
pub const VERBOSE_ENV: &str = "VERBOSE";

/// Per-run switches, passed explicitly instead of read from process state
#[derive(Debug, Clone)]
pub struct RunContext {
    pub working_dir: PathBuf,
    pub load_options: LoadOptions,
    /// Log the printed canonical schema
    pub dump_schema: bool,
    /// Suppress informational reports
    pub silent: bool,
    /// Report document validation failures and keep going
    pub watch: bool,
}

impl RunContext {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            load_options: LoadOptions::new(working_dir.clone()),
            working_dir,
            dump_schema: false,
            silent: false,
            watch: false,
        }
    }

    /// Pick up env-driven switches from an explicit set of variables
    pub fn with_env<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.dump_schema = vars.into_iter().any(|(name, _)| name == VERBOSE_ENV);
        self
    }
}

/// What a run should generate
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub template: Option<String>,
    pub project: Option<PathBuf>,
    /// Already loaded project config, if one was found
    pub project_config: Option<ProjectConfigFile>,
    /// Where the project config was looked for
    pub config_path: PathBuf,
    pub schema: SchemaSource,
    pub client_schema: Option<SchemaSource>,
    pub documents: Vec<String>,
    pub overrides: ConfigMap,
    pub env_overrides: ConfigMap,
    pub skip_schema: bool,
    pub skip_documents: bool,
    pub preload: Vec<String>,
}

impl GenerationRequest {
    pub fn new(schema: SchemaSource, template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            project: None,
            project_config: None,
            config_path: PathBuf::from(crate::project_config::DEFAULT_CONFIG_FILE),
            schema,
            client_schema: None,
            documents: Vec::new(),
            overrides: ConfigMap::new(),
            env_overrides: ConfigMap::new(),
            skip_schema: false,
            skip_documents: false,
            preload: Vec::new(),
        }
    }

    fn project_dir(&self) -> Option<&PathBuf> {
        self.project
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Name used in emitter error messages
    pub fn template_name(&self) -> String {
        match (&self.template, self.project_dir()) {
            (_, Some(project)) => project.display().to_string(),
            (Some(template), None) => template.clone(),
            (None, None) => String::new(),
        }
    }

    pub fn flags(&self) -> EmitFlags {
        EmitFlags {
            generate_schema: !self.skip_schema,
            generate_documents: !self.skip_documents,
        }
    }
}

pub struct GenerationOrchestrator<E: SchemaEngine> {
    engine: Arc<E>,
    emitter: Arc<dyn Emitter>,
    fetcher: Arc<dyn SourceFetcher>,
    document_source: Arc<dyn DocumentSource>,
    modules: Arc<dyn ModuleLoader>,
    scanner: Arc<dyn TemplateScanner>,
}

impl<E: SchemaEngine> GenerationOrchestrator<E> {
    pub fn new(engine: Arc<E>, emitter: Arc<dyn Emitter>) -> Self {
        Self {
            engine,
            emitter,
            fetcher: Arc::new(DefaultSourceFetcher::new()),
            document_source: Arc::new(GlobDocumentSource),
            modules: Arc::new(TemplateRegistry::new()),
            scanner: Arc::new(WalkdirScanner::default()),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn SourceFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_document_source(mut self, source: Arc<dyn DocumentSource>) -> Self {
        self.document_source = source;
        self
    }

    pub fn with_module_loader(mut self, modules: Arc<dyn ModuleLoader>) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn TemplateScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn preload(&self, names: &[String]) -> Result<(), GenerateError> {
        for name in names {
            let loaded = self
                .modules
                .load_package(name)
                .map_err(|e| GenerateError::Preload {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            if loaded.is_none() {
                return Err(GenerateError::Preload {
                    name: name.clone(),
                    message: "module not found".to_string(),
                });
            }
            debug!(module = %name, "Preloaded module");
        }
        Ok(())
    }

    /// Resolve and layer the template for this run
    pub fn resolve_template(
        &self,
        ctx: &RunContext,
        request: &GenerationRequest,
    ) -> Result<ResolvedTemplate, GenerateError> {
        let resolved = match request.project_dir() {
            Some(project) => ResolvedTemplate::Config(resolve_project(
                self.modules.as_ref(),
                self.scanner.as_ref(),
                &ctx.working_dir,
                project,
                request.project_config.as_ref(),
                &ctx.working_dir.join(&request.config_path),
            )?),
            None => {
                let specifier = request.template.as_deref().unwrap_or_default();
                TemplateResolver::new(self.modules.as_ref(), &ctx.working_dir)
                    .resolve(specifier)?
            }
        };

        Ok(match resolved {
            ResolvedTemplate::Config(base) => {
                let layers = ConfigLayers::new(
                    request.project_config.as_ref(),
                    request.overrides.clone(),
                    request.env_overrides.clone(),
                );
                ResolvedTemplate::Config(layer_generator_config(
                    base,
                    request.project_config.as_ref(),
                    &layers,
                ))
            }
            processor @ ResolvedTemplate::Processor(_) => processor,
        })
    }

    /// Run the pipeline up to and including the emitter call
    pub async fn generate(
        &self,
        ctx: &RunContext,
        request: &GenerationRequest,
    ) -> Result<Vec<FileOutput>, GenerateError> {
        self.preload(&request.preload)?;

        let template = self.resolve_template(ctx, request)?;
        let extensions = normalize_extensions(
            self.engine.as_ref(),
            template
                .generator_config()
                .and_then(|c| c.add_to_schema.as_ref()),
        )?;

        let schema = build_canonical_schema(
            self.engine.as_ref(),
            self.fetcher.as_ref(),
            &request.schema,
            request.client_schema.as_ref(),
            &extensions,
            &ctx.load_options,
            ctx.dump_schema,
        )
        .await?;

        let context = self.engine.build_context(&schema)?;

        let texts = self
            .document_source
            .load(&request.documents, &ctx.working_dir)
            .await?;
        let documents = parse_documents(self.engine.as_ref(), texts)?;

        let failures = validate_documents(self.engine.as_ref(), &schema, &documents);
        if !failures.is_empty() {
            let report = DocumentValidationReport::new(failures);
            if !ctx.watch {
                return Err(GenerateError::DocumentValidation(report));
            }
            // silent mutes progress reports only, never validation failures
            error!(
                errors = report.total_errors(),
                files = report.entries.len(),
                "{}\nWatcher will try to continue.",
                report
            );
        }

        let collection = if documents.is_empty() {
            DocumentCollection::default()
        } else {
            self.engine.transform_documents(&schema, &documents)?
        };

        let template_name = request.template_name();
        if !ctx.silent {
            info!(
                template = %template_name,
                documents = documents.len(),
                "Generating output"
            );
        }
        let files = self
            .emitter
            .emit(&template, &context, &[collection], request.flags())
            .await
            .map_err(|e| GenerateError::Emitter {
                template: template_name.clone(),
                message: e.to_string(),
            })?;

        if files.is_empty() {
            warn!(template = %template_name, "Template produced no files");
        }
        Ok(files)
    }
}
