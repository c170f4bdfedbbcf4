//! Invocation surface
//!
//! The plain-struct form of a generation command. `run` validates it, builds the per-run
//! context, and composes the orchestrator with output normalization and persistence.

use crate::error::GenerateError;
use crate::layers::env_overrides;
use crate::orchestrator::{GenerationOrchestrator, GenerationRequest, RunContext};
use crate::output::normalize_outputs;
use crate::persist::{write_outputs, WriteSummary};
use crate::project_config::{load_project_config, DEFAULT_CONFIG_FILE};
use crate::schema::engine::SchemaEngine;
use crate::schema::source::{parse_header, LoadOptions, SchemaSource};
use crate::settings::Settings;
use crate::types::ConfigMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct Invocation {
    pub schema: Option<String>,
    pub client_schema: Option<String>,
    pub template: Option<String>,
    pub project: Option<PathBuf>,
    /// Project config path, relative to the working directory
    pub config_file: PathBuf,
    /// Output target: a file, or a directory when it exists as one or ends in a separator
    pub out: String,
    pub documents: Vec<String>,
    pub skip_schema: bool,
    pub skip_documents: bool,
    pub overwrite: bool,
    pub watch: bool,
    pub silent: bool,
    pub preload: Vec<String>,
    /// Extra `"Name: value"` headers for remote schema requests
    pub headers: Vec<String>,
    pub skip_ssl_validation: bool,
    pub overrides: ConfigMap,
    /// When false, fatal errors are reported but the caller keeps running
    pub exit_on_error: bool,
}

impl Default for Invocation {
    fn default() -> Self {
        Self {
            schema: None,
            client_schema: None,
            template: None,
            project: None,
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            out: ".".to_string(),
            documents: Vec::new(),
            skip_schema: false,
            skip_documents: false,
            overwrite: false,
            watch: false,
            silent: false,
            preload: Vec::new(),
            headers: Vec::new(),
            skip_ssl_validation: false,
            overrides: ConfigMap::new(),
            exit_on_error: true,
        }
    }
}

impl Invocation {
    /// Apply tool settings beneath explicit invocation values
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        let defaults = Invocation::default();
        if self.config_file == defaults.config_file {
            self.config_file = settings.defaults.config_file.clone();
        }
        if self.out == defaults.out {
            self.out = settings.defaults.out.clone();
        }
        self
    }

    fn has_project(&self) -> bool {
        self.project
            .as_ref()
            .is_some_and(|p| !p.as_os_str().is_empty())
    }

    /// Check required options and parse headers
    pub fn validate(&self) -> Result<Vec<(String, String)>, GenerateError> {
        if self.schema.as_deref().map_or(true, str::is_empty) {
            return Err(GenerateError::OptionValidation(
                "a schema source is required".to_string(),
            ));
        }
        if !self.has_project() && self.template.as_deref().map_or(true, str::is_empty) {
            return Err(GenerateError::OptionValidation(
                "a template is required unless a project path is given".to_string(),
            ));
        }
        self.headers
            .iter()
            .map(|raw| {
                parse_header(raw).map_err(|e| GenerateError::OptionValidation(e.to_string()))
            })
            .collect()
    }

    fn request(
        &self,
        working_dir: &Path,
        env_vars: &[(String, String)],
    ) -> Result<GenerationRequest, GenerateError> {
        let config_path = working_dir.join(&self.config_file);
        let project_config = load_project_config(&config_path)?;
        let schema = SchemaSource::parse(self.schema.as_deref().unwrap_or_default());

        Ok(GenerationRequest {
            template: self.template.clone(),
            project: self.project.clone(),
            project_config,
            config_path: self.config_file.clone(),
            schema,
            client_schema: self.client_schema.as_deref().map(SchemaSource::parse),
            documents: self.documents.clone(),
            overrides: self.overrides.clone(),
            env_overrides: env_overrides(env_vars.iter().cloned()),
            skip_schema: self.skip_schema,
            skip_documents: self.skip_documents,
            preload: self.preload.clone(),
        })
    }

    fn context(
        &self,
        working_dir: &Path,
        headers: Vec<(String, String)>,
        settings: &Settings,
        env_vars: &[(String, String)],
    ) -> RunContext {
        let mut ctx = RunContext::new(working_dir).with_env(env_vars.iter().cloned());
        ctx.silent = self.silent;
        ctx.watch = self.watch;
        ctx.load_options = LoadOptions {
            headers,
            skip_ssl_validation: self.skip_ssl_validation,
            timeout: Duration::from_secs(settings.http.timeout_secs),
            user_agent: settings.http.user_agent.clone(),
            ..LoadOptions::new(working_dir)
        };
        ctx
    }
}

/// Validate, generate, normalize and persist: one complete run
pub async fn run<E, I>(
    orchestrator: &GenerationOrchestrator<E>,
    invocation: &Invocation,
    settings: &Settings,
    working_dir: &Path,
    env_vars: I,
) -> Result<WriteSummary, GenerateError>
where
    E: SchemaEngine,
    I: IntoIterator<Item = (String, String)>,
{
    let env_vars: Vec<(String, String)> = env_vars.into_iter().collect();
    let headers = invocation.validate()?;
    let request = invocation.request(working_dir, &env_vars)?;
    let ctx = invocation.context(working_dir, headers, settings, &env_vars);

    let files = orchestrator.generate(&ctx, &request).await?;
    let files = normalize_outputs(files, &invocation.out, working_dir)?;
    let summary = write_outputs(&files, invocation.overwrite)?;

    if !invocation.silent {
        info!(
            written = summary.written.len(),
            skipped = summary.skipped.len(),
            "Generation complete"
        );
    }
    Ok(summary)
}

/// What the caller should do after a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Report and keep the process alive
    Report,
    Exit(i32),
}

impl ExitPolicy {
    pub fn from_error(err: &GenerateError, invocation: &Invocation) -> Self {
        if !invocation.exit_on_error || (invocation.watch && err.is_document_validation()) {
            ExitPolicy::Report
        } else {
            ExitPolicy::Exit(err.exit_code())
        }
    }
}

/// Log a failed run and decide whether to exit
pub fn report_error(err: &GenerateError, invocation: &Invocation) -> ExitPolicy {
    let policy = ExitPolicy::from_error(err, invocation);
    error!(exit = ?policy, "{}", err);
    policy
}
