//! Error types for the graphgen generation pipeline.

use crate::documents::DocumentValidationReport;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used at the seams to external collaborators (emitters, module loaders)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which of the two schema inputs a load failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaRole {
    Primary,
    Client,
}

impl fmt::Display for SchemaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaRole::Primary => write!(f, "schema"),
            SchemaRole::Client => write!(f, "client schema"),
        }
    }
}

/// Failures reported by a schema engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Parse error in {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Schema build failed: {0}")]
    Build(String),

    #[error("Schema merge failed: {0}")]
    Merge(String),

    #[error("Schema extension failed: {0}")]
    Extend(String),

    #[error("Context build failed: {0}")]
    Context(String),

    #[error("Document transform failed: {0}")]
    Transform(String),
}

/// Failures while retrieving raw schema sources
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Invalid introspection result from {origin}: {message}")]
    InvalidIntrospection { origin: String, message: String },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("No files match '{0}'")]
    NoMatch(String),

    #[error("Invalid header '{0}' (expected \"Name: value\")")]
    InvalidHeader(String),
}

/// Underlying cause of a schema load failure
#[derive(Debug, Error)]
pub enum SchemaLoadCause {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Shown when a template cannot be found by path or package name
pub const INSTALL_INSTRUCTIONS: &str = "Make sure the template is installed or registered \
with the module registry, or pass a path to a template manifest \
(e.g. ./templates/my-template.json).";

/// Uniform error shape surfaced by a generation run.
///
/// Display output is the human-readable, possibly multi-line message; wrapped errors are
/// reachable through `source()`.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Invalid options: {0}")]
    OptionValidation(String),

    #[error("Unable to find template plugin matching '{specifier}'\n{instructions}")]
    TemplateResolution {
        specifier: String,
        instructions: String,
    },

    #[error("Template '{specifier}' has an unsupported export: expected a generator config or a processing function, found {found}")]
    TemplateShape { specifier: String, found: String },

    #[error("Failed to scan {} for custom templates: {message}", path.display())]
    TemplateScan { path: PathBuf, message: String },

    #[error("Project mode requires a project config file, none found at {}", path.display())]
    ProjectConfigMissing { path: PathBuf },

    #[error("Failed to read project config {}: {message}", path.display())]
    ProjectConfig { path: PathBuf, message: String },

    #[error("Custom helper '{name}' ({}) {reason}", path.display())]
    CustomHelper {
        name: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Failed to preload module '{name}': {message}")]
    Preload { name: String, message: String },

    #[error("Failed to load {role} from {location}:\n{cause}")]
    SchemaLoad {
        role: SchemaRole,
        location: String,
        #[source]
        cause: SchemaLoadCause,
    },

    #[error("{}", join_messages(.0))]
    SchemaLoadMany(Vec<GenerateError>),

    #[error("Schema engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Failed to load document {}: {message}", path.display())]
    DocumentLoad { path: PathBuf, message: String },

    #[error("{0}")]
    DocumentValidation(DocumentValidationReport),

    #[error("Error while generating code with template '{template}':\n{message}")]
    Emitter { template: String, message: String },

    #[error("Failed to write output {}: {message}", path.display())]
    OutputWrite { path: PathBuf, message: String },

    #[error("Settings error: {0}")]
    Settings(String),
}

fn join_messages(errors: &[GenerateError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl GenerateError {
    pub fn is_document_validation(&self) -> bool {
        matches!(self, GenerateError::DocumentValidation(_))
    }

    /// Process exit status for a fatal run
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl From<config::ConfigError> for GenerateError {
    fn from(err: config::ConfigError) -> Self {
        GenerateError::Settings(err.to_string())
    }
}
