//! Graphgen: Schema-Driven Code Generation
//!
//! Orchestrates a generation run: resolves a template, layers configuration, loads and
//! merges schemas, validates operation documents, calls an emitter, and maps the emitted
//! files onto disk. Schema parsing and template rendering are supplied by the caller
//! through the [`schema::SchemaEngine`] and [`emitter::Emitter`] traits.

pub mod documents;
pub mod emitter;
pub mod error;
pub mod invocation;
pub mod layers;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod persist;
pub mod project_config;
pub mod schema;
pub mod settings;
pub mod template;
pub mod types;

pub use error::{EngineError, FetchError, GenerateError};
pub use invocation::{run, ExitPolicy, Invocation};
pub use orchestrator::{GenerationOrchestrator, GenerationRequest, RunContext};
