//! Schema Loading
//!
//! Retrieval of schema sources, the engine contract, and the merge/extension steps that
//! produce the canonical schema for a run.

pub mod engine;
pub mod loader;
pub mod source;

pub use engine::SchemaEngine;
pub use loader::{
    apply_extensions, build_canonical_schema, canonicalize, load_schemas, load_source,
};
pub use source::{
    parse_header, DefaultSourceFetcher, LoadOptions, RawSchema, SchemaSource, SourceFetcher,
};
