//! Contract for the schema language engine.
//!
//! The engine owns parsing and type-checking of the schema description language. The
//! pipeline only sequences its operations; it never inspects schemas or documents.

use crate::documents::DocumentFile;
use crate::error::EngineError;
use crate::schema::source::RawSchema;
use crate::types::{DocumentCollection, SchemaContext};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

pub trait SchemaEngine: Send + Sync + 'static {
    /// An executable schema
    type Schema: Send + Sync + 'static;
    /// A parsed schema extension fragment
    type Extension: Send + Sync;
    /// A parsed operation document
    type Document: Send + Sync;

    /// Build a schema from fetched source
    fn build_schema(&self, raw: RawSchema) -> Result<Self::Schema, EngineError>;

    /// Merge type definitions and rebuild an executable schema that tolerates
    /// missing resolvers
    fn merge(&self, schemas: &[Arc<Self::Schema>]) -> Result<Self::Schema, EngineError>;

    fn parse_extension(&self, sdl: &str) -> Result<Self::Extension, EngineError>;

    /// Accept an already-parsed extension (e.g. an AST literal from a manifest)
    fn adopt_extension(&self, value: &Value) -> Result<Self::Extension, EngineError>;

    fn extend(
        &self,
        schema: &Self::Schema,
        extension: &Self::Extension,
    ) -> Result<Self::Schema, EngineError>;

    fn parse_document(&self, origin: &Path, text: &str) -> Result<Self::Document, EngineError>;

    /// Validation messages in engine order; empty when the document is valid
    fn validate(&self, schema: &Self::Schema, document: &Self::Document) -> Vec<String>;

    fn build_context(&self, schema: &Self::Schema) -> Result<SchemaContext, EngineError>;

    fn transform_documents(
        &self,
        schema: &Self::Schema,
        documents: &[DocumentFile<Self::Document>],
    ) -> Result<DocumentCollection, EngineError>;

    fn print_schema(&self, schema: &Self::Schema) -> String;
}
