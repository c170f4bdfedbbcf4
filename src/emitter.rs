//! Emitter contract
//!
//! An emitter turns a resolved template, the schema context and the transformed documents
//! into generated files.

use crate::error::BoxError;
use crate::template::ResolvedTemplate;
use crate::types::{DocumentCollection, EmitFlags, FileOutput, SchemaContext};
use async_trait::async_trait;

#[async_trait]
pub trait Emitter: Send + Sync {
    async fn emit(
        &self,
        template: &ResolvedTemplate,
        context: &SchemaContext,
        documents: &[DocumentCollection],
        flags: EmitFlags,
    ) -> Result<Vec<FileOutput>, BoxError>;
}

/// Runs processor templates directly and hands generator configs to a renderer
pub struct ProcessorDispatch<R> {
    renderer: R,
}

impl<R: Emitter> ProcessorDispatch<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl<R: Emitter> Emitter for ProcessorDispatch<R> {
    async fn emit(
        &self,
        template: &ResolvedTemplate,
        context: &SchemaContext,
        documents: &[DocumentCollection],
        flags: EmitFlags,
    ) -> Result<Vec<FileOutput>, BoxError> {
        match template {
            ResolvedTemplate::Processor(processor) => {
                processor.process(context, documents, flags).await
            }
            ResolvedTemplate::Config(_) => {
                self.renderer.emit(template, context, documents, flags).await
            }
        }
    }
}
