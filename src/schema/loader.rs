//! Loading the primary and client schemas, merging and extending them.

use crate::error::{GenerateError, SchemaLoadCause, SchemaRole};
use crate::schema::engine::SchemaEngine;
use crate::schema::source::{LoadOptions, SchemaSource, SourceFetcher};
use std::sync::Arc;
use tracing::{debug, info};

/// Fetch one source and build it into a schema
pub async fn load_source<E: SchemaEngine>(
    engine: &E,
    fetcher: &dyn SourceFetcher,
    role: SchemaRole,
    source: &SchemaSource,
    options: &LoadOptions,
) -> Result<Arc<E::Schema>, GenerateError> {
    let to_error = |cause: SchemaLoadCause| GenerateError::SchemaLoad {
        role,
        location: source.to_string(),
        cause,
    };

    let raw = fetcher
        .fetch(source, options)
        .await
        .map_err(|e| to_error(e.into()))?;
    let origin = raw.origin().to_string();
    let schema = engine.build_schema(raw).map_err(|e| to_error(e.into()))?;
    debug!(%role, source = %source, origin, "Schema loaded");
    Ok(Arc::new(schema))
}

/// Load the primary and optional client schema concurrently.
///
/// Both loads settle before any failure is reported; when both fail, both are returned.
pub async fn load_schemas<E: SchemaEngine>(
    engine: &E,
    fetcher: &dyn SourceFetcher,
    primary: &SchemaSource,
    client: Option<&SchemaSource>,
    options: &LoadOptions,
) -> Result<Vec<Arc<E::Schema>>, GenerateError> {
    let primary_load = load_source(engine, fetcher, SchemaRole::Primary, primary, options);
    let client_load = async {
        match client {
            Some(source) => load_source(engine, fetcher, SchemaRole::Client, source, options)
                .await
                .map(Some),
            None => Ok(None),
        }
    };

    match futures::join!(primary_load, client_load) {
        (Ok(primary), Ok(client)) => Ok(std::iter::once(primary).chain(client).collect()),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        (Err(primary_err), Err(client_err)) => {
            Err(GenerateError::SchemaLoadMany(vec![primary_err, client_err]))
        }
    }
}

/// Collapse loaded schemas into the canonical one.
///
/// A single schema is returned as the same `Arc`; two or more are merged by the engine.
pub fn canonicalize<E: SchemaEngine>(
    engine: &E,
    mut schemas: Vec<Arc<E::Schema>>,
) -> Result<Arc<E::Schema>, GenerateError> {
    match schemas.len() {
        0 => Err(GenerateError::OptionValidation(
            "at least one schema source is required".to_string(),
        )),
        1 => Ok(schemas.remove(0)),
        count => {
            debug!(count, "Merging schemas");
            Ok(Arc::new(engine.merge(&schemas)?))
        }
    }
}

/// Fold extensions over the schema in order; an empty list returns the input unchanged
pub fn apply_extensions<E: SchemaEngine>(
    engine: &E,
    schema: Arc<E::Schema>,
    extensions: &[E::Extension],
) -> Result<Arc<E::Schema>, GenerateError> {
    extensions
        .iter()
        .try_fold(schema, |current, extension| {
            engine.extend(&current, extension).map(Arc::new)
        })
        .map_err(GenerateError::from)
}

/// Load, merge and extend: the full canonical schema step
pub async fn build_canonical_schema<E: SchemaEngine>(
    engine: &E,
    fetcher: &dyn SourceFetcher,
    primary: &SchemaSource,
    client: Option<&SchemaSource>,
    extensions: &[E::Extension],
    options: &LoadOptions,
    dump_schema: bool,
) -> Result<Arc<E::Schema>, GenerateError> {
    let loaded = load_schemas(engine, fetcher, primary, client, options).await?;
    let canonical = canonicalize(engine, loaded)?;
    let extended = apply_extensions(engine, canonical, extensions)?;
    if !extensions.is_empty() {
        debug!(extensions = extensions.len(), "Applied schema extensions");
    }
    if dump_schema {
        info!(schema = %engine.print_schema(&extended), "Canonical schema");
    }
    Ok(extended)
}
