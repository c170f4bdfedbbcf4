//! Schema sources and the default fetcher (local files, globs, remote introspection).

use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Where a schema description lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Url(String),
    Glob(String),
    Path(PathBuf),
}

impl SchemaSource {
    /// Classify a user-supplied source string
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            SchemaSource::Url(raw.to_string())
        } else if raw.contains(['*', '?', '[']) {
            SchemaSource::Glob(raw.to_string())
        } else {
            SchemaSource::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Url(url) => write!(f, "{}", url),
            SchemaSource::Glob(pattern) => write!(f, "{}", pattern),
            SchemaSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Schema material as retrieved, before the engine builds it
#[derive(Debug, Clone, PartialEq)]
pub enum RawSchema {
    Sdl { origin: String, text: String },
    Introspection { origin: String, data: Value },
}

impl RawSchema {
    pub fn origin(&self) -> &str {
        match self {
            RawSchema::Sdl { origin, .. } | RawSchema::Introspection { origin, .. } => origin,
        }
    }
}

/// Per-run retrieval options, passed explicitly down to the fetcher
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Directory relative paths and globs are resolved against
    pub base_dir: PathBuf,
    /// Extra request headers for remote retrieval
    pub headers: Vec<(String, String)>,
    /// Accept invalid TLS certificates for this run's requests only
    pub skip_ssl_validation: bool,
    pub timeout: Duration,
    pub user_agent: String,
}

impl LoadOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            headers: Vec::new(),
            skip_ssl_validation: false,
            timeout: Duration::from_secs(30),
            user_agent: concat!("graphgen/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Parse a `"Name: value"` header argument
pub fn parse_header(raw: &str) -> Result<(String, String), FetchError> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| FetchError::InvalidHeader(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(FetchError::InvalidHeader(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Retrieves raw schema material for a source
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(
        &self,
        source: &SchemaSource,
        options: &LoadOptions,
    ) -> Result<RawSchema, FetchError>;
}

pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types { ...FullType }
    directives {
      name
      description
      locations
      args { ...InputValue }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args { ...InputValue }
    type { ...TypeRef }
    isDeprecated
    deprecationReason
  }
  inputFields { ...InputValue }
  interfaces { ...TypeRef }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes { ...TypeRef }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType { kind name ofType { kind name ofType { kind name ofType { kind name } } } }
      }
    }
  }
}"#;

/// Filesystem and HTTP fetcher
#[derive(Debug, Clone, Default)]
pub struct DefaultSourceFetcher;

impl DefaultSourceFetcher {
    pub fn new() -> Self {
        Self
    }

    async fn fetch_url(&self, url: &str, options: &LoadOptions) -> Result<RawSchema, FetchError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(options.skip_ssl_validation)
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let mut request = client
            .post(url)
            .json(&json!({ "query": INTROSPECTION_QUERY }));
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!(url, headers = options.headers.len(), "Requesting schema introspection");
        let response = request.send().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;
        let data = introspection_data(url, body)?;
        Ok(RawSchema::Introspection {
            origin: url.to_string(),
            data,
        })
    }

    async fn fetch_path(&self, path: &Path) -> Result<RawSchema, FetchError> {
        let text = read_file(path).await?;
        let origin = path.display().to_string();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            let body: Value =
                serde_json::from_str(&text).map_err(|e| FetchError::InvalidIntrospection {
                    origin: origin.clone(),
                    message: e.to_string(),
                })?;
            let data = introspection_data(&origin, body)?;
            return Ok(RawSchema::Introspection { origin, data });
        }
        Ok(RawSchema::Sdl { origin, text })
    }

    async fn fetch_glob(&self, pattern: &str, base_dir: &Path) -> Result<RawSchema, FetchError> {
        let files = expand_glob(pattern, base_dir)?;
        if files.is_empty() {
            return Err(FetchError::NoMatch(pattern.to_string()));
        }
        let mut parts = Vec::with_capacity(files.len());
        for file in &files {
            parts.push(read_file(file).await?);
        }
        debug!(pattern, files = files.len(), "Concatenated schema files");
        Ok(RawSchema::Sdl {
            origin: pattern.to_string(),
            text: parts.join("\n"),
        })
    }
}

#[async_trait]
impl SourceFetcher for DefaultSourceFetcher {
    async fn fetch(
        &self,
        source: &SchemaSource,
        options: &LoadOptions,
    ) -> Result<RawSchema, FetchError> {
        match source {
            SchemaSource::Url(url) => self.fetch_url(url, options).await,
            SchemaSource::Path(path) => self.fetch_path(&options.base_dir.join(path)).await,
            SchemaSource::Glob(pattern) => self.fetch_glob(pattern, &options.base_dir).await,
        }
    }
}

/// Expand a glob relative to `base_dir`; results are sorted and unique
pub fn expand_glob(pattern: &str, base_dir: &Path) -> Result<Vec<PathBuf>, FetchError> {
    // the base directory is literal text, only the caller's pattern may hold wildcards
    let full = if Path::new(pattern).is_absolute() || base_dir.as_os_str().is_empty() {
        pattern.to_string()
    } else {
        let base = glob::Pattern::escape(&base_dir.to_string_lossy());
        let base = base.trim_end_matches(['/', std::path::MAIN_SEPARATOR]);
        format!("{}{}{}", base, std::path::MAIN_SEPARATOR, pattern)
    };
    let entries = glob::glob(&full).map_err(|e| FetchError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut files = BTreeSet::new();
    for entry in entries {
        let path = entry.map_err(|e| FetchError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        if path.is_file() {
            files.insert(path);
        }
    }
    Ok(files.into_iter().collect())
}

async fn read_file(path: &Path) -> Result<String, FetchError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Accept `{"data": {"__schema": ..}}` or a bare `{"__schema": ..}`
fn introspection_data(origin: &str, body: Value) -> Result<Value, FetchError> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string())
                })
                .collect();
            return Err(FetchError::InvalidIntrospection {
                origin: origin.to_string(),
                message: messages.join("; "),
            });
        }
    }

    let data = match body.get("data") {
        Some(data) => data.clone(),
        None => body,
    };
    if data.get("__schema").is_none() {
        return Err(FetchError::InvalidIntrospection {
            origin: origin.to_string(),
            message: "missing __schema".to_string(),
        });
    }
    Ok(data)
}
