//! Loading the schema the operations are generated from.

use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use graphql_introspect::{
    introspection_json_to_sdl, introspection_to_sdl, IntrospectionClient, IntrospectionError,
};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Endpoint answering the introspection query
    Url(String),
    /// Introspection result (`.json`) or SDL file
    File(PathBuf),
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Error)]
pub enum SchemaLoadError {
    #[error("failed to introspect {url}: {source}")]
    Introspection {
        url: String,
        #[source]
        source: IntrospectionError,
    },

    #[error("failed to read schema file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid introspection result: {source}", path.display())]
    IntrospectionFile {
        path: PathBuf,
        #[source]
        source: IntrospectionError,
    },

    #[error("schema from {origin} is invalid:\n{diagnostics}")]
    Invalid { origin: String, diagnostics: String },
}

/// Fetches or reads the schema and validates it.
#[tracing::instrument(skip(client), fields(source = %source))]
pub async fn load_schema(
    source: &SchemaSource,
    client: &IntrospectionClient,
) -> Result<Valid<Schema>, SchemaLoadError> {
    let (sdl, origin) = match source {
        SchemaSource::Url(url) => {
            let schema = client
                .execute(url)
                .await
                .map_err(|source| SchemaLoadError::Introspection {
                    url: url.clone(),
                    source,
                })?;
            (introspection_to_sdl(&schema), url.clone())
        }
        SchemaSource::File(path) => (read_schema_file(path).await?, path.display().to_string()),
    };

    tracing::debug!(sdl_length = sdl.len(), "Validating schema");
    let schema = Schema::parse_and_validate(sdl, &origin).map_err(|with_errors| {
        SchemaLoadError::Invalid {
            origin: origin.clone(),
            diagnostics: with_errors.errors.to_string(),
        }
    })?;
    tracing::info!(types = schema.types.len(), "Schema loaded");
    Ok(schema)
}

/// SDL from a file: converted when it holds introspection JSON, verbatim
/// otherwise.
async fn read_schema_file(path: &Path) -> Result<String, SchemaLoadError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SchemaLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    if is_json_file(path) {
        tracing::debug!("Converting introspection JSON to SDL");
        return introspection_json_to_sdl(&contents).map_err(|source| {
            SchemaLoadError::IntrospectionFile {
                path: path.to_path_buf(),
                source,
            }
        });
    }
    Ok(contents)
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INTROSPECTION: &str = r#"{"data": {"__schema": {
        "queryType": {"name": "Query"},
        "mutationType": null,
        "subscriptionType": null,
        "types": [{
            "kind": "OBJECT", "name": "Query", "interfaces": [],
            "fields": [{"name": "hello", "args": [], "isDeprecated": false,
                "deprecationReason": null,
                "type": {"kind": "SCALAR", "name": "String", "ofType": null}}]
        }]
    }}}"#;

    #[tokio::test]
    async fn test_load_sdl_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.graphql");
        std::fs::write(&path, "type Query { hello: String }").unwrap();

        let schema = load_schema(&SchemaSource::File(path), &IntrospectionClient::new())
            .await
            .unwrap();
        assert!(schema.get_object("Query").is_some());
    }

    #[tokio::test]
    async fn test_load_introspection_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.JSON");
        std::fs::write(&path, INTROSPECTION).unwrap();

        let schema = load_schema(&SchemaSource::File(path), &IntrospectionClient::new())
            .await
            .unwrap();
        let query = schema.get_object("Query").unwrap();
        assert!(query.fields.contains_key("hello"));
    }

    #[tokio::test]
    async fn test_invalid_sdl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.graphql");
        std::fs::write(&path, "type Query { user: User }").unwrap();

        let err = load_schema(&SchemaSource::File(path), &IntrospectionClient::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaLoadError::Invalid { .. }));
        assert!(err.to_string().contains("User"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.graphql");

        let err = load_schema(&SchemaSource::File(path.clone()), &IntrospectionClient::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaLoadError::Read { path: p, .. } if p == path));
    }

    #[tokio::test]
    async fn test_malformed_introspection_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, r#"{"data": null, "errors": [{"message": "nope"}]}"#).unwrap();

        let err = load_schema(&SchemaSource::File(path), &IntrospectionClient::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaLoadError::IntrospectionFile { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SchemaSource::Url("https://example.com/graphql".to_string()).to_string(),
            "https://example.com/graphql"
        );
        assert_eq!(
            SchemaSource::File(PathBuf::from("schema.graphql")).to_string(),
            "schema.graphql"
        );
    }
}
