use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Contents of an `.opgenrc` file. Every setting is optional; command-line
/// flags take precedence over what is set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OpgenConfig {
    /// Directory the generated documents are written to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaConfig>,

    #[serde(default)]
    pub generate: GenerateConfig,
}

/// Where the schema comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaConfig {
    /// Endpoint URL, introspection JSON file, or SDL file
    Location(String),
    /// Endpoint with request settings
    Introspection(IntrospectionSchemaConfig),
}

/// Configuration for introspecting a remote GraphQL endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IntrospectionSchemaConfig {
    pub url: String,

    /// HTTP headers sent with the introspection request
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Number of retry attempts on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<u32>,
}

impl SchemaConfig {
    /// The URL or file path.
    #[must_use]
    pub fn location(&self) -> &str {
        match self {
            Self::Location(location) => location,
            Self::Introspection(config) => &config.url,
        }
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        match self {
            Self::Introspection(_) => true,
            Self::Location(location) => is_url(location),
        }
    }

    #[must_use]
    pub const fn introspection_config(&self) -> Option<&IntrospectionSchemaConfig> {
        match self {
            Self::Introspection(config) => Some(config),
            Self::Location(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_revisits: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_limit: Option<usize>,

    /// Skip fields that fail instead of aborting the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_going: Option<bool>,

    #[serde(default)]
    pub index: IndexConfig,
}

/// Barrel file settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IndexConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub loader_module: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub loader_function: Option<String>,
}

impl OpgenConfig {
    /// Makes the output directory and a file schema location absolute
    /// against `base_dir`. URLs and absolute paths are left alone.
    pub fn resolve_relative_to(&mut self, base_dir: &Path) {
        if let Some(output) = self.output.as_mut() {
            if output.is_relative() {
                *output = base_dir.join(&*output);
            }
        }
        if let Some(SchemaConfig::Location(location)) = self.schema.as_mut() {
            if !is_url(location) && Path::new(location.as_str()).is_relative() {
                *location = base_dir.join(location.as_str()).to_string_lossy().into_owned();
            }
        }
    }
}

/// Whether a schema location is an HTTP(S) endpoint rather than a file.
#[must_use]
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}
