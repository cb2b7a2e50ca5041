use crate::{ConfigError, OpgenConfig, Result, SchemaConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
pub const CONFIG_FILES: &[&str] = &[
    ".opgenrc.yml",
    ".opgenrc.yaml",
    ".opgenrc.json",
    "opgen.config.yml",
    "opgen.config.yaml",
    "opgen.config.json",
];

/// Finds a config file by walking up the directory tree from `start_dir`.
#[tracing::instrument(fields(start = %start_dir.display()))]
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current_dir = start_dir.to_path_buf();
    let mut checked_dirs = 0;

    loop {
        tracing::trace!(dir = %current_dir.display(), "Checking directory for config files");
        for file_name in CONFIG_FILES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                tracing::info!(path = %config_path.display(), checked_dirs, "Found config file");
                return Some(config_path);
            }
        }

        checked_dirs += 1;
        if !current_dir.pop() {
            tracing::debug!(checked_dirs, "No config file found");
            return None;
        }
    }
}

/// Loads the config at `path`, detecting the format from its extension.
/// Relative paths inside resolve against the file's directory.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<OpgenConfig> {
    tracing::debug!("Reading config file");
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = load_config_from_str(&contents, path)?;
    if let Some(dir) = path.parent() {
        config.resolve_relative_to(dir);
    }
    tracing::info!(
        output = config.output.is_some(),
        schema = config.schema.is_some(),
        "Config loaded successfully"
    );
    Ok(config)
}

/// Parses and validates config text. `path` picks the format and names the
/// file in errors; no paths are resolved.
#[tracing::instrument(skip(contents), fields(path = %path.display(), size = contents.len()))]
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<OpgenConfig> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    let config = match extension {
        "yml" | "yaml" => {
            tracing::trace!("Parsing as YAML");
            parse_yaml(contents, path)?
        }
        "json" => {
            tracing::trace!("Parsing as JSON");
            parse_json(contents, path)?
        }
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    validate_config(&config, path)?;
    Ok(config)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<OpgenConfig> {
    // An empty YAML document is an empty config.
    if contents.trim().is_empty() {
        return Ok(OpgenConfig::default());
    }
    serde_saphyr::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("YAML parse error: {e}"),
    })
}

fn parse_json(contents: &str, path: &Path) -> Result<OpgenConfig> {
    serde_json::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("JSON parse error: {e}"),
    })
}

#[tracing::instrument(skip(config, path), fields(path = %path.display()))]
fn validate_config(config: &OpgenConfig, path: &Path) -> Result<()> {
    let invalid = |message: &str| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    if config.output.as_ref().is_some_and(|o| o.as_os_str().is_empty()) {
        return Err(invalid("'output' must not be empty"));
    }

    match &config.schema {
        Some(SchemaConfig::Location(location)) if location.trim().is_empty() => {
            return Err(invalid("'schema' must not be empty"));
        }
        Some(SchemaConfig::Introspection(introspection)) if introspection.url.trim().is_empty() => {
            return Err(invalid("'schema.url' must not be empty"));
        }
        _ => {}
    }

    let generate = &config.generate;
    if generate.type_revisits == Some(0) {
        return Err(invalid("'generate.typeRevisits' must be at least 1"));
    }
    if generate.depth_limit == Some(0) {
        return Err(invalid("'generate.depthLimit' must be at least 1"));
    }

    let index = &generate.index;
    for (key, value) in [
        ("extension", &index.extension),
        ("loaderModule", &index.loader_module),
        ("loaderFunction", &index.loader_function),
    ] {
        if value.as_ref().is_some_and(|v| v.trim().is_empty()) {
            return Err(invalid(&format!("'generate.index.{key}' must not be empty")));
        }
    }

    tracing::debug!("Config validation passed");
    Ok(())
}
