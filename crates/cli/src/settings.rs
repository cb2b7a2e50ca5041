//! Command-line flags and their merge with the config file.

use crate::schema_source::SchemaSource;
use anyhow::{Context, Result};
use graphql_introspect::IntrospectionClient;
use graphql_opgen::{
    FailurePolicy, GenerateOptions, IndexStyle, SynthesisOptions, DEFAULT_DEPTH_LIMIT,
    DEFAULT_TYPE_REVISITS,
};
use graphql_opgen_config::{is_url, IndexConfig, OpgenConfig, SchemaConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Default timeout in seconds for introspection requests.
const DEFAULT_TIMEOUT: u64 = 30;

#[derive(Debug, Clone, Default, clap::Args)]
pub struct GenerateArgs {
    /// Directory to write the generated operations to (emptied first)
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// GraphQL endpoint to introspect
    #[arg(long, value_name = "URL", conflicts_with = "file")]
    pub url: Option<String>,

    /// Introspection result (.json) or SDL file
    #[arg(long, value_name = "FILE", conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// HTTP headers to include in the introspection request (can be specified multiple times)
    /// Format: "Header-Name: Header-Value"
    /// These are merged with headers from the config file (CLI takes precedence)
    #[arg(long = "header", short = 'H', value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Request timeout in seconds (overrides config file)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Number of retry attempts on failure (overrides config file)
    #[arg(long)]
    pub retry: Option<u32>,

    /// How often a type may repeat along one selection path before its
    /// fields are cut back to `id`
    #[arg(long, value_name = "N")]
    pub type_revisits: Option<usize>,

    /// Maximum selection depth of a generated operation
    #[arg(long, value_name = "N")]
    pub depth_limit: Option<usize>,

    /// Report fields that fail and keep generating the rest
    #[arg(long)]
    pub keep_going: bool,
}

/// Request settings for a URL schema source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrospectionSettings {
    pub headers: Vec<(String, String)>,
    pub timeout: u64,
    pub retry: u32,
}

impl IntrospectionSettings {
    #[must_use]
    pub fn client(&self) -> IntrospectionClient {
        IntrospectionClient::new()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_retries(self.retry)
            .with_headers(self.headers.iter().cloned())
    }
}

/// Everything a run needs, after flags and config are merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: SchemaSource,
    pub introspection: IntrospectionSettings,
    pub generate: GenerateOptions,
}

/// Parses a header string in "Name: Value" format.
pub fn parse_header(header: &str) -> Result<(String, String)> {
    let Some((name, value)) = header.split_once(':') else {
        anyhow::bail!("Invalid header format: '{header}'. Expected 'Header-Name: Header-Value'");
    };
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Header name cannot be empty");
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Merges `args` over `config`. Flags win over config values.
#[tracing::instrument(skip_all)]
pub fn resolve(args: &GenerateArgs, config: Option<&OpgenConfig>) -> Result<Settings> {
    let default_config = OpgenConfig::default();
    let config = config.unwrap_or(&default_config);

    let output_path = args
        .path
        .clone()
        .or_else(|| config.output.clone())
        .context("No output directory given. Use --path or set 'output' in the config file.")?;

    let cli_headers = args
        .headers
        .iter()
        .map(|h| parse_header(h))
        .collect::<Result<Vec<_>>>()
        .context("Failed to parse headers")?;

    let (source, introspection) = resolve_source(args, config.schema.as_ref(), cli_headers)?;

    let generate = &config.generate;
    let type_revisits = positive(
        "--type-revisits",
        args.type_revisits.or(generate.type_revisits),
        DEFAULT_TYPE_REVISITS,
    )?;
    let depth_limit = positive(
        "--depth-limit",
        args.depth_limit.or(generate.depth_limit),
        DEFAULT_DEPTH_LIMIT,
    )?;
    let failure_policy = if args.keep_going || generate.keep_going.unwrap_or(false) {
        FailurePolicy::Isolate
    } else {
        FailurePolicy::Abort
    };

    tracing::debug!(
        source = %source,
        output = %output_path.display(),
        type_revisits,
        depth_limit,
        ?failure_policy,
        "Resolved settings"
    );

    Ok(Settings {
        source,
        introspection,
        generate: GenerateOptions {
            output_path,
            synthesis: SynthesisOptions {
                type_revisits,
                depth_limit,
            },
            index: index_style(&generate.index),
            failure_policy,
        },
    })
}

fn resolve_source(
    args: &GenerateArgs,
    schema: Option<&SchemaConfig>,
    cli_headers: Vec<(String, String)>,
) -> Result<(SchemaSource, IntrospectionSettings)> {
    let cli_only = IntrospectionSettings {
        headers: cli_headers.clone(),
        timeout: args.timeout.unwrap_or(DEFAULT_TIMEOUT),
        retry: args.retry.unwrap_or(0),
    };

    // An explicit source on the command line uses CLI settings only
    if let Some(url) = &args.url {
        return Ok((SchemaSource::Url(url.clone()), cli_only));
    }
    if let Some(file) = &args.file {
        return Ok((SchemaSource::File(file.clone()), cli_only));
    }

    match schema {
        None => anyhow::bail!(
            "No schema given. Use --url or --file, or set 'schema' in the config file."
        ),
        Some(SchemaConfig::Location(location)) if is_url(location) => {
            Ok((SchemaSource::Url(location.clone()), cli_only))
        }
        Some(SchemaConfig::Location(location)) => {
            Ok((SchemaSource::File(PathBuf::from(location)), cli_only))
        }
        Some(SchemaConfig::Introspection(introspection)) => {
            let mut headers: Vec<(String, String)> = introspection
                .headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();

            for (name, value) in cli_headers {
                headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
                headers.push((name, value));
            }

            Ok((
                SchemaSource::Url(introspection.url.clone()),
                IntrospectionSettings {
                    headers,
                    timeout: args
                        .timeout
                        .unwrap_or(introspection.timeout.unwrap_or(DEFAULT_TIMEOUT)),
                    retry: args.retry.unwrap_or(introspection.retry.unwrap_or(0)),
                },
            ))
        }
    }
}

fn positive(flag: &str, value: Option<usize>, default: usize) -> Result<usize> {
    match value {
        Some(0) => anyhow::bail!("{flag} must be at least 1"),
        Some(value) => Ok(value),
        None => Ok(default),
    }
}

fn index_style(config: &IndexConfig) -> IndexStyle {
    let mut style = IndexStyle::default();
    if let Some(extension) = &config.extension {
        style.extension.clone_from(extension);
    }
    if let Some(module) = &config.loader_module {
        style.loader_module.clone_from(module);
    }
    if let Some(function) = &config.loader_function {
        style.loader_function.clone_from(function);
    }
    style
}
