mod exit_code;
mod output_dir;
mod progress;
mod report;
mod schema_source;
mod settings;

use anyhow::Context;
use clap::Parser;
use exit_code::ExitCode;
use graphql_opgen::generate;
use graphql_opgen_config::{find_config, load_config, OpgenConfig};
use output_dir::prepare_output_dir;
use report::{OutputFormat, OutputOptions, Timings};
use schema_source::load_schema;
use settings::GenerateArgs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "graphql-opgen")]
#[command(
    about = "Generate a GraphQL operation for every root field of a schema",
    long_about = None
)]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Path to config file (searched upward from the current directory otherwise)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Force colored output even when not a TTY
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long, conflicts_with = "color")]
    no_color: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    /// Suppress progress indicators (spinners)
    #[arg(long)]
    no_progress: bool,

    #[command(flatten)]
    generate: GenerateArgs,
}

/// A failed stage of a run and the exit code it maps to.
struct Failure {
    code: ExitCode,
    error: anyhow::Error,
}

trait Stage<T> {
    fn stage(self, code: ExitCode) -> Result<T, Failure>;
}

impl<T, E: Into<anyhow::Error>> Stage<T> for Result<T, E> {
    fn stage(self, code: ExitCode) -> Result<T, Failure> {
        self.map_err(|error| Failure {
            code,
            error: error.into(),
        })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing();
    configure_colors(cli.color, cli.no_color);

    let options = OutputOptions {
        format: cli.format,
        show_progress: !cli.quiet && !cli.no_progress && cli.format == OutputFormat::Human,
        show_info: !cli.quiet,
    };

    let code = match run(&cli, options).await {
        Ok(code) => code,
        Err(Failure { code, error }) => {
            tracing::error!(%code, "{error:#}");
            report::print_error(options.format, code, &error);
            code
        }
    };
    code.exit();
}

#[tracing::instrument(skip_all)]
async fn run(cli: &Cli, options: OutputOptions) -> Result<ExitCode, Failure> {
    let start_time = Instant::now();

    let config = load_config_file(cli.config.as_deref()).stage(ExitCode::ConfigError)?;
    let settings =
        settings::resolve(&cli.generate, config.as_ref()).stage(ExitCode::ConfigError)?;

    let load_start = Instant::now();
    let spinner = progress::spinner(
        &format!("Loading schema from {}...", settings.source),
        options.show_progress,
    );
    let schema = load_schema(&settings.source, &settings.introspection.client()).await;
    spinner.finish_and_clear();
    let schema = schema.stage(ExitCode::SchemaError)?;
    let load = load_start.elapsed();
    report::print_schema_loaded(&settings.source.to_string(), options);

    let output_path = &settings.generate.output_path;
    prepare_output_dir(output_path)
        .await
        .with_context(|| {
            format!(
                "Failed to prepare output directory {}",
                output_path.display()
            )
        })
        .stage(ExitCode::IoError)?;

    let generate_start = Instant::now();
    let report = match generate(&schema, &settings.generate).await {
        Ok(report) => report,
        Err(error) => {
            return Err(Failure {
                code: ExitCode::for_generate_error(&error),
                error: error.into(),
            })
        }
    };

    let timings = Timings {
        load,
        generate: generate_start.elapsed(),
        total: start_time.elapsed(),
    };
    report::print_report(&report, timings, options);

    if report.has_failures() {
        Ok(ExitCode::GenerationError)
    } else {
        Ok(ExitCode::Success)
    }
}

/// The config named by `--config`, or the nearest one above the current
/// directory. `None` when there is none to find.
fn load_config_file(explicit: Option<&Path>) -> anyhow::Result<Option<OpgenConfig>> {
    let path = if let Some(path) = explicit {
        path.to_path_buf()
    } else {
        let current_dir = std::env::current_dir().context("Failed to read current directory")?;
        match find_config(&current_dir) {
            Some(path) => path,
            None => return Ok(None),
        }
    };

    load_config(&path)
        .map(Some)
        .with_context(|| format!("Failed to load config {}", path.display()))
}

/// Logs go to stderr, filtered by `RUST_LOG` (off by default)
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Configure colored output based on flags and environment variables.
///
/// Priority order (highest to lowest):
/// 1. `--color` flag (force colors on)
/// 2. `--no-color` flag (force colors off)
/// 3. `NO_COLOR` environment variable (if set to any value, disable colors)
/// 4. `CLICOLOR_FORCE` environment variable (if set to non-zero, force colors)
/// 5. `CLICOLOR` environment variable (if set to "0", disable colors)
/// 6. Default: colors enabled if stdout is a TTY (handled by `colored` crate)
///
/// See: <https://no-color.org/> and <https://bixense.com/clicolors/>
fn configure_colors(force_color: bool, no_color: bool) {
    use colored::control;

    if force_color {
        control::set_override(true);
    } else if no_color {
        control::set_override(false);
    } else if std::env::var_os("NO_COLOR").is_some() {
        // NO_COLOR: if present (regardless of value), disable colors
        control::set_override(false);
    } else if let Ok(val) = std::env::var("CLICOLOR_FORCE") {
        // CLICOLOR_FORCE: if set to non-empty, non-zero value, force colors
        if !val.is_empty() && val != "0" {
            control::set_override(true);
        }
    } else if let Ok(val) = std::env::var("CLICOLOR") {
        // CLICOLOR: if set to "0", disable colors
        if val == "0" {
            control::set_override(false);
        }
    }
    // Default: let the colored crate decide based on TTY detection
}
