//! Terminal and JSON output for a generation run.

use crate::exit_code::ExitCode;
use colored::Colorize;
use graphql_opgen::GenerationReport;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for tooling
    Json,
}

/// Output verbosity options
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: OutputFormat,
    /// Whether to show progress indicators (spinners)
    pub show_progress: bool,
    /// Whether to show informational output (success messages, summaries)
    pub show_info: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Timings {
    pub load: Duration,
    pub generate: Duration,
    pub total: Duration,
}

/// Prints a fatal error to stderr.
pub fn print_error(format: OutputFormat, code: ExitCode, error: &anyhow::Error) {
    match format {
        OutputFormat::Human => {
            eprintln!("{} {error:#}", "✗".red().bold());
        }
        OutputFormat::Json => {
            eprintln!(
                "{}",
                serde_json::json!({
                    "success": false,
                    "exit_code": code.code(),
                    "kind": code.to_string(),
                    "error": format!("{error:#}"),
                })
            );
        }
    }
}

pub fn print_schema_loaded(source: &str, options: OutputOptions) {
    if options.format == OutputFormat::Human && options.show_info {
        println!("{} {}", "✓ Schema loaded from".green(), source);
    }
}

/// Prints the outcome of a finished run. Skipped fields always go to
/// stderr; the summary respects `--quiet`.
pub fn print_report(report: &GenerationReport, timings: Timings, options: OutputOptions) {
    match options.format {
        OutputFormat::Json => println!("{}", json_report(report, timings)),
        OutputFormat::Human => print_human(report, timings, options.show_info),
    }
}

fn print_human(report: &GenerationReport, timings: Timings, show_info: bool) {
    for kind in &report.kinds {
        for failure in &kind.failures {
            eprintln!(
                "{} {} '{}': {}",
                "warning:".yellow().bold(),
                kind.kind,
                failure.field,
                failure.message
            );
        }
    }

    if !show_info {
        return;
    }

    for kind in &report.kinds {
        println!(
            "  {}: {} document(s) {} {}",
            kind.kind.dir_name().cyan().bold(),
            kind.documents.len().to_string().bold(),
            "→".dimmed(),
            kind.index_file.display()
        );
    }

    println!();
    let written = report.document_count();
    let failed = report.failure_count();
    if failed == 0 {
        println!(
            "{}",
            format!(
                "✓ Wrote {written} document(s) to {}",
                report.output_path.display()
            )
            .green()
            .bold()
        );
    } else {
        println!(
            "{}",
            format!("✗ Wrote {written} document(s), skipped {failed} field(s)").red()
        );
    }
    println!(
        "  {} load: {:.2}s, generation: {:.2}s, total: {:.2}s",
        "⏱".dimmed(),
        timings.load.as_secs_f64(),
        timings.generate.as_secs_f64(),
        timings.total.as_secs_f64()
    );
}

fn json_report(report: &GenerationReport, timings: Timings) -> String {
    let output = serde_json::json!({
        "success": !report.has_failures(),
        "report": report,
        "stats": {
            "documents": report.document_count(),
            "failures": report.failure_count(),
            "load_ms": timings.load.as_millis(),
            "generate_ms": timings.generate.as_millis(),
            "total_ms": timings.total.as_millis(),
        }
    });
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
}
