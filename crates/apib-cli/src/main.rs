//! The `apib` command-line tool: parse an API Blueprint document, emit its
//! AST as YAML or JSON, and print diagnostics.
//!
//! Input comes from a positional file argument, or stdin when absent.
//! Diagnostics go to stderr as
//! `{error|warning}: (<code>) <message> :<offset>:<length>[;<offset>:<length>…]`
//! and the process exits with the report's error code (0 on success).

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use apib_engine::serialize::{Format, json, yaml};
use apib_engine::{Annotation, ParseOptions, ParseResult, Report, parse};

/// API Blueprint parser. Reads stdin when called without an input file.
#[derive(Parser)]
#[command(name = "apib", version, about = "API Blueprint parser", disable_version_flag = true)]
struct Cli {
    /// Input file; stdin when omitted.
    input: Option<PathBuf>,

    /// Save the output AST into a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output AST format.
    #[arg(short, long, default_value = "yaml", value_parser = parse_format)]
    format: Format,

    /// Export the sourcemap AST into a file.
    #[arg(short, long)]
    sourcemap: Option<PathBuf>,

    /// Validate input only, do not print the AST.
    #[arg(short = 'l', long)]
    validate: bool,

    /// Print the version.
    #[arg(short = 'v', long)]
    version: bool,
}

fn parse_format(value: &str) -> Result<Format, String> {
    match value {
        "yaml" => Ok(Format::Yaml),
        "json" => Ok(Format::Json),
        other => Err(format!("unknown format '{other}', expected 'yaml' or 'json'")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            eprintln!("fatal: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(0);
    }

    let source = read_input(cli.input.as_deref())?;

    let options = ParseOptions {
        export_sourcemap: cli.sourcemap.is_some(),
        ..Default::default()
    };
    let result = parse(&source, options);

    if !cli.validate {
        emit_ast(cli, &result)?;
        emit_sourcemap(cli, &result)?;
    }

    print_report(&result.report);
    Ok(result.report.error_code().min(u8::MAX as u32) as u8)
}

fn read_input(input: Option<&std::path::Path>) -> Result<String> {
    match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("unable to open input file '{}'", path.display()))
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("unable to read stdin")?;
            Ok(buffer)
        }
    }
}

fn emit_ast(cli: &Cli, result: &ParseResult) -> Result<()> {
    let rendered = apib_engine::serialize::serialize(&result.node, cli.format)?;
    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("unable to write to file '{}'", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}

fn emit_sourcemap(cli: &Cli, result: &ParseResult) -> Result<()> {
    let (Some(path), Some(map)) = (&cli.sourcemap, &result.source_map) else {
        return Ok(());
    };
    let rendered = match cli.format {
        Format::Yaml => yaml::serialize_sourcemap_yaml(map),
        Format::Json => json::serialize_sourcemap_json(map)?,
    };
    fs::write(path, rendered)
        .with_context(|| format!("unable to write to file '{}'", path.display()))?;
    Ok(())
}

fn print_report(report: &Report) {
    if let Some(error) = &report.error {
        print_annotation("error:", error);
    } else {
        eprintln!("OK.");
    }
    for warning in &report.warnings {
        print_annotation("warning:", warning);
    }
}

fn print_annotation(prefix: &str, annotation: &Annotation) {
    let mut line = format!("{prefix} ({}) {}", annotation.code.value(), annotation.message);
    for (index, range) in annotation.location.ranges().iter().enumerate() {
        let separator = if index == 0 { " :" } else { ";" };
        line.push_str(&format!("{separator}{}:{}", range.location, range.length));
    }
    eprintln!("{line}");
}
