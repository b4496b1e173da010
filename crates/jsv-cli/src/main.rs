//! # jsv-cli
//!
//! Command-line interface for loading JSON Schemas and validating instances.
//!
//! Schemas are loaded from the local filesystem; relative references are
//! resolved against the schema file's location.
//!
//! `validate` exits 0 when every instance conforms, 2 when violations were
//! found, and 1 on load or IO failures.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use url::Url;

use jsv_schema::{DirFetcher, LoaderOptions, Schema, SchemaLoader};
use jsv_validate::ValidationEngine;

#[derive(Parser)]
#[command(name = "jsv")]
#[command(about = "JSON Schema loader and validator")]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Validate JSON instances against a schema
    Validate {
        /// Instance files to validate
        #[arg(required = true)]
        instances: Vec<String>,

        /// Schema file path
        #[arg(short, long)]
        schema: String,
    },

    /// Load a schema and verify that every reference resolves
    Check {
        /// Schema file path
        schema: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { instances, schema } => validate_command(&schema, &instances),
        Commands::Check { schema } => check_command(&schema),
    }
}

fn validate_command(schema_path: &str, instance_paths: &[String]) -> anyhow::Result<ExitCode> {
    let schema = load_schema_file(Path::new(schema_path))?;
    let engine = ValidationEngine::new();

    let mut failures = 0usize;
    for instance_path in instance_paths {
        let instance = read_instance(Path::new(instance_path))?;
        let report = engine
            .validate(&schema, &instance)
            .with_context(|| format!("validation failed for '{instance_path}'"))?;
        if report.is_valid() {
            println!("{instance_path}: ok");
        } else {
            failures += 1;
            println!("{instance_path}: {} violation(s)", report.len());
            for violation in report.iter() {
                println!("  {violation}");
            }
        }
    }

    if failures == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}

fn check_command(schema_path: &str) -> anyhow::Result<ExitCode> {
    let schema = load_schema_file(Path::new(schema_path))?;
    let documents = schema.documents();
    for uri in documents.document_uris() {
        tracing::debug!("Loaded document: {}", uri);
    }
    println!(
        "{schema_path}: ok ({} document(s) loaded, all references resolve)",
        documents.document_count()
    );
    Ok(ExitCode::SUCCESS)
}

fn load_schema_file(path: &Path) -> anyhow::Result<Schema> {
    let absolute = path
        .canonicalize()
        .with_context(|| format!("cannot open schema '{}'", path.display()))?;
    let scope = Url::from_file_path(&absolute)
        .map_err(|()| anyhow::anyhow!("schema path '{}' cannot form a URL", absolute.display()))?;
    let options = LoaderOptions::new()
        .with_resolution_scope(scope.as_str())
        .with_fetcher(Arc::new(DirFetcher::new("/")));
    SchemaLoader::with_options(options)
        .load_file(&absolute)
        .with_context(|| format!("failed to load schema '{}'", path.display()))
}

fn read_instance(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot open instance '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("instance '{}' is not valid JSON", path.display()))
}
