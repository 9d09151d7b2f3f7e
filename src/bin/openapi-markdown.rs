//! OpenAPI Markdown CLI
//!
//! Generates markdown pages for the resources and tagged endpoints of an
//! OpenAPI document.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use openapi_markdown::{
    bundle_refs, generate, is_url, load_document_auto, write_docs, DocumentRefs, GenerateOptions,
    RenderOptions, Renderer,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-markdown")]
#[command(about = "Generate markdown API docs from an OpenAPI document")]
#[command(version)]
struct Cli {
    /// OpenAPI document: file path or URL (http:// or https://), JSON or YAML
    #[arg(long, short)]
    schema: String,

    /// Directory to write the markdown files to (stdout if not specified)
    #[arg(long, short)]
    output_directory: Option<PathBuf>,

    /// Prefix for endpoint file names
    #[arg(long)]
    endpoints_prefix: Option<String>,

    /// Template for endpoint pages (default: built-in)
    #[arg(long)]
    endpoints_template: Option<PathBuf>,

    /// Template for resource pages (default: built-in)
    #[arg(long)]
    resource_template: Option<PathBuf>,

    /// Expansion depth for resource schemas (default: unlimited)
    #[arg(long)]
    resource_schema_depth: Option<usize>,

    /// Expansion depth for request and response schemas (default: unlimited)
    #[arg(long)]
    endpoint_schema_depth: Option<usize>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run(cli: Cli) -> Result<(), u8> {
    let mut document = load_document_auto(&cli.schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    // External file refs are inlined relative to the document's directory
    if !is_url(&cli.schema) {
        let base_dir = Path::new(&cli.schema)
            .parent()
            .unwrap_or(Path::new("."));
        bundle_refs(&mut document, base_dir).map_err(|e| {
            eprintln!("Error bundling refs: {}", e);
            e.exit_code() as u8
        })?;
    }

    let options = GenerateOptions::new()
        .resource_schema_depth(cli.resource_schema_depth)
        .endpoint_schema_depth(cli.endpoint_schema_depth);
    let refs = DocumentRefs::new(&document);
    let docs = generate(&document, &refs, &options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    debug!(
        resources = docs.resources.len(),
        tags = docs.groups.len(),
        "generated documentation"
    );

    let render_options = RenderOptions {
        output_directory: cli.output_directory,
        endpoints_prefix: cli.endpoints_prefix,
        endpoints_template: cli.endpoints_template,
        resource_template: cli.resource_template,
    };

    if let Some(dir) = &render_options.output_directory {
        std::fs::create_dir_all(dir).map_err(|e| {
            eprintln!("Error creating {}: {}", dir.display(), e);
            3u8
        })?;
    }

    let renderer = Renderer::from_options(&render_options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_docs(&docs, &renderer, &render_options, &mut out).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    Ok(())
}
