//! PRISM CLI
//!
//! Project JSON documents through field selectors and allow-lists from
//! the command line.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use config::{FileConfig, Overrides};
use prism_core::{DebugLevel, GraphValue};
use prism_policy::PermissionTree;
use prism_project::{Body, CollectionWrapping, Projector, RenderRequest, Renderer};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prism")]
#[command(about = "PRISM - field-selection projections for JSON APIs", long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a JSON document through a selector
    Project {
        /// Document to project (`-` for stdin)
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Field selector, e.g. `title,posts{content}.order(chronological)`
        #[arg(short, long)]
        fields: Option<String>,
        /// JSON allow-list file; overrides the config file's permissions
        #[arg(short, long)]
        permissions: Option<PathBuf>,
        /// JSON config file with `projector` and `permissions` sections
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Shape of a root collection
        #[arg(long, value_enum)]
        wrap: Option<WrapArg>,
        /// Attribute nested collections are ordered by
        #[arg(long)]
        order_key: Option<String>,
        /// Do not report fields hidden by the allow-list
        #[arg(long)]
        quiet_denied: bool,
        /// Merge selectable fields under `metadata`
        #[arg(short, long)]
        metadata: bool,
        /// Diagnostics to attach under `debug`: none, info, warning or all
        #[arg(short, long, default_value = "none")]
        debug: DebugLevel,
        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print the parsed selection tree of a selector
    Parse {
        /// Field selector
        selector: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum WrapArg {
    /// A bare array
    Bare,
    /// An object with the array under `data`
    Data,
}

impl From<WrapArg> for CollectionWrapping {
    fn from(arg: WrapArg) -> Self {
        match arg {
            WrapArg::Bare => CollectionWrapping::Bare,
            WrapArg::Data => CollectionWrapping::Data,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Project {
            input,
            fields,
            permissions,
            config,
            wrap,
            order_key,
            quiet_denied,
            metadata,
            debug,
            compact,
        } => {
            let file = FileConfig::load_or_default(config.as_deref())?;
            let projector = Overrides {
                wrapping: wrap.map(Into::into),
                order_key,
                quiet_denied,
            }
            .apply(file.projector);
            let permissions = match permissions {
                Some(path) => load_permissions(&path)?,
                None => file.permissions,
            };

            let document = read_document(&input)?;
            let request = RenderRequest {
                fields,
                metadata,
                debug,
            };
            let output = project(&document, &request, projector, permissions)?;
            print_json(&output, compact)
        }
        Commands::Parse { selector } => {
            let nodes = prism_select::parse(&selector)?;
            print_json(&serde_json::to_value(&nodes)?, false)
        }
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prism=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_permissions(path: &Path) -> Result<PermissionTree> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading permissions from {}", path.display()))?;
    Ok(PermissionTree::from_json_str(&text)?)
}

fn read_document(input: &str) -> Result<Value> {
    let text = if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .wrap_err("reading document from stdin")?;
        text
    } else {
        std::fs::read_to_string(input).wrap_err_with(|| format!("reading document {}", input))?
    };
    serde_json::from_str(&text).wrap_err("document is not valid JSON")
}

/// Render `document` for `request`; without a selector the document
/// itself is the body.
fn project(
    document: &Value,
    request: &RenderRequest,
    projector: prism_project::ProjectorConfig,
    permissions: PermissionTree,
) -> Result<Value> {
    let renderer = Renderer::new(permissions).with_projector(Projector::with_config(projector));
    let rendered = renderer.render(
        &GraphValue::from(document),
        request,
        Some(Body::Json(document.clone())),
    )?;

    tracing::info!(diagnostics = rendered.diagnostics.len(), "projection complete");

    match rendered.body {
        Some(Body::Json(value)) => Ok(value),
        Some(Body::Raw { .. }) | None => Ok(Value::Null),
    }
}

fn print_json(value: &Value, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", text);
    Ok(())
}
