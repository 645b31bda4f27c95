//! Shape Schema CLI
//!
//! Command-line interface for converting Smithy models into JSON Schema and
//! CloudFormation resource schemas.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use shape_schema_cloudformation::{CfnConfig, ResourceSchemaBuilder};
use shape_schema_common::{ShapeGraph, ShapeId};
use shape_schema_jsonschema::{JsonSchemaConfig, JsonSchemaConverter};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "shape-schema")]
#[command(version, about = "Convert Smithy models into flat JSON Schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a model (or the closure of some shapes) into a JSON Schema document
    #[command(after_help = "EXAMPLES:\n  \
        # Convert every shape of a model\n  \
        shape-schema convert --model weather.json\n\n  \
        # Convert one structure; its schema becomes the document root\n  \
        shape-schema convert \\\n    \
        --model weather.json \\\n    \
        --root com.example.weather#Forecast \\\n    \
        --output forecast.schema.json\n\n  \
        # Use OpenAPI style pointers\n  \
        shape-schema convert --model weather.json --config openapi.yaml")]
    Convert {
        /// Path to the Smithy JSON AST model
        #[arg(short, long)]
        model: PathBuf,

        /// JSON or YAML conversion settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Root shape IDs (the whole model when omitted)
        #[arg(short, long)]
        root: Vec<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the pointer assigned to every converted shape
    #[command(after_help = "EXAMPLES:\n  \
        # Show how colliding names were resolved\n  \
        shape-schema pointers --model weather.json --root com.example.weather#Forecast")]
    Pointers {
        /// Path to the Smithy JSON AST model
        #[arg(short, long)]
        model: PathBuf,

        /// JSON or YAML conversion settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Root shape IDs (the whole model when omitted)
        #[arg(short, long)]
        root: Vec<String>,
    },

    /// Build a CloudFormation resource schema from a structure
    #[command(after_help = "EXAMPLES:\n  \
        shape-schema cfn \\\n    \
        --model weather.json \\\n    \
        --resource com.example.weather#Forecast \\\n    \
        --type-name Example::Weather::Forecast \\\n    \
        --output forecast.cfn.json")]
    Cfn {
        /// Path to the Smithy JSON AST model
        #[arg(short, long)]
        model: PathBuf,

        /// Structure describing the resource properties
        #[arg(long)]
        resource: String,

        /// Resource type name (Organization::Service::Resource)
        #[arg(long)]
        type_name: String,

        /// Resource description
        #[arg(short, long)]
        description: Option<String>,

        /// JSON settings file for the CloudFormation converter
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            model,
            config,
            root,
            output,
        } => {
            convert_command(&model, config.as_deref(), &root, output.as_deref())?;
        }
        Commands::Pointers {
            model,
            config,
            root,
        } => {
            pointers_command(&model, config.as_deref(), &root)?;
        }
        Commands::Cfn {
            model,
            resource,
            type_name,
            description,
            config,
            output,
        } => {
            cfn_command(CfnArgs {
                model: &model,
                resource: &resource,
                type_name: &type_name,
                description: description.as_deref(),
                config: config.as_deref(),
                output: output.as_deref(),
            })?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn convert_command(
    model: &Path,
    config: Option<&Path>,
    roots: &[String],
    output: Option<&Path>,
) -> Result<()> {
    let graph = load_model(model)?;
    let converter = JsonSchemaConverter::new(load_config(config)?)
        .context("Invalid conversion settings")?;
    let roots = parse_roots(roots)?;

    let converted = if roots.is_empty() {
        converter.convert(&graph)
    } else {
        converter.convert_shapes(&graph, &roots)
    };
    let document = converted.context("Failed to convert model")?;

    match output {
        Some(path) => {
            document
                .write_to(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Wrote {} definitions to {}",
                "✓".green(),
                document.definitions.len(),
                path.display().to_string().yellow()
            );
        }
        None => println!("{}", document.to_json_pretty()?),
    }

    Ok(())
}

fn pointers_command(model: &Path, config: Option<&Path>, roots: &[String]) -> Result<()> {
    let graph = load_model(model)?;
    let converter = JsonSchemaConverter::new(load_config(config)?)
        .context("Invalid conversion settings")?;
    let roots = parse_roots(roots)?;

    let table = converter
        .pointers(&graph, (!roots.is_empty()).then_some(roots.as_slice()))
        .context("Failed to assign pointers")?;

    println!("{}", "Pointers:".bold());
    for (id, pointer) in table.iter() {
        println!("  {} {} {}", id.to_string().cyan(), "->".dimmed(), pointer);
    }
    println!("\n{} {} shapes", "✓".green(), table.len());

    Ok(())
}

struct CfnArgs<'a> {
    model: &'a Path,
    resource: &'a str,
    type_name: &'a str,
    description: Option<&'a str>,
    config: Option<&'a Path>,
    output: Option<&'a Path>,
}

fn cfn_command(args: CfnArgs) -> Result<()> {
    let graph = load_model(args.model)?;

    let named = CfnConfig::from_type_name(args.type_name)?;
    let mut config = match args.config {
        Some(path) => CfnConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => CfnConfig::default(),
    };
    config.organization_name = named.organization_name;
    config.service_name = named.service_name;
    config.resource_name = named.resource_name;
    if let Some(description) = args.description {
        config.description = Some(description.to_string());
    }

    let resource: ShapeId = args
        .resource
        .parse()
        .with_context(|| format!("Invalid resource shape ID `{}`", args.resource))?;

    let schema = ResourceSchemaBuilder::new(config)
        .context("Invalid CloudFormation settings")?
        .build(&graph, &resource)
        .context("Failed to build resource schema")?;

    let json = schema.to_json_pretty()?;
    match args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Wrote {} to {}",
                "✓".green(),
                schema.type_name.cyan(),
                path.display().to_string().yellow()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn load_model(path: &Path) -> Result<ShapeGraph> {
    tracing::debug!(model = %path.display(), "Loading model");
    shape_schema_parser::load_smithy_model(path)
        .with_context(|| format!("Failed to load Smithy model {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<JsonSchemaConfig> {
    match path {
        Some(path) => JsonSchemaConfig::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(JsonSchemaConfig::default()),
    }
}

fn parse_roots(roots: &[String]) -> Result<Vec<ShapeId>> {
    roots
        .iter()
        .map(|root| {
            root.parse::<ShapeId>()
                .with_context(|| format!("Invalid root shape ID `{}`", root))
        })
        .collect()
}
