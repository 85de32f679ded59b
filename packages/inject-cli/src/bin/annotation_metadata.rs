/**
 * Annotation Metadata CLI - annotation-metadata
 *
 * Builds annotation metadata for the declarations of a JSON element model
 */
use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use indexmap::IndexMap;
use inject_annotation::element::{InMemoryElementModel, ModelElement};
use inject_annotation::{
    AnnotationMetadata, AnnotationMetadataBuilder, BuildError, BuildSession, BuilderConfig,
};
use rayon::prelude::*;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    Declared,
    Overridden,
    Method,
}

impl Mode {
    fn parse(value: &str) -> anyhow::Result<Self> {
        Ok(match value {
            "full" => Mode::Full,
            "declared" => Mode::Declared,
            "overridden" => Mode::Overridden,
            "method" => Mode::Method,
            other => bail!("unknown build mode {other}"),
        })
    }

    fn build(
        self,
        builder: &AnnotationMetadataBuilder<'_, InMemoryElementModel>,
        element: &ModelElement,
    ) -> Result<AnnotationMetadata, BuildError> {
        match self {
            Mode::Full => builder.build(element),
            Mode::Declared => builder.build_declared(element),
            Mode::Overridden => builder.build_overridden(element),
            Mode::Method => builder.build_for_method(element),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let result = match matches.subcommand() {
        Some(("build", args)) => run_build(args),
        Some(("extensions", args)) => run_extensions(args),
        _ => Err(anyhow::anyhow!("a subcommand is required")),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn cli() -> Command {
    let config = Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .help("Path to a builder configuration JSON file");

    Command::new("annotation-metadata")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Annotation metadata builder")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("build")
                .about("Build annotation metadata for elements of a model")
                .arg(
                    Arg::new("model")
                        .value_name("MODEL")
                        .required(true)
                        .help("Path to the element model JSON file"),
                )
                .arg(
                    Arg::new("element")
                        .short('e')
                        .long("element")
                        .value_name("NAME")
                        .action(ArgAction::Append)
                        .help("Element to build; defaults to every declared element"),
                )
                .arg(
                    Arg::new("mode")
                        .short('m')
                        .long("mode")
                        .value_name("MODE")
                        .value_parser(["full", "declared", "overridden", "method"])
                        .default_value("full")
                        .help("Which build entry point to use"),
                )
                .arg(config.clone())
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .action(ArgAction::SetTrue)
                        .help("Build elements in parallel"),
                )
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .action(ArgAction::SetTrue)
                        .help("Pretty-print the JSON output"),
                ),
        )
        .subcommand(
            Command::new("extensions")
                .about("List mapped annotations and remapped packages")
                .arg(config),
        )
}

fn load_config(args: &ArgMatches) -> anyhow::Result<BuilderConfig> {
    match args.get_one::<String>("config") {
        Some(path) => BuilderConfig::load(Path::new(path)),
        None => Ok(BuilderConfig::default()),
    }
}

fn run_build(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config = load_config(args)?;
    let model_path = args
        .get_one::<String>("model")
        .context("missing model path")?;
    let model = InMemoryElementModel::load(Path::new(model_path))
        .with_context(|| format!("failed to load element model {model_path}"))?
        .with_visitor_options(config.visitor_options.clone());
    let mode = Mode::parse(
        args.get_one::<String>("mode")
            .map(String::as_str)
            .unwrap_or("full"),
    )?;

    let names: Vec<String> = match args.get_many::<String>("element") {
        Some(selected) => selected.cloned().collect(),
        None => model.element_names().map(str::to_string).collect(),
    };
    let mut elements = Vec::with_capacity(names.len());
    for name in &names {
        let element = model
            .element(name)
            .with_context(|| format!("unknown element {name}"))?;
        elements.push((name.as_str(), element));
    }

    let session = Arc::new(BuildSession::from_config(config));
    info!(elements = elements.len(), ?mode, "building annotation metadata");

    let built: Vec<(&str, Result<AnnotationMetadata, BuildError>)> = if args.get_flag("jobs") {
        elements
            .par_iter()
            .map_init(
                || AnnotationMetadataBuilder::new(&model, session.clone()),
                |builder, (name, element)| (*name, mode.build(builder, element)),
            )
            .collect()
    } else {
        let builder = AnnotationMetadataBuilder::new(&model, session.clone());
        elements
            .iter()
            .map(|(name, element)| (*name, mode.build(&builder, element)))
            .collect()
    };

    let mut output = IndexMap::with_capacity(built.len());
    let mut failed = false;
    for (name, result) in built {
        match result {
            Ok(metadata) => {
                output.insert(name, metadata);
            }
            Err(error) => {
                eprintln!("Error: {error}");
                failed = true;
            }
        }
    }

    for diagnostic in model.take_diagnostics() {
        eprintln!("{diagnostic}");
        failed |= diagnostic.is_error();
    }

    let json = if args.get_flag("pretty") {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    debug!(built = output.len(), "wrote annotation metadata");

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn run_extensions(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config = load_config(args)?;
    let registry = config.extension_registry();
    let listing = serde_json::json!({
        "annotations": registry.mapped_annotation_names(),
        "packages": registry.mapped_annotation_packages(),
    });
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(ExitCode::SUCCESS)
}
