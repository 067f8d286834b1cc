use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dockroute_cli::output::{StageView, StationView, ValidationReport};
use dockroute_lib::{DockStage, ModelLibrary, StationCatalog, StationDefinition, StationType};

#[derive(Parser, Debug)]
#[command(author, version, about = "Station docking route utilities")]
struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build one station type and print the approach and departure routes of every bay.
    Routes {
        /// Station definition file.
        #[arg(long)]
        definition: PathBuf,
        /// Directory of model tag dumps.
        #[arg(long)]
        model_dir: PathBuf,
    },
    /// Describe a dock stage by name (e.g. CLEARANCE_GRANTED) or ordinal.
    Stage {
        /// Stage name or ordinal.
        name: String,
    },
    /// Load a directory of station definitions and report which fail to build.
    Validate {
        /// Directory of station definition files.
        #[arg(long)]
        stations: PathBuf,
        /// Directory of model tag dumps.
        #[arg(long)]
        model_dir: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Routes {
            definition,
            model_dir,
        } => handle_routes(&definition, &model_dir, cli.json),
        Command::Stage { name } => handle_stage(&name, cli.json),
        Command::Validate {
            stations,
            model_dir,
        } => handle_validate(&stations, &model_dir, cli.json),
    }
}

fn handle_routes(definition_path: &Path, model_dir: &Path, json: bool) -> Result<ExitCode> {
    let models = load_models(model_dir)?;
    let definition = StationDefinition::from_path(definition_path).with_context(|| {
        format!(
            "failed to read station definition {}",
            definition_path.display()
        )
    })?;
    let id = definition_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("invalid definition path {}", definition_path.display()))?;
    let station = StationType::build(id, &definition, &models)
        .with_context(|| format!("failed to build station type {id}"))?;

    let view = StationView::from_station(&station);
    if json {
        print_json(&view)?;
    } else {
        print!("{}", view.render_text());
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_stage(name: &str, json: bool) -> Result<ExitCode> {
    let stage = match name.parse::<u8>() {
        Ok(ordinal) => DockStage::from_ordinal(ordinal),
        Err(_) => name.parse::<DockStage>().ok(),
    }
    .ok_or_else(|| anyhow!("unknown dock stage '{name}'"))?;

    let view = StageView::from_stage(stage);
    if json {
        print_json(&view)?;
    } else {
        print!("{}", view.render_text());
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_validate(stations: &Path, model_dir: &Path, json: bool) -> Result<ExitCode> {
    let models = load_models(model_dir)?;
    let catalog = StationCatalog::load_dir(stations, &models)
        .with_context(|| format!("failed to read station directory {}", stations.display()))?;

    let report = ValidationReport::from_catalog(&catalog);
    if json {
        print_json(&report)?;
    } else {
        print!("{}", report.render_text());
    }

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn load_models(model_dir: &Path) -> Result<ModelLibrary> {
    ModelLibrary::load_dir(model_dir)
        .with_context(|| format!("failed to load models from {}", model_dir.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
