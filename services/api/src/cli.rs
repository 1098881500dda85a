use crate::batch::{evaluate_batch, parse_batch, BatchReport};
use crate::error::ApiError;
use crate::infra::{load_engine, TableOverrides};
use crate::routes::CatalogView;
use crate::server;
use clap::{Args, Parser, Subcommand};
use safety_index::config::AppConfig;
use safety_index::telemetry;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "safety-index",
    about = "Score organizational units on weighted safety KPIs and classify them by risk zone",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate a CSV batch of units and print the results as JSON
    Evaluate(EvaluateArgs),
    /// Print the effective KPI catalog as JSON
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// CSV file with one row per unit
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// KPI catalog JSON replacing the standard catalog
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Risk profile JSON replacing the standard registry
    #[arg(long)]
    pub(crate) profiles: Option<PathBuf>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CatalogArgs {
    /// KPI catalog JSON to validate and print instead of the standard catalog
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
}

pub(crate) async fn run() -> Result<(), ApiError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args).await,
        Command::Catalog(args) => run_catalog(args),
    }
}

async fn run_evaluate(args: EvaluateArgs) -> Result<(), ApiError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let engine = load_engine(
        &config.scoring,
        TableOverrides {
            catalog: args.catalog.as_deref(),
            profiles: args.profiles.as_deref(),
        },
    )?;

    let file = std::fs::File::open(&args.input)?;
    let requests = parse_batch(file)?;
    let evaluations = evaluate_batch(Arc::new(engine), requests).await?;

    print_json(&BatchReport::new(evaluations), args.pretty)
}

fn run_catalog(args: CatalogArgs) -> Result<(), ApiError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let engine = load_engine(
        &config.scoring,
        TableOverrides {
            catalog: args.catalog.as_deref(),
            profiles: None,
        },
    )?;

    print_json(&CatalogView::new(engine.catalog()), args.pretty)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), ApiError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
