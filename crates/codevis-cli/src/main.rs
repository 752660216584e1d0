use std::path::PathBuf;

use clap::{Parser, Subcommand};
use codevis_core::{Config, Pipeline};
use color_eyre::eyre::{bail, Result, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codevis")]
#[command(about = "Sync a program's structure graph into a graph store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the stored snapshot with one built from the analyzer facts
    Sync {
        /// Config file (TOML, or JSON with a .json extension)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Build the graph and print it as JSON instead of writing it
        #[arg(long)]
        dry_run: bool,
        /// Exit with an error if any fact was dropped or any write failed
        #[arg(long)]
        strict: bool,
    },
    /// Print a default configuration file
    Config,
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(&path)
            .wrap_err_with(|| format!("cannot load config file {}", path.display())),
        None => Config::load().wrap_err("cannot load config"),
    }
}

async fn sync(config: Option<PathBuf>, dry_run: bool, strict: bool) -> Result<()> {
    let config = load_config(config)?;
    let strict = strict || config.sync.strict;

    if dry_run {
        let pipeline = Pipeline::offline(config)?;
        let prepared = pipeline.prepare()?;
        info!(
            program = %prepared.graph.root().name,
            nodes = prepared.graph.nodes().len(),
            edges = prepared.graph.edges().len(),
            "dry run, nothing written"
        );
        println!("{}", serde_json::to_string_pretty(&prepared.graph)?);
        return Ok(());
    }

    let pipeline = Pipeline::new(config)?;
    let report = pipeline.run_surreal().await?;
    let write = &report.sync.write;

    println!("Synced program: {}", report.sync.program);
    println!("  Nodes: {}/{} written", write.nodes_written, write.nodes_attempted);
    println!("  Edges: {}/{} written", write.edges_written, write.edges_attempted);
    println!("  Indexes: {}/{}", write.indexes_created, write.indexes_attempted);
    println!("  Dropped facts: {}", report.rejected.len());
    println!("  Elapsed: {:?}", report.sync.throughput.elapsed);
    println!("  Fingerprint: {}", report.sync.fingerprint);

    if report.is_clean() {
        return Ok(());
    }

    if !strict {
        warn!(
            failed_writes = write.failures.len(),
            dropped_facts = report.rejected.len(),
            "snapshot incomplete; pass --strict to fail the run"
        );
        return Ok(());
    }

    bail!(
        "sync finished with {} failed writes and {} dropped facts",
        write.failures.len(),
        report.rejected.len()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            config,
            dry_run,
            strict,
        } => sync(config, dry_run, strict).await,
        Commands::Config => {
            print!("{}", Config::default_config_string());
            Ok(())
        }
    }
}
