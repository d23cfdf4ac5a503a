// src/main.rs

use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use debloat::{
    programs::{self, ProgramCatalog, ProgramEntry},
    tweaks::{self, Batch, OperationId},
};
use strum::IntoEnumIterator;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "debloat")]
#[command(about = "Windows debloat and tweak tool", version)]
struct Cli {
    /// Worker pool size for parallel groups (defaults to host parallelism)
    #[arg(short = 'j', long, global = true)]
    parallelism: Option<usize>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List available operations and installable programs
    List,
    /// Run a named operation (e.g. EssentialTweaks)
    Run { operation: String },
    /// Install catalog programs by display name
    Install { names: Vec<String> },
    /// Uninstall catalog programs by display name
    Uninstall { names: Vec<String> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .init();

    match cli.command {
        Commands::List => list(),
        Commands::Run { operation } => {
            let id = OperationId::from_str(&operation)
                .map_err(|_| anyhow!("unknown operation `{}`; see `debloat list`", operation))?;
            let table = tweaks::operations();
            let batch = table
                .get(&id)
                .ok_or_else(|| anyhow!("operation `{}` has no registered batch", id))?;
            execute(batch, cli.parallelism)
        }
        Commands::Install { names } => {
            let entries = resolve_programs(&names)?;
            execute(&programs::install_batch(&entries), cli.parallelism)
        }
        Commands::Uninstall { names } => {
            let entries = resolve_programs(&names)?;
            execute(&programs::remove_batch(&entries), cli.parallelism)
        }
    }
}

fn list() -> Result<()> {
    println!("Operations:");
    let table = tweaks::operations();
    for id in OperationId::iter() {
        let steps = table.get(&id).map(Batch::step_count).unwrap_or(0);
        match id.undo_pair() {
            Some(undo) => println!("  {} ({} steps, undo: {})", id, steps, undo),
            None => println!("  {} ({} steps)", id, steps),
        }
    }

    println!();
    println!("Programs:");
    let catalog = ProgramCatalog::builtin()?;
    for (category, entries) in catalog.iter() {
        println!("  {}:", category);
        for entry in entries {
            println!("    {} [{}]", entry.display_name(), entry.ids().join(", "));
        }
    }
    Ok(())
}

fn resolve_programs(names: &[String]) -> Result<Vec<ProgramEntry>> {
    if names.is_empty() {
        bail!("no programs named; see `debloat list`");
    }
    let catalog = ProgramCatalog::builtin()?;
    names
        .iter()
        .map(|name| {
            catalog
                .find(name)
                .cloned()
                .ok_or_else(|| anyhow!("unknown program `{}`; see `debloat list`", name))
        })
        .collect()
}

#[cfg(windows)]
fn execute(batch: &Batch, parallelism: Option<usize>) -> Result<()> {
    use debloat::{
        adapters::Adapters,
        orchestrator::{CancelToken, Orchestrator},
        utils::{
            process::SystemProcessRunner, registry::WindowsRegistry,
            services::WindowsServiceControl, tasks::SchtasksScheduler,
            winget::WingetPackageManager,
        },
    };

    let runner = SystemProcessRunner;
    let registry = WindowsRegistry;
    let services = WindowsServiceControl;
    let tasks = SchtasksScheduler::new(&runner);
    let packages = WingetPackageManager::new(&runner);
    let adapters = Adapters {
        registry: &registry,
        services: &services,
        tasks: &tasks,
        packages: &packages,
        processes: &runner,
    };

    let orchestrator = match parallelism {
        Some(workers) => Orchestrator::with_parallelism(workers),
        None => Orchestrator::new(),
    };

    let mut sink = |line: &str| println!("{}", line);
    let report = orchestrator.execute(batch, &adapters, &mut sink, &CancelToken::new());

    if report.cancelled {
        println!("{} cancelled.", batch.title());
        std::process::exit(1);
    }
    if report.failures.is_empty() {
        println!("{} completed.", batch.title());
    } else {
        println!(
            "{} completed with {} issue(s):",
            batch.title(),
            report.failures.len()
        );
        for failure in &report.failures {
            println!("  {}: {}", failure.step, failure.error);
        }
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(not(windows))]
fn execute(_batch: &Batch, _parallelism: Option<usize>) -> Result<()> {
    bail!("this tool changes Windows-specific settings and only runs on Windows")
}
