//! CLI entry point: parses arguments, loads the roster and template, runs the
//! solver, and emits the result — exiting with the process-wide exit codes
//! from §6 (0 = emitted, 1 = invalid input, 2 = infeasible, 70 = internal
//! invariant violation).

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;
use scheduler::{config::SolverConfig, emitter, roster::Roster, solver, template::Template};
use shared::ScheduleError;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generates a monthly resident shift schedule")]
struct Cli {
    /// Horizon start date, YYYY-MM-DD.
    #[arg(long)]
    start: String,

    /// Horizon length in days.
    #[arg(long, default_value_t = 28)]
    days: i64,

    /// Path to the resident-table CSV.
    #[arg(long)]
    roster: PathBuf,

    /// Path to a shift-template override CSV. Omit to use the built-in default.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Random seed. Omit for a fresh OS-randomized seed per invocation.
    #[arg(long)]
    seed: Option<u64>,

    /// Path to a solver-configuration TOML file layered over built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output CSV path. Omit to write to stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resident_scheduler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let code = match run() {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!("{err:?}");
            eprintln!("error: {err:?}");
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let horizon_start = NaiveDate::parse_from_str(&cli.start, "%Y-%m-%d")
        .with_context(|| format!("invalid --start date (expected YYYY-MM-DD): {}", cli.start))?;
    let horizon_end = horizon_start + Duration::days(cli.days - 1);

    let roster =
        Roster::from_csv(&cli.roster).with_context(|| format!("loading roster from {}", cli.roster.display()))?;

    let solver_template = match &cli.template {
        Some(path) => {
            Template::from_csv(path).with_context(|| format!("loading template from {}", path.display()))?
        }
        None => Template::default_template(),
    };

    let shifts = solver_template
        .expand(horizon_start, horizon_end)
        .context("expanding shift template over the horizon")?;

    let solver_config = SolverConfig::load(cli.config.as_deref()).context("loading solver configuration")?;

    let seed = cli.seed.unwrap_or_else(|| rand::random::<u64>());
    tracing::info!(seed, ?horizon_start, ?horizon_end, "starting solve");

    let instance = solver::solve(horizon_start, horizon_end, roster, shifts, &solver_config, seed)
        .context("solving the schedule")?;

    match cli.out {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("creating output file {}", path.display()))?;
            emitter::emit(&instance, file).context("writing schedule CSV")?;
            tracing::info!(path = %path.display(), "schedule written");
        }
        None => {
            emitter::emit(&instance, std::io::stdout()).context("writing schedule CSV")?;
        }
    }

    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ScheduleError>() {
        Some(ScheduleError::Input { .. }) => 1,
        Some(ScheduleError::Infeasible { .. }) => 2,
        Some(ScheduleError::Invariant(_)) => 70,
        None => 1,
    }
}
