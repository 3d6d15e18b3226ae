use std::path::PathBuf;

use clap::Parser;

use hanabi_bench::config::{BenchmarkConfig, ResolvedOutputs};
use hanabi_bench::logging::init_logging;
use hanabi_bench::trials::TrialRunner;
use hanabi_core::AppInfo;

/// Batch simulator for perfect-information Hanabi policies.
#[derive(Debug, Parser)]
#[command(
    name = "hanabi-bench",
    author,
    version,
    about = "Deterministic Hanabi perfect-play trial runner"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/hanabi.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of trials to play.
    #[arg(short = 'n', long, value_name = "COUNT")]
    trials: Option<usize>,

    /// Override the number of players at the table (2-5).
    #[arg(short, long, value_name = "PLAYERS")]
    players: Option<usize>,

    /// Override the base RNG seed for deals.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the worker thread count.
    #[arg(short = 'j', long, value_name = "THREADS")]
    parallelism: Option<usize>,

    /// Exit after validating the configuration (no trials are run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(trials) = cli.trials {
        config.trials.count = trials;
    }

    if let Some(players) = cli.players {
        config.trials.players = players;
    }

    if let Some(seed) = cli.seed {
        config.trials.seed = Some(seed);
    }

    if let Some(parallelism) = cli.parallelism {
        config.trials.parallelism = Some(parallelism);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let policy_count = config.policies.len();
    let run_id = config.run_id.clone();
    let trials = config.trials.count;
    let players = config.trials.players;

    println!(
        "{} {}: loaded configuration '{run_id}' with {policy_count} polic{} ({trials} trials, {players} players)",
        AppInfo::name(),
        AppInfo::version(),
        if policy_count == 1 { "y" } else { "ies" }
    );

    let _logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = TrialRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: trials skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} trials × {} policies → {} rows at {}",
        summary.trials,
        summary.policies,
        summary.rows_written,
        summary.scores_path.display()
    );
    for policy in &summary.analytics.policies {
        println!(
            "  {:<12} mean {:.3} [{:.3}, {:.3}]  perfect {:.1}%  failed {:.1}%",
            policy.name,
            policy.mean_score,
            policy.ci95.0,
            policy.ci95.1,
            policy.perfect_rate * 100.0,
            policy.failure_rate * 100.0
        );
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Score histogram: {}", plot_path.display());
    }
    if let Some(move_log) = summary.move_log_path.as_ref() {
        println!("Move log: {}", move_log.display());
    }
    if let Some(records) = summary.records_path.as_ref() {
        println!("Game records: {}", records.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
