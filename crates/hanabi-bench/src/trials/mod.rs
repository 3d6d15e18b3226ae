mod seeds;

pub use seeds::trial_seed;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hanabi_bot::PolicyKind;
use hanabi_bot::policy::{UnknownPolicy, play_out};
use hanabi_core::game::error::{InvariantViolation, SetupError};
use hanabi_core::game::game_loop::GameLoop;
use hanabi_core::game::outcome::GameRecord;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError, AnalyticsSummary};
use crate::config::{BenchmarkConfig, PolicyConfig, ResolvedOutputs};
use crate::logging::telemetry_path;
use crate::movelog::MoveLog;
use crate::output::{OutputError, RecordWriter, ScoreWriter};

/// Plays every configured policy over the same sequence of seeded deals.
pub struct TrialRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    policies: Vec<PolicyBlueprint>,
    pool: ThreadPool,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub trials: usize,
    /// Ordered batches the trials were played in.
    pub chunks: usize,
    pub policies: usize,
    pub rows_written: usize,
    pub scores_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub move_log_path: Option<PathBuf>,
    pub records_path: Option<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
    pub analytics: AnalyticsSummary,
}

impl TrialRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let policies = PolicyBlueprint::from_configs(&config.policies)?;

        let mut builder = ThreadPoolBuilder::new()
            .thread_name(|index| format!("hanabi-trial-{index}"));
        if let Some(threads) = config.trials.parallelism {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;

        Ok(Self {
            config,
            outputs,
            policies,
            pool,
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every trial, streaming per-game rows to disk in trial order.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        let trials = &self.config.trials;
        let mut context = RunContext::open(&self.config, &self.outputs)?;

        event!(
            target: "hanabi_bench::run",
            Level::INFO,
            run_id = %self.config.run_id,
            trials = trials.count,
            players = trials.players,
            threads = self.threads(),
            "run started"
        );

        let base_seed = trials.base_seed();
        let recording = context.wants_turns();
        let mut start = 0;
        let mut chunks = 0;
        while start < trials.count {
            let end = (start + trials.chunk_size).min(trials.count);
            let results: Vec<Result<TrialResult, RunnerError>> = self.pool.install(|| {
                (start..end)
                    .into_par_iter()
                    .map(|index| self.play_trial(index, base_seed, recording))
                    .collect()
            });
            for result in results {
                context.absorb(&self.policies, &result?)?;
            }
            start = end;
            chunks += 1;
            event!(
                target: "hanabi_bench::run",
                Level::INFO,
                completed = end,
                total = trials.count,
                chunk = chunks,
                "trials progress"
            );
        }

        let (rows_written, analytics) = context.finish()?;
        analytics.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match analytics.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                event!(target: "hanabi_bench::run", Level::WARN, error = %err, "plot skipped");
                eprintln!("WARN: {}", err);
                None
            }
        };

        event!(
            target: "hanabi_bench::run",
            Level::INFO,
            run_id = %self.config.run_id,
            rows_written,
            "run complete"
        );

        Ok(RunSummary {
            trials: trials.count,
            chunks,
            policies: self.policies.len(),
            rows_written,
            scores_path: self.outputs.scores_csv.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            move_log_path: self.outputs.move_log.clone(),
            records_path: self.outputs.records_jsonl.clone(),
            telemetry_path: self
                .config
                .logging
                .enable_structured
                .then(|| telemetry_path(&self.outputs)),
            analytics,
        })
    }

    fn play_trial(
        &self,
        index: usize,
        base_seed: u64,
        recording: bool,
    ) -> Result<TrialResult, RunnerError> {
        let seed = trial_seed(base_seed, index);
        let players = self.config.trials.players;

        let mut games = Vec::with_capacity(self.policies.len());
        for blueprint in &self.policies {
            let mut game =
                GameLoop::new(players, seed).map_err(|source| RunnerError::Setup { source })?;
            if recording {
                game = game.with_recording();
            }
            let mut policy = blueprint.kind.spawn(seed);
            let record =
                play_out(policy.as_mut(), game).map_err(|source| RunnerError::Invariant {
                    trial: index,
                    seed,
                    policy: blueprint.name.clone(),
                    source,
                })?;

            if tracing::enabled!(target: "hanabi_bench::game", Level::DEBUG) {
                let outcome = &record.outcome;
                event!(
                    target: "hanabi_bench::game",
                    Level::DEBUG,
                    trial = index,
                    seed,
                    policy = %blueprint.name,
                    score = outcome.score,
                    reason = outcome.reason.as_str(),
                    turns = outcome.turns,
                    "game finished"
                );
            }
            games.push(record);
        }

        Ok(TrialResult { index, games })
    }
}

/// Games of one trial, one per policy in configuration order.
struct TrialResult {
    index: usize,
    games: Vec<GameRecord>,
}

/// Run-scoped sinks. Filled in trial order, flushed once.
pub struct RunContext {
    scores: ScoreWriter,
    moves: Option<MoveLog<BufWriter<File>>>,
    records: Option<RecordWriter>,
    analytics: AnalyticsCollector,
}

impl RunContext {
    pub fn open(config: &BenchmarkConfig, outputs: &ResolvedOutputs) -> Result<Self, RunnerError> {
        ensure_parent(outputs.scores_csv.parent())?;
        ensure_parent(outputs.summary_md.parent())?;

        let moves = match outputs.move_log.as_ref() {
            Some(path) => {
                ensure_parent(path.parent())?;
                Some(MoveLog::create(path, config.logging.colorize)?)
            }
            None => None,
        };
        let records = match outputs.records_jsonl.as_ref() {
            Some(path) => {
                ensure_parent(path.parent())?;
                Some(RecordWriter::create(path)?)
            }
            None => None,
        };

        Ok(Self {
            scores: ScoreWriter::create(&outputs.scores_csv)?,
            moves,
            records,
            analytics: AnalyticsCollector::new(config)?,
        })
    }

    /// Per-turn history is only kept when something will print it.
    pub fn wants_turns(&self) -> bool {
        self.moves.is_some() || self.records.is_some()
    }

    fn absorb(&mut self, policies: &[PolicyBlueprint], trial: &TrialResult) -> Result<(), RunnerError> {
        for (blueprint, record) in policies.iter().zip(&trial.games) {
            self.record_game(trial.index, &blueprint.name, record)?;
        }
        Ok(())
    }

    pub fn record_game(
        &mut self,
        trial: usize,
        policy: &str,
        record: &GameRecord,
    ) -> Result<(), RunnerError> {
        self.scores.write_game(trial, policy, record)?;
        if let Some(moves) = self.moves.as_mut() {
            moves.write_game(trial, policy, record)?;
        }
        if let Some(records) = self.records.as_mut() {
            records.write_game(trial, policy, record)?;
        }
        self.analytics.record_game(policy, &record.outcome)?;
        Ok(())
    }

    /// Flush every sink; returns the CSV row count and the finished statistics.
    pub fn finish(self) -> Result<(usize, AnalyticsSummary), RunnerError> {
        let rows = self.scores.finish()?;
        if let Some(moves) = self.moves {
            moves.finish()?;
        }
        if let Some(records) = self.records {
            records.finish()?;
        }
        Ok((rows, self.analytics.finalize()?))
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

struct PolicyBlueprint {
    name: String,
    kind: PolicyKind,
}

impl PolicyBlueprint {
    fn from_configs(configs: &[PolicyConfig]) -> Result<Vec<Self>, RunnerError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &PolicyConfig) -> Result<Self, RunnerError> {
        let kind = config
            .policy_kind()
            .map_err(|source| RunnerError::Policy {
                name: config.name.clone(),
                source,
            })?;
        Ok(Self {
            name: config.name.clone(),
            kind,
        })
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("policy '{name}': {source}")]
    Policy {
        name: String,
        #[source]
        source: UnknownPolicy,
    },
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] ThreadPoolBuildError),
    #[error("{0}")]
    Output(#[from] OutputError),
    #[error("game setup failed: {source}")]
    Setup {
        #[source]
        source: SetupError,
    },
    #[error("trial {trial} (seed {seed}, policy '{policy}') broke an invariant: {source}")]
    Invariant {
        trial: usize,
        seed: u64,
        policy: String,
        #[source]
        source: InvariantViolation,
    },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}
