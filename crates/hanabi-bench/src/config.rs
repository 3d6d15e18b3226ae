use hanabi_bot::PolicyKind;
use hanabi_bot::policy::UnknownPolicy;
use hanabi_core::model::player::{MAX_PLAYERS, MIN_PLAYERS};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

/// Hard ceiling on trials per run.
pub const MAX_TRIALS: usize = 10_000_000;
const DEFAULT_PLAYERS: usize = 4;
const DEFAULT_CHUNK_SIZE: usize = 4_096;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root benchmark configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub trials: TrialConfig,
    pub policies: Vec<PolicyConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.trials.validate()?;
        validate_policies(&self.policies)?;
        self.outputs.validate(&self.run_id)?;
        self.metrics.validate(&self.policies)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            scores_csv: resolve_template(&self.run_id, &self.outputs.scores_csv),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
            move_log: self
                .outputs
                .move_log
                .as_deref()
                .map(|template| resolve_template(&self.run_id, template)),
            records_jsonl: self
                .outputs
                .records_jsonl
                .as_deref()
                .map(|template| resolve_template(&self.run_id, template)),
        }
    }
}

/// How many games to play and on which table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TrialConfig {
    pub count: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_players")]
    pub players: usize,
    /// Worker threads; rayon picks when unset.
    #[serde(default)]
    pub parallelism: Option<usize>,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl TrialConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::InvalidField {
                field: "trials.count".to_string(),
                message: "number of trials must be greater than zero".to_string(),
            });
        }

        if self.count > MAX_TRIALS {
            return Err(ValidationError::InvalidField {
                field: "trials.count".to_string(),
                message: format!("{} trials exceeds the limit of {MAX_TRIALS}", self.count),
            });
        }

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            return Err(ValidationError::InvalidField {
                field: "trials.players".to_string(),
                message: format!(
                    "player count must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {}",
                    self.players
                ),
            });
        }

        if self.parallelism == Some(0) {
            return Err(ValidationError::InvalidField {
                field: "trials.parallelism".to_string(),
                message: "parallelism must be at least 1".to_string(),
            });
        }

        if self.chunk_size == 0 {
            return Err(ValidationError::InvalidField {
                field: "trials.chunk_size".to_string(),
                message: "chunk size must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    pub fn base_seed(&self) -> u64 {
        self.seed.unwrap_or(0)
    }
}

fn default_players() -> usize {
    DEFAULT_PLAYERS
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// A named policy taking part in the run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PolicyConfig {
    pub name: String,
    pub kind: String,
}

impl PolicyConfig {
    pub fn policy_kind(&self) -> Result<PolicyKind, UnknownPolicy> {
        self.kind.parse()
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub scores_csv: String,
    pub summary_md: String,
    pub plots_dir: String,
    #[serde(default)]
    pub move_log: Option<String>,
    #[serde(default)]
    pub records_jsonl: Option<String>,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        let required = [
            ("outputs.scores_csv", Some(&self.scores_csv)),
            ("outputs.summary_md", Some(&self.summary_md)),
            ("outputs.plots_dir", Some(&self.plots_dir)),
            ("outputs.move_log", self.move_log.as_ref()),
            ("outputs.records_jsonl", self.records_jsonl.as_ref()),
        ];
        for (label, value) in required {
            let Some(value) = value else {
                continue;
            };
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Metrics configuration block.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default)]
    pub baseline: Option<String>,
}

impl MetricsConfig {
    fn validate(&self, policies: &[PolicyConfig]) -> Result<(), ValidationError> {
        let Some(baseline) = self.baseline.as_ref() else {
            return Err(ValidationError::InvalidField {
                field: "metrics.baseline".to_string(),
                message: "baseline policy must be specified".to_string(),
            });
        };

        if !policies.iter().any(|p| &p.name == baseline) {
            return Err(ValidationError::InvalidField {
                field: "metrics.baseline".to_string(),
                message: format!("baseline policy '{baseline}' is not defined in policies list"),
            });
        }

        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    /// ANSI colours in the move log.
    #[serde(default)]
    pub colorize: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            colorize: false,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain letters, digits, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_policies(policies: &[PolicyConfig]) -> Result<(), ValidationError> {
    if policies.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "policies".to_string(),
            message: "at least one policy is required".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for policy in policies {
        if policy.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "policies".to_string(),
                message: "policy names must not be empty".to_string(),
            });
        }

        if !seen.insert(policy.name.as_str()) {
            return Err(ValidationError::InvalidField {
                field: "policies".to_string(),
                message: format!("duplicate policy name '{}'", policy.name),
            });
        }

        policy
            .policy_kind()
            .map_err(|err| ValidationError::InvalidField {
                field: format!("policies.{}.kind", policy.name),
                message: err.to_string(),
            })?;
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub scores_csv: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
    pub move_log: Option<PathBuf>,
    pub records_jsonl: Option<PathBuf>,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
