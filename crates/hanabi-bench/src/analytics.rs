use std::fs;
use std::path::{Path, PathBuf};

use hanabi_core::game::event::TerminalReason;
use hanabi_core::game::outcome::Outcome;
use hanabi_core::model::fireworks::MAX_SCORE;
use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::BenchmarkConfig;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI
const HISTOGRAM_BINS: usize = MAX_SCORE as usize + 1;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline policy '{0}' not present in run results")]
    MissingBaseline(String),
    #[error("policy '{0}' recorded but missing from configuration")]
    UnknownPolicy(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// Accumulates outcomes per policy in trial order.
pub struct AnalyticsCollector {
    baseline: String,
    policies: Vec<PolicyAccumulator>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let policies: Vec<PolicyAccumulator> = config
            .policies
            .iter()
            .map(|policy| PolicyAccumulator::new(policy.name.clone(), policy.kind.clone()))
            .collect();

        if !policies.iter().any(|p| p.name == baseline) {
            return Err(AnalyticsError::MissingBaseline(baseline));
        }

        Ok(Self { baseline, policies })
    }

    pub fn record_game(&mut self, policy: &str, outcome: &Outcome) -> Result<(), AnalyticsError> {
        let acc = self
            .policies
            .iter_mut()
            .find(|acc| acc.name == policy)
            .ok_or_else(|| AnalyticsError::UnknownPolicy(policy.to_string()))?;
        acc.record(outcome);
        Ok(())
    }

    pub fn finalize(self) -> Result<AnalyticsSummary, AnalyticsError> {
        let baseline_scores = self
            .policies
            .iter()
            .find(|acc| acc.name == self.baseline)
            .map(|acc| acc.scores.clone())
            .ok_or_else(|| AnalyticsError::MissingBaseline(self.baseline.clone()))?;

        let mut comparisons = Vec::with_capacity(self.policies.len());
        for acc in &self.policies {
            if acc.name == self.baseline {
                comparisons.push(ComparisonReport {
                    policy: acc.name.clone(),
                    p_value: 1.0,
                    sample_size: acc.scores.len(),
                });
                continue;
            }
            // Every policy plays the same trials in the same order.
            let diffs = acc
                .scores
                .iter()
                .zip(&baseline_scores)
                .map(|(score, base)| score - base);
            let (p_value, sample_size) = wilcoxon_signed_rank(diffs);
            comparisons.push(ComparisonReport {
                policy: acc.name.clone(),
                p_value,
                sample_size,
            });
        }

        let reports: Vec<PolicyReport> = self
            .policies
            .into_iter()
            .map(PolicyAccumulator::into_report)
            .collect();

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            policies: reports,
            comparisons,
        }
        .enrich())
    }
}

struct PolicyAccumulator {
    name: String,
    kind: String,
    scores: Vec<f64>,
    histogram: [usize; HISTOGRAM_BINS],
    reasons: [usize; TerminalReason::ALL.len()],
    total_turns: u64,
    total_rounds: u64,
}

impl PolicyAccumulator {
    fn new(name: String, kind: String) -> Self {
        Self {
            name,
            kind,
            scores: Vec::new(),
            histogram: [0; HISTOGRAM_BINS],
            reasons: [0; TerminalReason::ALL.len()],
            total_turns: 0,
            total_rounds: 0,
        }
    }

    fn record(&mut self, outcome: &Outcome) {
        self.scores.push(f64::from(outcome.score));
        if let Some(bin) = self.histogram.get_mut(usize::from(outcome.score)) {
            *bin += 1;
        }
        if let Some(slot) = TerminalReason::ALL
            .iter()
            .position(|reason| *reason == outcome.reason)
        {
            self.reasons[slot] += 1;
        }
        self.total_turns += u64::from(outcome.turns);
        self.total_rounds += u64::from(outcome.rounds);
    }

    fn into_report(self) -> PolicyReport {
        let games = self.scores.len();
        let ratio = |count: usize| {
            if games == 0 {
                0.0
            } else {
                count as f64 / games as f64
            }
        };

        let mean = mean(&self.scores);
        let (ci_low, ci_high) = confidence_interval(&self.scores);
        let reasons = TerminalReason::ALL
            .iter()
            .zip(self.reasons)
            .map(|(reason, count)| ReasonCount {
                reason: *reason,
                count,
            })
            .collect();
        let perfect = self.histogram[MAX_SCORE as usize];
        let failures = TerminalReason::ALL
            .iter()
            .position(|reason| *reason == TerminalReason::FuseExhausted)
            .map(|slot| self.reasons[slot])
            .unwrap_or(0);

        PolicyReport {
            name: self.name,
            kind: self.kind,
            games,
            mean_score: mean,
            ci95: (ci_low, ci_high),
            median_score: median(&self.scores),
            min_score: self.scores.iter().copied().reduce(f64::min).unwrap_or(0.0),
            max_score: self.scores.iter().copied().reduce(f64::max).unwrap_or(0.0),
            std_dev: sample_std_dev(&self.scores),
            perfect_rate: ratio(perfect),
            failure_rate: ratio(failures),
            mean_turns: ratio(self.total_turns as usize),
            mean_rounds: ratio(self.total_rounds as usize),
            reasons,
            histogram: self.histogram.to_vec(),
            delta_vs_baseline: 0.0, // filled by `enrich`
        }
    }
}

fn wilcoxon_signed_rank(diffs: impl Iterator<Item = f64>) -> (f64, usize) {
    let diffs: Vec<f64> = diffs.filter(|d| d.abs() > f64::EPSILON).collect();
    let n = diffs.len();
    if n == 0 {
        return (1.0, 0);
    }

    let mut paired: Vec<(f64, f64)> = diffs.into_iter().map(|d| (d.abs(), d.signum())).collect();
    paired.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Average ranks across ties.
    let mut ranks = Vec::with_capacity(n);
    let mut tie_sizes = Vec::new();
    let mut i = 0;
    while i < paired.len() {
        let mut j = i;
        while j + 1 < paired.len() && (paired[j + 1].0 - paired[i].0).abs() < 1e-12 {
            j += 1;
        }
        let rank = (i + j + 2) as f64 / 2.0;
        for (_, sign) in &paired[i..=j] {
            ranks.push((rank, *sign));
        }
        if j > i {
            tie_sizes.push(j - i + 1);
        }
        i = j + 1;
    }

    let w_plus: f64 = ranks
        .iter()
        .filter(|(_, sign)| *sign > 0.0)
        .map(|(rank, _)| *rank)
        .sum();
    let w_minus: f64 = ranks
        .iter()
        .filter(|(_, sign)| *sign < 0.0)
        .map(|(rank, _)| *rank)
        .sum();

    let w = w_plus.min(w_minus);
    let n_f = n as f64;
    let mean_w = n_f * (n_f + 1.0) / 4.0;

    let tie_adjustment: f64 = tie_sizes
        .into_iter()
        .map(|count| {
            let c = count as f64;
            (c.powi(3) - c) / 48.0
        })
        .sum();
    let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
    if variance_w <= 0.0 {
        return (1.0, n);
    }

    let z = ((w - mean_w).abs() - 0.5) / variance_w.sqrt();
    let Ok(normal) = Normal::new(0.0, 1.0) else {
        return (1.0, n);
    };
    let p = 2.0 * (1.0 - normal.cdf(z));
    (p.clamp(0.0, 1.0), n)
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub policies: Vec<PolicyReport>,
    pub comparisons: Vec<ComparisonReport>,
}

impl AnalyticsSummary {
    pub fn enrich(mut self) -> Self {
        let baseline_mean = self
            .policies
            .iter()
            .find(|policy| policy.name == self.baseline)
            .map(|policy| policy.mean_score)
            .unwrap_or(0.0);

        for policy in &mut self.policies {
            policy.delta_vs_baseline = policy.mean_score - baseline_mean;
        }

        self
    }

    pub fn policy(&self, name: &str) -> Option<&PolicyReport> {
        self.policies.iter().find(|policy| policy.name == name)
    }

    pub fn to_markdown(&self) -> String {
        let mut rows = String::new();
        rows.push_str("# Hanabi Simulation Summary\n\n");
        rows.push_str(&format!("Baseline policy: `{}`\n\n", self.baseline));
        rows.push_str("| Policy | Kind | Games | Mean | Δ vs baseline | 95% CI | Median | Min | Max | Std dev | Perfect % | Failure % | Mean turns | Mean rounds | p-value |\n");
        rows.push_str("|--------|------|-------|------|----------------|--------|--------|-----|-----|---------|-----------|-----------|------------|-------------|---------|\n");

        for policy in &self.policies {
            let p_value = self
                .comparisons
                .iter()
                .find(|c| c.policy == policy.name)
                .map(|c| c.p_value)
                .unwrap_or(1.0);

            rows.push_str(&format!(
                "| {name} | {kind} | {games} | {mean:.3} | {delta:+.3} | [{ci_low:.3}, {ci_high:.3}] | {median:.1} | {min:.0} | {max:.0} | {std:.3} | {perfect:.1}% | {failure:.1}% | {turns:.2} | {rounds:.2} | {pval:.3} |\n",
                name = policy.name,
                kind = policy.kind,
                games = policy.games,
                mean = policy.mean_score,
                delta = policy.delta_vs_baseline,
                ci_low = policy.ci95.0,
                ci_high = policy.ci95.1,
                median = policy.median_score,
                min = policy.min_score,
                max = policy.max_score,
                std = policy.std_dev,
                perfect = policy.perfect_rate * 100.0,
                failure = policy.failure_rate * 100.0,
                turns = policy.mean_turns,
                rounds = policy.mean_rounds,
                pval = p_value,
            ));
        }

        rows.push_str("\n## Terminal reasons\n\n| Policy |");
        for reason in TerminalReason::ALL {
            rows.push_str(&format!(" {reason} |"));
        }
        rows.push_str("\n|--------|");
        rows.push_str(&"---|".repeat(TerminalReason::ALL.len()));
        rows.push('\n');
        for policy in &self.policies {
            rows.push_str(&format!("| {} |", policy.name));
            for entry in &policy.reasons {
                rows.push_str(&format!(" {} |", entry.count));
            }
            rows.push('\n');
        }

        rows.push_str("\n## Score histogram\n\n| Score |");
        for policy in &self.policies {
            rows.push_str(&format!(" {} |", policy.name));
        }
        rows.push_str("\n|-------|");
        rows.push_str(&"---|".repeat(self.policies.len()));
        rows.push('\n');
        for score in 0..HISTOGRAM_BINS {
            if self.policies.iter().all(|p| p.histogram[score] == 0) {
                continue;
            }
            rows.push_str(&format!("| {score} |"));
            for policy in &self.policies {
                rows.push_str(&format!(" {} |", policy.histogram[score]));
            }
            rows.push('\n');
        }

        rows
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.to_markdown()).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("score_histogram.png");
        let policies_snapshot = self.policies.clone();

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let policies = policies_snapshot;
            let y_max = policies
                .iter()
                .flat_map(|p| p.histogram.iter().copied())
                .max()
                .unwrap_or(0)
                .max(1) as f64;
            let width = 0.8 / policies.len().max(1) as f64;

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Final score distribution", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 40)
                .build_cartesian_2d(-0.5f64..(MAX_SCORE as f64 + 0.5), 0.0..(y_max * 1.1))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("Games")
                .x_desc("Score")
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            for (idx, policy) in policies.iter().enumerate() {
                let color = Palette99::pick(idx).mix(0.9);
                let offset = -0.4 + idx as f64 * width;
                chart
                    .draw_series(policy.histogram.iter().enumerate().map(|(score, count)| {
                        let left = score as f64 + offset;
                        Rectangle::new(
                            [(left, 0.0), (left + width, *count as f64)],
                            color.filled(),
                        )
                    }))
                    .map_err(|e| AnalyticsError::Plot(e.to_string()))?
                    .label(policy.name.clone())
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                    });
            }

            chart
                .configure_series_labels()
                .border_style(&BLACK)
                .background_style(&WHITE.mix(0.8))
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyReport {
    pub name: String,
    pub kind: String,
    pub games: usize,
    pub mean_score: f64,
    pub ci95: (f64, f64),
    pub median_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub std_dev: f64,
    pub perfect_rate: f64,
    pub failure_rate: f64,
    pub mean_turns: f64,
    pub mean_rounds: f64,
    pub reasons: Vec<ReasonCount>,
    pub histogram: Vec<usize>,
    #[serde(skip)]
    pub delta_vs_baseline: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReasonCount {
    pub reason: TerminalReason,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub policy: String,
    pub p_value: f64,
    pub sample_size: usize,
}

fn mean(points: &[f64]) -> f64 {
    if points.is_empty() {
        0.0
    } else {
        points.iter().sum::<f64>() / points.len() as f64
    }
}

fn median(points: &[f64]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let mut sorted = points.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn sample_std_dev(points: &[f64]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mean = mean(points);
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    variance.sqrt()
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = mean(points);
    if points.len() == 1 {
        return (mean, mean);
    }
    let std_error = sample_std_dev(points) / (points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}
