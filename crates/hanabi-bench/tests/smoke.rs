use std::fs;
use std::path::Path;

use hanabi_bench::config::BenchmarkConfig;
use hanabi_bench::output::SCORE_HEADER;
use hanabi_bench::trials::{RunSummary, TrialRunner};
use sha2::{Digest, Sha256};
use tempfile::tempdir;

fn load_config(output_dir: &Path, parallelism: usize) -> BenchmarkConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
trials:
  count: 24
  seed: 4242
  players: 3
  parallelism: {parallelism}
  chunk_size: 5
policies:
  - name: "perfect"
    kind: "perfect"
  - name: "random"
    kind: "random"
outputs:
  scores_csv: "{scores}"
  summary_md: "{summary}"
  plots_dir: "{plots}"
  move_log: "{moves}"
  records_jsonl: "{records}"
metrics:
  baseline: "random"
logging:
  enable_structured: false
"#,
        scores = output_dir.join("scores.csv").display(),
        summary = output_dir.join("summary.md").display(),
        plots = output_dir.join("plots").display(),
        moves = output_dir.join("moves.log").display(),
        records = output_dir.join("records.jsonl").display(),
    );

    let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn run(dir: &Path, parallelism: usize) -> RunSummary {
    let config = load_config(dir, parallelism);
    let outputs = config.resolved_outputs();
    let runner = TrialRunner::new(config, outputs).expect("runner created");
    assert_eq!(runner.threads(), parallelism);
    runner.run().expect("run completes")
}

fn digest(path: &Path) -> String {
    let bytes = fs::read(path).expect("artifact readable");
    hex::encode(Sha256::digest(&bytes))
}

#[test]
fn smoke_run_writes_every_artifact() {
    let dir = tempdir().expect("temp dir");
    let summary = run(dir.path(), 2);

    assert_eq!(summary.trials, 24);
    // 24 trials in chunks of 5
    assert_eq!(summary.chunks, 5);
    assert_eq!(summary.policies, 2);
    assert_eq!(summary.rows_written, 48);

    let scores = fs::read_to_string(&summary.scores_path).expect("scores readable");
    let mut lines = scores.lines();
    assert_eq!(lines.next(), Some(SCORE_HEADER.join(",").as_str()));
    let rows: Vec<Vec<&str>> = lines.map(|line| line.split(',').collect()).collect();
    assert_eq!(rows.len(), 48);
    for (i, pair) in rows.chunks(2).enumerate() {
        assert_eq!(pair[0][0], i.to_string());
        assert_eq!(pair[0][1], "perfect");
        assert_eq!(pair[1][1], "random");
        // Both policies face the same deal.
        assert_eq!(pair[0][2], pair[1][2]);
        assert_ne!(pair[0][4], "fuse_exhausted");
    }

    let records = fs::read_to_string(summary.records_path.as_ref().expect("records path"))
        .expect("records readable");
    assert_eq!(records.lines().count(), 48);

    let moves = fs::read_to_string(summary.move_log_path.as_ref().expect("move log path"))
        .expect("move log readable");
    assert!(moves.starts_with("game 00000 policy perfect seed "));
    assert!(moves.contains("game 00023 turn 001 p1 "));
    assert!(!moves.contains('\u{1b}'));

    assert!(summary.summary_path.exists(), "summary markdown missing");
    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("| perfect | perfect | 24 |"));
    assert!(markdown.contains("## Score histogram"));

    let perfect = summary.analytics.policy("perfect").expect("perfect stats");
    let random = summary.analytics.policy("random").expect("random stats");
    assert!(perfect.mean_score > random.mean_score);
    assert_eq!(perfect.failure_rate, 0.0);

    // Plot rendering is optional; ensure any failure surfaces explicitly
    if let Some(plot_path) = summary.plot_path {
        assert!(plot_path.exists(), "plot path reported but missing on disk");
    }
}

#[test]
fn outputs_do_not_depend_on_thread_count() {
    let single = tempdir().expect("temp dir");
    let again = tempdir().expect("temp dir");
    let wide = tempdir().expect("temp dir");

    let first = run(single.path(), 1);
    let second = run(again.path(), 1);
    let parallel = run(wide.path(), 4);

    for artifact in ["scores.csv", "moves.log", "records.jsonl", "summary.md"] {
        let expected = digest(&single.path().join(artifact));
        assert_eq!(expected, digest(&again.path().join(artifact)), "{artifact} differs between runs");
        assert_eq!(expected, digest(&wide.path().join(artifact)), "{artifact} differs across thread counts");
    }
    assert_eq!(first.rows_written, parallel.rows_written);
    assert_eq!(second.rows_written, parallel.rows_written);
}
