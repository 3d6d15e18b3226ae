//! Per-game artifacts: the score CSV and the optional JSONL game records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use hanabi_core::game::outcome::GameRecord;
use hanabi_core::game::serialization::GameSnapshot;
use serde::Serialize;
use thiserror::Error;

pub const SCORE_HEADER: [&str; 8] = [
    "trial", "policy", "seed", "score", "reason", "turns", "rounds", "finished",
];

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("{context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write score row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to serialize game record: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn create(path: &Path, context: &'static str) -> Result<File, OutputError> {
    File::create(path).map_err(|source| OutputError::Io {
        context,
        path: path.to_path_buf(),
        source,
    })
}

/// One row per (trial, policy) game, header written up front.
pub struct ScoreWriter {
    writer: csv::Writer<BufWriter<File>>,
    rows: usize,
}

impl ScoreWriter {
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        let file = create(path, "creating score file")?;
        let mut writer = csv::Writer::from_writer(BufWriter::new(file));
        writer.write_record(SCORE_HEADER)?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn write_game(
        &mut self,
        trial: usize,
        policy: &str,
        record: &GameRecord,
    ) -> Result<(), OutputError> {
        let outcome = &record.outcome;
        self.writer.write_record([
            trial.to_string(),
            policy.to_string(),
            outcome.seed.to_string(),
            outcome.score.to_string(),
            outcome.reason.as_str().to_string(),
            outcome.turns.to_string(),
            outcome.rounds.to_string(),
            outcome.finished().to_string(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<usize, OutputError> {
        self.writer.flush().map_err(csv::Error::from)?;
        Ok(self.rows)
    }
}

#[derive(Serialize)]
struct RecordLine<'a> {
    trial: usize,
    policy: &'a str,
    #[serde(flatten)]
    snapshot: GameSnapshot,
}

/// Full game records, one JSON object per line.
pub struct RecordWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl RecordWriter {
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        let file = create(path, "creating record file")?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn write_game(
        &mut self,
        trial: usize,
        policy: &str,
        record: &GameRecord,
    ) -> Result<(), OutputError> {
        let line = RecordLine {
            trial,
            policy,
            snapshot: GameSnapshot::capture(record),
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n").map_err(|source| self.io_error(source))
    }

    pub fn finish(mut self) -> Result<(), OutputError> {
        self.writer.flush().map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> OutputError {
        OutputError::Io {
            context: "writing record file",
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanabi_core::game::event::TerminalReason;
    use hanabi_core::game::outcome::Outcome;
    use tempfile::tempdir;

    fn record(seed: u64, score: u8, reason: TerminalReason) -> GameRecord {
        GameRecord {
            outcome: Outcome::new(seed, 3, score, reason, 44),
            turns: Vec::new(),
        }
    }

    #[test]
    fn score_file_has_header_and_one_row_per_game() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("scores.csv");
        let mut writer = ScoreWriter::create(&path).expect("create");
        writer
            .write_game(0, "perfect", &record(11, 23, TerminalReason::FinalRoundComplete))
            .expect("row");
        writer
            .write_game(0, "random", &record(11, 2, TerminalReason::FuseExhausted))
            .expect("row");
        assert_eq!(writer.finish().expect("flush"), 2);

        let text = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "trial,policy,seed,score,reason,turns,rounds,finished",
                "0,perfect,11,23,final_round_complete,44,15,true",
                "0,random,11,2,fuse_exhausted,44,15,false",
            ]
        );
    }

    #[test]
    fn record_lines_carry_trial_and_snapshot() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("records.jsonl");
        let mut writer = RecordWriter::create(&path).expect("create");
        writer
            .write_game(7, "perfect", &record(99, 25, TerminalReason::PerfectScore))
            .expect("write");
        writer.finish().expect("flush");

        let text = std::fs::read_to_string(&path).expect("read back");
        let value: serde_json::Value = serde_json::from_str(text.trim()).expect("json line");
        assert_eq!(value["trial"], 7);
        assert_eq!(value["policy"], "perfect");
        assert_eq!(value["seed"], 99);
        assert_eq!(value["record"]["outcome"]["reason"], "perfect_score");
    }
}
