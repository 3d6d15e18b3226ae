use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use colored::Colorize;
use hanabi_core::game::engine::TurnReport;
use hanabi_core::game::event::{EventClass, GameEvent};
use hanabi_core::game::outcome::GameRecord;

/// Human-readable turn-by-turn log. Colour is presentation only; the text is
/// identical with or without it.
pub struct MoveLog<W: Write> {
    out: W,
    colorize: bool,
}

impl MoveLog<BufWriter<File>> {
    pub fn create(path: &Path, colorize: bool) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?), colorize))
    }
}

impl<W: Write> MoveLog<W> {
    pub fn new(out: W, colorize: bool) -> Self {
        Self { out, colorize }
    }

    pub fn write_game(&mut self, trial: usize, policy: &str, record: &GameRecord) -> io::Result<()> {
        let outcome = &record.outcome;
        let header = format!(
            "game {trial:05} policy {policy} seed {} players {}",
            outcome.seed, outcome.players
        );
        self.emit(header, EventClass::Notice)?;

        for report in &record.turns {
            let mut events = report.events.iter();
            if let Some(primary) = events.next() {
                self.emit(turn_line(trial, report, primary), primary.class())?;
            }
            for event in events {
                self.emit(
                    format!("game {trial:05} turn {:03} {event}", report.turn),
                    event.class(),
                )?;
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn emit(&mut self, line: String, class: EventClass) -> io::Result<()> {
        if !self.colorize {
            return writeln!(self.out, "{line}");
        }
        let painted = match class {
            EventClass::Success => line.green(),
            EventClass::Failure => line.red(),
            EventClass::Neutral => line.yellow(),
            EventClass::Notice => line.bold(),
        };
        writeln!(self.out, "{painted}")
    }
}

/// `game 00003 turn 012 p2 played G3 | fireworks R2 G3 Y1 W0 B0 | fuses 3 | info 8 | deck 21`
pub fn turn_line(trial: usize, report: &TurnReport, primary: &GameEvent) -> String {
    let summary = &report.summary;
    format!(
        "game {trial:05} turn {:03} {primary} | fireworks {} | fuses {} | info {} | deck {}",
        report.turn, summary.fireworks, summary.fuses, summary.info, summary.deck_remaining
    )
}
