use crate::game::action::Action;
use crate::game::engine::{TurnEngine, TurnReport};
use crate::game::error::{InvariantViolation, SetupError};
use crate::game::event::{GameEvent, TerminalReason};
use crate::game::outcome::{GameRecord, Outcome};
use crate::game::state::GameState;
use crate::model::deck::Deck;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    FinalRound(usize),
    Ended(Outcome),
}

impl GamePhase {
    pub fn is_ended(&self) -> bool {
        matches!(self, GamePhase::Ended(_))
    }
}

/// Drives turns until the engine reports game over.
///
/// The loop keeps its own view of the final-round countdown, fed only by the
/// events of each turn, and refuses to continue if it ever disagrees with the
/// engine.
#[derive(Debug, Clone)]
pub struct GameLoop {
    state: GameState,
    phase: GamePhase,
    seed: u64,
    history: Option<Vec<TurnReport>>,
}

impl GameLoop {
    pub fn new(players: usize, seed: u64) -> Result<Self, SetupError> {
        Ok(Self::from_state(GameState::new(players, seed)?, seed))
    }

    pub fn from_deck(deck: Deck, players: usize, seed: u64) -> Result<Self, SetupError> {
        Ok(Self::from_state(GameState::deal(deck, players)?, seed))
    }

    pub fn from_state(state: GameState, seed: u64) -> Self {
        Self {
            state,
            phase: GamePhase::Playing,
            seed,
            history: None,
        }
    }

    /// Keep every [`TurnReport`] for the returned [`GameRecord`].
    pub fn with_recording(mut self) -> Self {
        self.history = Some(Vec::new());
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> &GamePhase {
        &self.phase
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Play a single turn with the action chosen by `choose`.
    pub fn step<F>(&mut self, choose: F) -> Result<TurnReport, InvariantViolation>
    where
        F: FnOnce(&GameState) -> Action,
    {
        if let GamePhase::Ended(outcome) = &self.phase {
            return Err(InvariantViolation::GameAlreadyOver {
                reason: Some(outcome.reason),
            });
        }
        if self.state.turns_taken() >= self.state.turn_limit() {
            return Err(InvariantViolation::TurnLimitExceeded {
                limit: self.state.turn_limit(),
            });
        }

        let action = choose(&self.state);
        let report = TurnEngine::apply(&mut self.state, action)?;
        self.phase = self.react(&report)?;

        if let Some(history) = self.history.as_mut() {
            history.push(report.clone());
        }
        Ok(report)
    }

    /// Play to the end and return exactly one outcome.
    pub fn run<F>(mut self, mut choose: F) -> Result<GameRecord, InvariantViolation>
    where
        F: FnMut(&GameState) -> Action,
    {
        loop {
            self.step(&mut choose)?;
            if let GamePhase::Ended(outcome) = self.phase {
                return Ok(GameRecord {
                    outcome,
                    turns: self.history.unwrap_or_default(),
                });
            }
        }
    }

    fn react(&self, report: &TurnReport) -> Result<GamePhase, InvariantViolation> {
        let players = self.state.player_count();
        let mut next = match self.phase {
            GamePhase::Playing => GamePhase::Playing,
            GamePhase::FinalRound(remaining) => GamePhase::FinalRound(remaining.saturating_sub(1)),
            GamePhase::Ended(outcome) => {
                return Err(InvariantViolation::GameAlreadyOver {
                    reason: Some(outcome.reason),
                });
            }
        };

        for event in &report.events {
            match *event {
                GameEvent::DeckExhausted { .. } => {
                    if next != GamePhase::Playing {
                        return Err(InvariantViolation::RepeatedExhaustion);
                    }
                    // The exhausting turn is the first of the final round.
                    next = GamePhase::FinalRound(players - 1);
                }
                GameEvent::GameOver { reason, score } => {
                    if reason == TerminalReason::FinalRoundComplete
                        && next != GamePhase::FinalRound(0)
                    {
                        return Err(self.countdown_mismatch(&next));
                    }
                    next = GamePhase::Ended(Outcome::new(
                        self.seed,
                        players,
                        score,
                        reason,
                        self.state.turns_taken(),
                    ));
                }
                GameEvent::CardPlayed { .. }
                | GameEvent::CardMisplayed { .. }
                | GameEvent::CardDiscarded { .. } => {}
            }
        }

        let engine_remaining = self.state.final_round_remaining();
        match &next {
            GamePhase::FinalRound(0) => Err(self.countdown_mismatch(&next)),
            GamePhase::FinalRound(remaining) if engine_remaining != Some(*remaining) => {
                Err(self.countdown_mismatch(&next))
            }
            _ => Ok(next),
        }
    }

    fn countdown_mismatch(&self, next: &GamePhase) -> InvariantViolation {
        let loop_remaining = match next {
            GamePhase::FinalRound(remaining) => Some(*remaining),
            GamePhase::Playing | GamePhase::Ended(_) => None,
        };
        InvariantViolation::CountdownMismatch {
            loop_remaining,
            engine_remaining: self.state.final_round_remaining(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GameLoop, GamePhase};
    use crate::game::action::Action;
    use crate::game::event::{GameEvent, TerminalReason};
    use crate::game::state::GameState;
    use crate::model::deck::{Deck, FULL_DECK_SIZE};

    fn discard_oldest(_: &GameState) -> Action {
        Action::Discard { index: 0 }
    }

    #[test]
    fn discarding_everything_runs_full_final_round() {
        for players in 2..=5 {
            let game = GameLoop::new(players, 99).unwrap().with_recording();
            let record = game.run(discard_oldest).unwrap();
            let outcome = record.outcome;

            assert_eq!(outcome.reason, TerminalReason::FinalRoundComplete);
            assert_eq!(outcome.score, 0);
            assert_eq!(record.turns.len() as u32, outcome.turns);

            let dealt = FULL_DECK_SIZE - record.turns[0].summary.deck_remaining - 1;
            let expected = (FULL_DECK_SIZE - dealt + players) as u32;
            assert_eq!(outcome.turns, expected, "{players} players");

            let exhausted: Vec<_> = record
                .turns
                .iter()
                .filter(|turn| turn.exhausted_deck())
                .collect();
            assert_eq!(exhausted.len(), 1);
            assert_eq!(
                outcome.turns - exhausted[0].turn + 1,
                players as u32,
                "every player acts once after exhaustion"
            );
        }
    }

    #[test]
    fn phase_moves_through_final_round() {
        let mut game = GameLoop::new(3, 4).unwrap();
        while game.state().deck_remaining() > 0 {
            game.step(discard_oldest).unwrap();
            assert_eq!(game.phase(), &GamePhase::Playing);
        }
        let report = game.step(discard_oldest).unwrap();
        assert!(matches!(report.events[1], GameEvent::DeckExhausted { .. }));
        assert_eq!(game.phase(), &GamePhase::FinalRound(2));
        game.step(discard_oldest).unwrap();
        assert_eq!(game.phase(), &GamePhase::FinalRound(1));
        game.step(discard_oldest).unwrap();
        assert!(game.phase().is_ended());
        assert!(game.step(discard_oldest).is_err());
    }

    #[test]
    fn recording_is_opt_in() {
        let record = GameLoop::new(2, 5).unwrap().run(discard_oldest).unwrap();
        assert!(record.turns.is_empty());
        assert_eq!(record.outcome.seed, 5);
    }

    fn misplay(state: &GameState) -> Action {
        let index = state
            .hand(state.active_player())
            .iter()
            .position(|&card| !state.fireworks().is_playable(card))
            .expect("an unplayable card in hand");
        Action::Play { index }
    }

    #[test]
    fn last_fuse_during_final_round_ends_immediately() {
        let deck = Deck::stacked(&[]).unwrap();
        let mut game = GameLoop::from_deck(deck, 5, 8).unwrap();

        for _ in 0..2 {
            let report = game.step(misplay).unwrap();
            assert!(matches!(report.events[0], GameEvent::CardMisplayed { .. }));
        }
        assert_eq!(game.state().tokens().fuses(), 1);

        while game.phase() == &GamePhase::Playing {
            game.step(discard_oldest).unwrap();
        }
        assert_eq!(game.phase(), &GamePhase::FinalRound(4));
        let turns_before = game.state().turns_taken();

        let report = game.step(misplay).unwrap();
        assert!(matches!(report.events[0], GameEvent::CardMisplayed { fuses_left: 0, .. }));
        assert_eq!(report.game_over(), Some((TerminalReason::FuseExhausted, 0)));
        match game.phase() {
            GamePhase::Ended(outcome) => {
                assert_eq!(outcome.reason, TerminalReason::FuseExhausted);
                assert_eq!(outcome.turns, turns_before + 1);
                assert!(!outcome.finished());
            }
            other => panic!("expected the game to end, got {other:?}"),
        }
        assert_eq!(game.state().final_round_remaining(), Some(4));
    }
}
