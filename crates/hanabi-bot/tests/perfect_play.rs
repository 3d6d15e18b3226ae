use hanabi_bot::{PerfectPlayPolicy, Policy, PolicyContext, PolicyKind};
use hanabi_bot::policy::play_out;
use hanabi_core::game::action::Action;
use hanabi_core::game::event::{GameEvent, TerminalReason};
use hanabi_core::game::game_loop::GameLoop;
use hanabi_core::model::card::Card;
use hanabi_core::model::color::Color;
use hanabi_core::model::deck::{Deck, FULL_DECK_SIZE};
use hanabi_core::model::fireworks::MAX_SCORE;
use hanabi_core::model::player::PlayerId;
use hanabi_core::model::rank::Rank;

fn card(color: Color, rank: Rank) -> Card {
    Card::new(color, rank)
}

#[test]
fn opening_turns_play_then_discard() {
    let front = [
        // p1
        card(Color::Red, Rank::One),
        card(Color::Green, Rank::Three),
        card(Color::Yellow, Rank::Four),
        card(Color::White, Rank::Four),
        card(Color::Blue, Rank::Four),
        // p2
        card(Color::Blue, Rank::One),
        card(Color::Red, Rank::Three),
        card(Color::Green, Rank::Four),
        card(Color::Yellow, Rank::Three),
        card(Color::White, Rank::Three),
        // p3
        card(Color::Red, Rank::Three),
        card(Color::Green, Rank::Two),
        card(Color::Yellow, Rank::Two),
        card(Color::White, Rank::Two),
        card(Color::Blue, Rank::Three),
    ];
    let mut game = GameLoop::from_deck(Deck::stacked(&front).unwrap(), 3, 0).unwrap();
    let mut policy = PerfectPlayPolicy::new();

    let mut events = Vec::new();
    for _ in 0..3 {
        let report = game
            .step(|state| policy.choose_action(&PolicyContext::new(state)))
            .unwrap();
        events.push(report.events[0]);
    }

    let p1 = PlayerId::FIRST;
    let p2 = p1.next(3);
    let p3 = p2.next(3);
    assert_eq!(
        events,
        vec![
            GameEvent::CardPlayed {
                player: p1,
                card: card(Color::Red, Rank::One),
                completed: false
            },
            GameEvent::CardPlayed {
                player: p2,
                card: card(Color::Blue, Rank::One),
                completed: false
            },
            // p3 holds nothing playable; its red three is also in p2's hand.
            GameEvent::CardDiscarded {
                player: p3,
                card: card(Color::Red, Rank::Three)
            },
        ]
    );
}

#[test]
fn perfect_score_ends_the_game_at_once() {
    let front: Vec<Card> = Color::ALL
        .iter()
        .flat_map(|&color| Rank::ORDERED.into_iter().map(move |rank| card(color, rank)))
        .collect();
    let game = GameLoop::from_deck(Deck::stacked(&front).unwrap(), 2, 0)
        .unwrap()
        .with_recording();
    let record = play_out(&mut PerfectPlayPolicy::new(), game).unwrap();

    assert_eq!(record.outcome.reason, TerminalReason::PerfectScore);
    assert_eq!(record.outcome.score, MAX_SCORE);
    let last = record.turns.last().expect("at least one turn");
    assert_eq!(
        last.events.last(),
        Some(&GameEvent::GameOver {
            reason: TerminalReason::PerfectScore,
            score: MAX_SCORE
        })
    );
    // The final play skips the refill draw and the deck never ran out.
    assert_eq!(last.drawn, None);
    assert!(record.turns.iter().all(|turn| !turn.exhausted_deck()));
    assert!(last.summary.deck_remaining > 0);
}

#[test]
fn never_discards_while_holding_a_playable_card() {
    for seed in 0..150u64 {
        let players = 2 + (seed as usize % 4);
        let mut game = GameLoop::new(players, seed).unwrap();
        let mut policy = PerfectPlayPolicy::new();
        while !game.phase().is_ended() {
            let holds_playable = {
                let state = game.state();
                state
                    .hand(state.active_player())
                    .iter()
                    .any(|&c| state.fireworks().is_playable(c))
            };
            let report = game
                .step(|state| policy.choose_action(&PolicyContext::new(state)))
                .unwrap();
            if holds_playable {
                assert!(
                    matches!(report.action, Action::Play { .. }),
                    "seed {seed} turn {}: discarded while a play was available",
                    report.turn
                );
            }
            assert!(
                !matches!(report.events[0], GameEvent::CardMisplayed { .. }),
                "seed {seed}: perfect play misplayed"
            );
        }
    }
}

#[test]
fn perfect_games_end_cleanly_and_within_bounds() {
    for seed in 0..200u64 {
        let players = 2 + (seed as usize % 4);
        let mut policy = PolicyKind::Perfect.spawn(seed);
        let record = play_out(policy.as_mut(), GameLoop::new(players, seed).unwrap()).unwrap();
        let outcome = record.outcome;
        assert!(outcome.score <= MAX_SCORE);
        assert!(outcome.turns as usize <= FULL_DECK_SIZE + players);
        assert_ne!(outcome.reason, TerminalReason::FuseExhausted);
        if outcome.reason == TerminalReason::PerfectScore {
            assert_eq!(outcome.score, MAX_SCORE);
        }
    }
}

#[test]
fn perfect_play_beats_random_play() {
    let mut perfect_total = 0u32;
    let mut random_total = 0u32;
    for seed in 0..100u64 {
        for (kind, total) in [
            (PolicyKind::Perfect, &mut perfect_total),
            (PolicyKind::Random, &mut random_total),
        ] {
            let mut policy = kind.spawn(seed);
            let record = play_out(policy.as_mut(), GameLoop::new(4, seed).unwrap()).unwrap();
            *total += u32::from(record.outcome.score);
        }
    }
    assert!(perfect_total > random_total * 2);
}
