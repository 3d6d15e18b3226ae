use super::{Policy, PolicyContext, PolicyKind};
use hanabi_core::game::action::Action;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const STREAM_SALT: u64 = 0x5EED_CA4D_0000_0001;

/// Baseline that plays a uniformly chosen card every turn, without looking.
pub struct RandomPolicy {
    rng: SmallRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed ^ STREAM_SALT),
        }
    }
}

impl Policy for RandomPolicy {
    fn choose_action(&mut self, ctx: &PolicyContext) -> Action {
        let len = ctx.hand().len();
        let index = if len == 0 {
            0
        } else {
            self.rng.gen_range(0..len)
        };
        Action::Play { index }
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Random
    }
}

#[cfg(test)]
mod tests {
    use super::RandomPolicy;
    use crate::policy::play_out;
    use hanabi_core::game::game_loop::GameLoop;

    #[test]
    fn same_seed_same_game() {
        let a = play_out(
            &mut RandomPolicy::new(8),
            GameLoop::new(3, 8).unwrap().with_recording(),
        )
        .unwrap();
        let b = play_out(
            &mut RandomPolicy::new(8),
            GameLoop::new(3, 8).unwrap().with_recording(),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn only_ever_plays() {
        let record = play_out(
            &mut RandomPolicy::new(1),
            GameLoop::new(2, 1).unwrap().with_recording(),
        )
        .unwrap();
        assert!(record.turns.iter().all(|turn| turn.action.is_play()));
    }
}
