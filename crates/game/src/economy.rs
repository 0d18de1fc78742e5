//! Pure payout rules. The resolver emits raw deltas; clamping happens when a
//! delta is merged into [`crate::state::GameState`].

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissionOutcome {
    Success,
    Timeout,
}

impl MissionOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, MissionOutcome::Success)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EconomyDelta {
    pub money: i64,
    pub heat: i32,
    pub frags: i64,
}

impl EconomyDelta {
    pub const ZERO: EconomyDelta = EconomyDelta {
        money: 0,
        heat: 0,
        frags: 0,
    };

    pub const fn new(money: i64, heat: i32, frags: i64) -> Self {
        Self { money, heat, frags }
    }

    pub const fn heat(heat: i32) -> Self {
        Self::new(0, heat, 0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayoutModifiers {
    pub boss: bool,
    pub bargain: bool,
}

const SUCCESS_MONEY_PER_SCORE: i64 = 3;
const SUCCESS_MONEY_BONUS: i64 = 20;
const SUCCESS_FRAG_BONUS: i64 = 1;
const SUCCESS_HEAT: i32 = 6;
const FAILURE_MONEY_PER_SCORE: i64 = 1;
const FAILURE_HEAT: i32 = 2;
const BOSS_MULTIPLIER: i64 = 2;

pub fn resolve(outcome: MissionOutcome, score: u32, modifiers: PayoutModifiers) -> EconomyDelta {
    let score = i64::from(score);
    let (mut money, mut frags, heat) = match outcome {
        MissionOutcome::Success => (
            score * SUCCESS_MONEY_PER_SCORE + SUCCESS_MONEY_BONUS,
            score + SUCCESS_FRAG_BONUS,
            SUCCESS_HEAT,
        ),
        MissionOutcome::Timeout => (score * FAILURE_MONEY_PER_SCORE, score / 2, FAILURE_HEAT),
    };
    if modifiers.boss {
        money *= BOSS_MULTIPLIER;
        frags *= BOSS_MULTIPLIER;
    }
    if modifiers.bargain {
        // +25 %, rounded down
        money += money / 4;
    }
    EconomyDelta::new(money, heat, frags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn success_tier_pays_bonus() {
        let delta = resolve(MissionOutcome::Success, 20, PayoutModifiers::default());
        assert_eq!(delta, EconomyDelta::new(80, 6, 21));
    }

    #[test]
    fn failure_tier_pays_less_and_adds_less_heat() {
        let delta = resolve(MissionOutcome::Timeout, 5, PayoutModifiers::default());
        assert_eq!(delta, EconomyDelta::new(5, 2, 2));
    }

    #[test]
    fn boss_doubles_money_and_frags_only() {
        let modifiers = PayoutModifiers {
            boss: true,
            bargain: false,
        };
        let delta = resolve(MissionOutcome::Success, 10, modifiers);
        assert_eq!(delta, EconomyDelta::new(100, 6, 22));
    }

    #[test]
    fn bargain_adds_a_quarter_of_money() {
        let modifiers = PayoutModifiers {
            boss: false,
            bargain: true,
        };
        let delta = resolve(MissionOutcome::Success, 20, modifiers);
        assert_eq!(delta.money, 100);
        assert_eq!(delta.frags, 21);
    }

    proptest! {
        #[test]
        fn deltas_are_non_negative_and_monotonic_in_score(
            score in 0u32..10_000,
            boss in any::<bool>(),
            bargain in any::<bool>(),
        ) {
            let modifiers = PayoutModifiers { boss, bargain };
            for outcome in [MissionOutcome::Success, MissionOutcome::Timeout] {
                let low = resolve(outcome, score, modifiers);
                let high = resolve(outcome, score + 1, modifiers);
                prop_assert!(low.money >= 0 && low.frags >= 0);
                prop_assert!(high.money >= low.money);
                prop_assert!(high.frags >= low.frags);
            }
            let success = resolve(MissionOutcome::Success, score, modifiers);
            let failure = resolve(MissionOutcome::Timeout, score, modifiers);
            prop_assert!(success.heat > failure.heat);
        }
    }
}
