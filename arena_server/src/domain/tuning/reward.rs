pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Round-end payout schedule in lamports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardTuning {
    /// Payout for the first round.
    pub base_lamports: u64,

    /// Extra payout added for every round after the first.
    pub bonus_lamports: u64,
}

impl RewardTuning {
    pub fn from_sol(base_sol: f64, bonus_sol: f64) -> Self {
        Self {
            base_lamports: sol_to_lamports(base_sol),
            bonus_lamports: sol_to_lamports(bonus_sol),
        }
    }

    /// Reward for the round that just ended (rounds start at 1).
    pub fn for_round(&self, round_number: u64) -> u64 {
        let bonus_rounds = round_number.saturating_sub(1);
        self.base_lamports
            .saturating_add(self.bonus_lamports.saturating_mul(bonus_rounds))
    }
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self::from_sol(0.01, 0.002)
    }
}

/// Floors a native-token amount to lamports; negative or non-finite input is zero.
pub fn sol_to_lamports(sol: f64) -> u64 {
    if !sol.is_finite() || sol <= 0.0 {
        return 0;
    }
    (sol * LAMPORTS_PER_SOL).floor() as u64
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_round_is_first_then_reward_is_base() {
        let reward = RewardTuning::default();
        assert_eq!(reward.base_lamports, 10_000_000);
        assert_eq!(reward.for_round(1), 10_000_000);
    }

    #[test]
    fn when_round_advances_then_bonus_accumulates() {
        let reward = RewardTuning::default();
        assert_eq!(reward.bonus_lamports, 2_000_000);
        assert_eq!(reward.for_round(3), 14_000_000);
    }

    #[test]
    fn when_sol_is_not_finite_then_lamports_is_zero() {
        assert_eq!(sol_to_lamports(f64::NAN), 0);
        assert_eq!(sol_to_lamports(-1.0), 0);
    }
}
