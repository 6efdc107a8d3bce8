//! # Penalty System
//!
//! Missed attestation duties and the inactivity leak.
//!
//! Each missed timely flag costs exactly the reward it would have earned, per flag
//! independently. The inactivity leak only applies while
//! `current_epoch > finalized_epoch + MIN_ATTESTATION_INCLUSION_DELAY`:
//!
//! ```text
//! penalty = effective_balance * inactivity_score
//!           / (INACTIVITY_SCORE_BIAS * fork.inactivity_penalty_quotient)
//! ```

use crate::arith::{narrow, SafeArith};
use crate::chain::{ChainConfig, GWEI_PER_ETH};
use crate::error::Result;
use crate::rewards::RewardCalculator;
use crate::types::{NetworkState, PenaltyResult};
use std::cmp::min;

/// One epoch of the inactivity score recurrence.
///
/// The engine never advances epochs itself; callers iterate this function.
///
/// - finalized: score drops by `min(1, previous)`
/// - not finalized, inactive: score grows by `INACTIVITY_SCORE_BIAS`
/// - not finalized, active: score grows by 1
pub fn next_inactivity_score(
    previous_score: u64,
    is_active: bool,
    is_finalized: bool,
    config: &ChainConfig,
) -> Result<u64> {
    let score = if is_finalized {
        previous_score.safe_sub(min(1, previous_score))?
    } else if !is_active {
        previous_score.safe_add(config.inactivity_score_bias)?
    } else {
        previous_score.safe_add(1)?
    };
    Ok(score)
}

/// Penalty calculator
pub struct PenaltyCalculator<'a> {
    config: &'a ChainConfig,
    rewards: RewardCalculator<'a>,
}

impl<'a> PenaltyCalculator<'a> {
    /// Create new penalty calculator
    pub fn new(config: &'a ChainConfig) -> Self {
        Self {
            config,
            rewards: RewardCalculator::new(config),
        }
    }

    /// Penalties for a validator that got the flagged duties right and missed the rest
    pub fn compute_penalties(
        &self,
        state: &NetworkState,
        validator_index: usize,
        correct_source: bool,
        correct_target: bool,
        correct_head: bool,
    ) -> Result<PenaltyResult> {
        let validator = state.validator(validator_index)?;
        state.ensure_nonzero_balance()?;
        let epochs_per_day = self.config.epochs_per_day()?;

        let base_reward = self
            .rewards
            .base_reward(validator.effective_balance, state.total_active_balance)?;

        let mut result = PenaltyResult {
            inactivity_score: validator.inactivity_score,
            ..Default::default()
        };

        // Missed components mirror the forgone reward
        if !correct_source {
            result.source_penalty = self
                .rewards
                .weighted_reward(base_reward, self.config.timely_source_weight)?;
        }
        if !correct_target {
            result.target_penalty = self
                .rewards
                .weighted_reward(base_reward, self.config.timely_target_weight)?;
        }
        if !correct_head {
            result.head_penalty = self
                .rewards
                .weighted_reward(base_reward, self.config.timely_head_weight)?;
        }
        result.total_attestation_penalty = result
            .source_penalty
            .safe_add(result.target_penalty)?
            .safe_add(result.head_penalty)?;

        result.inactivity_penalty = self.inactivity_penalty(state, validator_index)?;

        // Daily projections in ETH
        result.daily_attestation_penalty =
            result.total_attestation_penalty.safe_mul(epochs_per_day)? as f64 / GWEI_PER_ETH as f64;
        result.daily_inactivity_penalty =
            result.inactivity_penalty.safe_mul(epochs_per_day)? as f64 / GWEI_PER_ETH as f64;

        Ok(result)
    }

    /// Inactivity leak penalty for one epoch; zero while the chain is finalizing.
    pub fn inactivity_penalty(&self, state: &NetworkState, validator_index: usize) -> Result<u64> {
        let validator = state.validator(validator_index)?;

        if !state.is_in_inactivity_leak(self.config) {
            return Ok(0);
        }

        let fork = self.config.fork_config(&state.current_fork);
        let effective_balance = self.config.clamp_effective_balance(validator.effective_balance);

        let numerator = (effective_balance as u128).safe_mul(validator.inactivity_score as u128)?;
        let denominator = (self.config.inactivity_score_bias as u128)
            .safe_mul(fork.inactivity_penalty_quotient as u128)?;

        Ok(narrow(numerator.safe_div(denominator)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EconomicsError;

    const MAX_EB: u64 = 32 * GWEI_PER_ETH;

    #[test]
    fn test_missed_attestation_penalties() {
        let config = ChainConfig::mainnet();
        let calculator = PenaltyCalculator::new(&config);
        let mut state = NetworkState::uniform(4096, MAX_EB, "bellatrix");
        state.finalized_epoch = 999;

        let result = calculator.compute_penalties(&state, 0, false, false, false).unwrap();
        assert_eq!(result.source_penalty, 39_131);
        assert_eq!(result.target_penalty, 72_672);
        assert_eq!(result.head_penalty, 39_131);
        assert_eq!(result.total_attestation_penalty, 150_934);
        assert_eq!(result.inactivity_penalty, 0);
        assert!((result.daily_attestation_penalty - 150_934.0 * 225.0 / 1e9).abs() < 1e-12);
    }

    #[test]
    fn test_penalties_are_per_component() {
        let config = ChainConfig::mainnet();
        let calculator = PenaltyCalculator::new(&config);
        let state = NetworkState::uniform(4096, MAX_EB, "bellatrix");

        let head_only = calculator.compute_penalties(&state, 0, true, true, false).unwrap();
        assert_eq!(head_only.source_penalty, 0);
        assert_eq!(head_only.target_penalty, 0);
        assert_eq!(head_only.head_penalty, 39_131);
        assert_eq!(head_only.total_attestation_penalty, 39_131);

        let perfect = calculator.compute_penalties(&state, 0, true, true, true).unwrap();
        assert_eq!(perfect.total_attestation_penalty, 0);
    }

    #[test]
    fn test_penalties_index_out_of_range() {
        let config = ChainConfig::mainnet();
        let calculator = PenaltyCalculator::new(&config);
        let state = NetworkState::uniform(2, MAX_EB, "bellatrix");

        assert_eq!(
            calculator.compute_penalties(&state, 2, true, true, true),
            Err(EconomicsError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert!(calculator.inactivity_penalty(&state, 7).is_err());
    }

    #[test]
    fn test_unvalidated_config_errors_instead_of_panicking() {
        let mut config = ChainConfig::mainnet();
        config.seconds_per_slot = 0;
        let calculator = PenaltyCalculator::new(&config);
        let state = NetworkState::uniform(100, MAX_EB, "bellatrix");

        assert!(matches!(
            calculator.compute_penalties(&state, 0, false, false, false),
            Err(EconomicsError::Arithmetic(_))
        ));

        let mut config = ChainConfig::mainnet();
        config.inactivity_score_bias = 0;
        let calculator = PenaltyCalculator::new(&config);
        let state = NetworkState::uniform(100, MAX_EB, "bellatrix")
            .with_inactivity(10, &ChainConfig::mainnet());
        assert!(matches!(
            calculator.inactivity_penalty(&state, 0),
            Err(EconomicsError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_inactivity_penalty_by_fork() {
        let config = ChainConfig::mainnet();
        let calculator = PenaltyCalculator::new(&config);

        let leak = |fork: &str| {
            let state = NetworkState::uniform(100, MAX_EB, fork).with_inactivity(10, &config);
            calculator.inactivity_penalty(&state, 0).unwrap()
        };

        // 32e9 * 40 / (4 * quotient)
        assert_eq!(leak("phase0"), 4_768);
        assert_eq!(leak("altair"), 6_357);
        assert_eq!(leak("bellatrix"), 9_536);
        assert_eq!(leak("no-such-fork"), leak("bellatrix"));
    }

    #[test]
    fn test_no_inactivity_penalty_while_finalizing() {
        let config = ChainConfig::mainnet();
        let calculator = PenaltyCalculator::new(&config);
        let mut state =
            NetworkState::uniform(100, MAX_EB, "bellatrix").with_inactivity(10, &config);
        state.finalized_epoch = state.current_epoch - 1;

        assert_eq!(calculator.inactivity_penalty(&state, 0).unwrap(), 0);
    }

    #[test]
    fn test_inactivity_penalty_in_penalty_result() {
        let config = ChainConfig::mainnet();
        let calculator = PenaltyCalculator::new(&config);
        let state = NetworkState::uniform(100, MAX_EB, "bellatrix").with_inactivity(10, &config);

        let result = calculator.compute_penalties(&state, 0, true, true, true).unwrap();
        assert_eq!(result.inactivity_score, 40);
        assert_eq!(result.inactivity_penalty, 9_536);
        assert!((result.daily_inactivity_penalty - 9_536.0 * 225.0 / 1e9).abs() < 1e-12);
    }

    #[test]
    fn test_inactivity_score_recurrence() {
        let config = ChainConfig::mainnet();

        let mut score = 0;
        for _ in 0..10 {
            score = next_inactivity_score(score, false, false, &config).unwrap();
        }
        assert_eq!(score, 10 * config.inactivity_score_bias);

        // Finality recovers one point, not a reset
        score = next_inactivity_score(score, false, true, &config).unwrap();
        assert_eq!(score, 39);

        assert_eq!(next_inactivity_score(39, true, false, &config).unwrap(), 40);
        assert_eq!(next_inactivity_score(0, true, true, &config).unwrap(), 0);
        assert_eq!(next_inactivity_score(0, false, true, &config).unwrap(), 0);
        assert!(next_inactivity_score(u64::MAX, false, false, &config).is_err());
    }
}
