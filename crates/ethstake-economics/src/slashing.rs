//! # Slashing System
//!
//! Penalty model for provably malicious validators.
//!
//! | Component | Formula |
//! |-----------|---------|
//! | Initial | `eb / fork.min_slashing_penalty_quotient` |
//! | Proportional | `eb * min(total_slashed * fork.multiplier, total_active) / total_active` |
//! | Whistleblower | `eb / WHISTLEBLOWER_REWARD_QUOTIENT` |
//! | Proposer cut | `whistleblower / PROPOSER_REWARD_QUOTIENT` |

use crate::arith::{narrow, SafeArith};
use crate::chain::{ChainConfig, GWEI_PER_ETH};
use crate::error::{EconomicsError, Result};
use crate::types::{NetworkState, SecurityImpact, SlashingResult};
use serde::{Deserialize, Serialize};

/// Whistleblower reward for reporting a slashable validator, and the block
/// proposer's share of it.
pub fn whistleblower_reward(
    config: &ChainConfig,
    slashed_effective_balance: u64,
) -> Result<(u64, u64)> {
    let whistleblower = slashed_effective_balance.safe_div(config.whistleblower_reward_quotient)?;
    let proposer = whistleblower.safe_div(config.proposer_reward_quotient)?;
    Ok((whistleblower, proposer))
}

/// Penalty summary in ETH for the impact report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PenaltySummary {
    #[serde(rename = "initial_eth")]
    pub initial: f64,
    #[serde(rename = "proportional_eth")]
    pub proportional: f64,
    #[serde(rename = "total_eth")]
    pub total: f64,
    pub percentage: f64,
}

impl From<&SlashingResult> for PenaltySummary {
    fn from(result: &SlashingResult) -> Self {
        Self {
            initial: result.initial_penalty as f64 / GWEI_PER_ETH as f64,
            proportional: result.proportional_penalty as f64 / GWEI_PER_ETH as f64,
            total: result.total_penalty as f64 / GWEI_PER_ETH as f64,
            percentage: result.percentage_of_stake,
        }
    }
}

/// Network-level effect of a correlated slashing event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkImpact {
    #[serde(rename = "total_penalties_eth")]
    pub total_penalties: f64,
    #[serde(rename = "reduced_staking_eth")]
    pub reduced_staking: f64,
    pub security_impact: SecurityImpact,
}

/// Impact of `slashed_validator_count` max-balance validators slashed together
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlashingImpact {
    pub slashed_validator_count: u64,
    #[serde(rename = "slashed_balance_eth")]
    pub slashed_balance: f64,
    pub network_percentage: f64,
    pub single_validator_penalty: PenaltySummary,
    pub correlated_penalty: PenaltySummary,
    pub network_impact: NetworkImpact,
}

/// Slashing calculator
pub struct SlashingCalculator<'a> {
    config: &'a ChainConfig,
}

impl<'a> SlashingCalculator<'a> {
    /// Create new slashing calculator
    pub fn new(config: &'a ChainConfig) -> Self {
        Self { config }
    }

    /// Slashing penalties for one validator given the total balance slashed
    /// in the correlation window.
    pub fn slashing_penalties(
        &self,
        state: &NetworkState,
        validator_index: usize,
        total_slashed_balance: u64,
    ) -> Result<SlashingResult> {
        let validator = state.validator(validator_index)?;
        state.ensure_nonzero_balance()?;

        let effective_balance = self.config.clamp_effective_balance(validator.effective_balance);
        if effective_balance == 0 {
            return Err(EconomicsError::invalid(format!(
                "validator {} has zero effective balance",
                validator_index
            )));
        }
        let fork = self.config.fork_config(&state.current_fork);

        let initial_penalty = effective_balance.safe_div(fork.min_slashing_penalty_quotient)?;

        // Correlation penalty, clamped at the whole active balance
        let total_active = state.total_active_balance as u128;
        let adjusted_slashed = (total_slashed_balance as u128)
            .safe_mul(fork.proportional_slashing_multiplier as u128)?
            .min(total_active);
        let proportional_penalty = narrow(
            (effective_balance as u128)
                .safe_mul(adjusted_slashed)?
                .safe_div(total_active)?,
        )?;

        let total_penalty = initial_penalty.safe_add(proportional_penalty)?;
        let (whistleblower, proposer) = whistleblower_reward(self.config, effective_balance)?;

        tracing::debug!(
            validator_index,
            fork = %state.current_fork,
            initial_penalty,
            proportional_penalty,
            "Computed slashing penalties"
        );

        Ok(SlashingResult {
            initial_penalty,
            proportional_penalty,
            total_penalty,
            percentage_of_stake: total_penalty as f64 / effective_balance as f64 * 100.0,
            whistleblower_reward: whistleblower,
            proposer_reward: proposer,
        })
    }

    /// Estimate a correlated slashing of `slashed_validator_count` validators,
    /// each at the maximum effective balance. Uses validator 0 as the example.
    pub fn slashing_impact(
        &self,
        state: &NetworkState,
        slashed_validator_count: u64,
    ) -> Result<SlashingImpact> {
        state.ensure_nonzero_balance()?;
        let max_balance = self.config.max_effective_balance;
        let slashed_balance = slashed_validator_count.safe_mul(max_balance)?;
        let network_percentage = slashed_balance as f64 / state.total_active_balance as f64 * 100.0;

        let single = self.slashing_penalties(state, 0, max_balance)?;
        let correlated = self.slashing_penalties(state, 0, slashed_balance)?;

        let to_eth = |gwei: u64| gwei as f64 / GWEI_PER_ETH as f64;
        let aggregate =
            (correlated.total_penalty as u128).safe_mul(slashed_validator_count as u128)?;

        Ok(SlashingImpact {
            slashed_validator_count,
            slashed_balance: to_eth(slashed_balance),
            network_percentage,
            single_validator_penalty: PenaltySummary::from(&single),
            correlated_penalty: PenaltySummary::from(&correlated),
            network_impact: NetworkImpact {
                total_penalties: aggregate as f64 / GWEI_PER_ETH as f64,
                reduced_staking: to_eth(slashed_balance),
                security_impact: SecurityImpact::from_slashed_percentage(network_percentage),
            },
        })
    }
}
