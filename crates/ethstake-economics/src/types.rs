//! Network state and result types.
//!
//! Balances are Gwei integers. Ratios, percentages and annualized projections are
//! `f64`. Field names are part of the JSON export contract and must stay stable.

use crate::chain::ChainConfig;
use crate::error::{EconomicsError, Result};
use serde::{Deserialize, Serialize};

/// Epoch marker for "not yet scheduled"
pub const FAR_FUTURE_EPOCH: u64 = u64::MAX;

/// A single simulated validator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Stake used for reward math, capped at the protocol maximum when used
    pub effective_balance: u64,

    /// Slashed flag
    pub slashed: bool,

    /// Epoch the validator became eligible for activation
    pub activation_eligibility_epoch: u64,

    /// Activation epoch
    pub activation_epoch: u64,

    /// Exit epoch
    pub exit_epoch: u64,

    /// Epoch the balance becomes withdrawable
    pub withdrawable_epoch: u64,

    /// Inactivity score, advanced by [`crate::penalties::next_inactivity_score`]
    pub inactivity_score: u64,
}

impl Validator {
    /// Active-from-genesis validator with the given effective balance
    pub fn new(effective_balance: u64) -> Self {
        Self {
            effective_balance,
            slashed: false,
            activation_eligibility_epoch: 0,
            activation_epoch: 0,
            exit_epoch: FAR_FUTURE_EPOCH,
            withdrawable_epoch: FAR_FUTURE_EPOCH,
            inactivity_score: 0,
        }
    }

    /// Active at `epoch`
    pub fn is_active_at(&self, epoch: u64) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }
}

/// Simulated network state handed to the calculators.
///
/// `total_active_balance` is supplied by the caller and is not re-derived from
/// `validators`; keeping the two consistent is the caller's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkState {
    pub validators: Vec<Validator>,
    pub total_active_balance: u64,

    pub current_epoch: u64,
    pub finalized_epoch: u64,
    pub justified_epoch: u64,

    /// Active fork name, resolved through [`ChainConfig::fork_config`]
    pub current_fork: String,

    /// Slashed balance per recent epoch
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slashings_per_epoch: Vec<u64>,
}

impl NetworkState {
    /// `count` identical validators with a finalized chain two epochs behind head
    pub fn uniform(count: usize, effective_balance: u64, fork: &str) -> Self {
        Self {
            validators: vec![Validator::new(effective_balance); count],
            total_active_balance: (count as u64).saturating_mul(effective_balance),
            current_epoch: 1000,
            finalized_epoch: 998,
            justified_epoch: 999,
            current_fork: fork.to_string(),
            slashings_per_epoch: Vec::new(),
        }
    }

    /// Model `epochs` of non-finality: every validator accrues `epochs * bias`
    /// inactivity score and finality falls `epochs + 2` epochs behind head.
    pub fn with_inactivity(mut self, epochs: u64, config: &ChainConfig) -> Self {
        if epochs == 0 {
            return self;
        }
        let score = epochs.saturating_mul(config.inactivity_score_bias);
        for validator in &mut self.validators {
            validator.inactivity_score = score;
        }
        self.finalized_epoch = self.current_epoch.saturating_sub(epochs.saturating_add(2));
        self.justified_epoch = self.finalized_epoch;
        self
    }

    /// Validator at `index`
    pub fn validator(&self, index: usize) -> Result<&Validator> {
        self.validators.get(index).ok_or(EconomicsError::IndexOutOfRange {
            index,
            len: self.validators.len(),
        })
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    /// Chain has gone long enough without finality for the inactivity leak to apply
    pub fn is_in_inactivity_leak(&self, config: &ChainConfig) -> bool {
        self.current_epoch
            > self
                .finalized_epoch
                .saturating_add(config.min_attestation_inclusion_delay)
    }

    /// Sum of the recorded slashing history
    pub fn total_slashings(&self) -> u64 {
        self.slashings_per_epoch
            .iter()
            .fold(0u64, |acc, slashed| acc.saturating_add(*slashed))
    }

    /// Fails when balance-dependent denominators would be zero
    pub fn ensure_nonzero_balance(&self) -> Result<()> {
        if self.total_active_balance == 0 {
            return Err(EconomicsError::invalid("total active balance must be non-zero"));
        }
        Ok(())
    }
}

/// Network health by participation rate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkHealth {
    /// Below 1/3: no finality possible
    Critical,
    /// [1/3, 2/3): finality stalled, inactivity leak active
    InactivityLeak,
    /// [2/3, 0.8): finalizing with thin margin
    ReducedSecurity,
    /// 0.8 and above
    Healthy,
}

impl NetworkHealth {
    /// Classify a participation rate; each band includes its lower bound.
    pub fn from_participation(rate: f64) -> Self {
        if rate < 1.0 / 3.0 {
            Self::Critical
        } else if rate < 2.0 / 3.0 {
            Self::InactivityLeak
        } else if rate < 0.8 {
            Self::ReducedSecurity
        } else {
            Self::Healthy
        }
    }

    /// Human readable warning, `None` when healthy
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            Self::Critical => Some("CRITICAL - No finality"),
            Self::InactivityLeak => Some("Inactivity leak active"),
            Self::ReducedSecurity => Some("Reduced security"),
            Self::Healthy => None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.warning().unwrap_or("Healthy")
    }
}

/// Network security impact of a slashing event, by slashed share of total stake
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityImpact {
    Minimal,
    Low,
    Moderate,
    High,
    Critical,
    Catastrophic,
}

impl SecurityImpact {
    /// Classify by slashed percentage of total stake (0-100)
    pub fn from_slashed_percentage(percentage: f64) -> Self {
        if percentage < 0.1 {
            Self::Minimal
        } else if percentage < 1.0 {
            Self::Low
        } else if percentage < 5.0 {
            Self::Moderate
        } else if percentage < 10.0 {
            Self::High
        } else if percentage < 33.3 {
            Self::Critical
        } else {
            Self::Catastrophic
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Minimal => "Minimal",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
            Self::Catastrophic => "Catastrophic",
        }
    }
}

/// Every quantity computed by [`crate::rewards::RewardCalculator::compute_rewards`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardResult {
    // Inputs
    pub validator_count: usize,
    pub total_staked_gwei: u64,
    pub participation_rate: f64,
    /// Clamped effective balance of the representative validator
    pub effective_balance: u64,

    // Base reward
    pub sqrt_total_balance: u64,
    pub base_reward_per_epoch: u64,

    // Attestation components (per epoch)
    pub source_reward: u64,
    pub target_reward: u64,
    pub head_reward: u64,
    pub attestation_reward_per_epoch: u64,

    // Proposer
    pub proposer_probability: f64,
    pub expected_proposals_per_year: f64,
    pub included_attestations_per_block: f64,
    pub proposer_reward_per_component: u64,
    pub avg_proposer_reward_per_block: f64,
    pub proposer_reward_per_epoch: f64,

    // Sync committee
    pub sync_committee_reward_per_slot: u64,
    pub sync_committee_selection_probability: f64,
    pub sync_committee_reward_per_epoch: f64,

    // Annual projections, participation adjusted
    pub attestation_rewards_annual: f64,
    pub proposer_rewards_annual: f64,
    pub sync_committee_rewards_annual: f64,
    pub total_annual_rewards: f64,
    #[serde(rename = "apy_percentage")]
    pub apy: f64,

    // Participation economics
    pub participation_multiplier: f64,
    pub base_apy: f64,
    pub effective_apy: f64,
    pub network_health: NetworkHealth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_health_warning: Option<String>,

    // Time-based projections
    pub daily_rewards: f64,
    pub weekly_rewards: f64,
    pub monthly_rewards: f64,
}

/// Penalties for one validator under one duty scenario
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyResult {
    pub source_penalty: u64,
    pub target_penalty: u64,
    pub head_penalty: u64,
    pub total_attestation_penalty: u64,

    pub inactivity_score: u64,
    pub inactivity_penalty: u64,

    #[serde(rename = "daily_attestation_penalty_eth")]
    pub daily_attestation_penalty: f64,
    #[serde(rename = "daily_inactivity_penalty_eth")]
    pub daily_inactivity_penalty: f64,
}

/// Slashing penalty components for one validator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlashingResult {
    pub initial_penalty: u64,
    pub proportional_penalty: u64,
    pub total_penalty: u64,
    pub percentage_of_stake: f64,
    pub whistleblower_reward: u64,
    pub proposer_reward: u64,
}

/// Network-wide issuance and supply figures
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub new_issuance_per_epoch: u64,
    #[serde(rename = "new_issuance_per_year_eth")]
    pub new_issuance_per_year: f64,
    #[serde(rename = "inflation_rate_percentage")]
    pub inflation_rate: f64,

    pub active_validators: usize,
    pub total_validators: usize,
    #[serde(rename = "network_participation_rate")]
    pub network_participation: f64,

    #[serde(rename = "total_supply_eth")]
    pub total_supply: u64,
    pub staked_percentage: f64,
    #[serde(rename = "yield_per_validator_eth")]
    pub yield_per_validator: f64,
}

/// One row of a validator-count comparison
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub validator_count: usize,
    #[serde(rename = "total_staked_eth")]
    pub total_staked: u64,
    #[serde(rename = "base_reward_gwei")]
    pub base_reward: u64,
    #[serde(rename = "annual_rewards_eth")]
    pub annual_rewards: f64,
    #[serde(rename = "apy_percentage")]
    pub apy: f64,
    #[serde(rename = "daily_rewards_eth")]
    pub daily_rewards: f64,
}

/// One row of a participation-rate comparison
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipationComparison {
    pub participation_rate: f64,
    pub participation_multiplier: f64,
    pub base_apy: f64,
    pub effective_apy: f64,
    #[serde(rename = "annual_rewards_eth")]
    pub annual_rewards: f64,
    pub network_health: NetworkHealth,
}

/// Full JSON document for detailed output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailedBreakdown {
    pub reward_results: RewardResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_results: Option<PenaltyResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slashing_results: Option<SlashingResult>,
    pub network_metrics: NetworkMetrics,
}
