//! # Reward Calculation
//!
//! Per-epoch reward components for a validator and their annualization.
//!
//! ## Reward Types
//!
//! 1. **Attestation** (source 14/64, target 26/64, head 14/64 of the base reward)
//! 2. **Proposer**: inclusion-modeled, paid per reward-bearing component a block carries
//! 3. **Sync committee**: 2/64 of total base rewards, split across the committee
//!
//! ## Base Reward
//!
//! ```text
//! base_reward = min(effective_balance, MAX_EFFECTIVE_BALANCE) * BASE_REWARD_FACTOR
//!               / isqrt(total_active_balance)
//! ```
//!
//! This is the only base reward formula in the engine. There is no
//! `BASE_REWARDS_PER_EPOCH` divisor.
//!
//! ## Participation Economics
//!
//! Rewards are first computed at a 100% participation baseline (`base_apy`). The
//! inverse multiplier `1 / participation_rate` then models active validators
//! earning more while others are offline, giving `effective_apy = base_apy / p`.

use crate::arith::{narrow, SafeArith};
use crate::chain::{ChainConfig, PARTICIPATION_FLAG_COUNT};
use crate::error::{EconomicsError, Result};
use crate::math::integer_sqrt;
use crate::types::{NetworkHealth, NetworkState, RewardResult};
use serde::{Deserialize, Serialize};

/// Days, weeks and months per year used for the time-based projections
const DAYS_PER_YEAR: f64 = 365.25;
const WEEKS_PER_YEAR: f64 = 52.18;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Reject participation rates outside `(0, 1]` (NaN included)
pub fn validate_participation(participation_rate: f64) -> Result<()> {
    if participation_rate > 0.0 && participation_rate <= 1.0 {
        Ok(())
    } else {
        Err(EconomicsError::invalid(format!(
            "participation rate must be in (0, 1], got {}",
            participation_rate
        )))
    }
}

/// Attestation reward split by timely flag
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRewards {
    pub source: u64,
    pub target: u64,
    pub head: u64,
}

impl AttestationRewards {
    pub fn total(&self) -> Result<u64> {
        Ok(self.source.safe_add(self.target)?.safe_add(self.head)?)
    }
}

/// Reward calculator
pub struct RewardCalculator<'a> {
    config: &'a ChainConfig,
}

impl<'a> RewardCalculator<'a> {
    /// Create new reward calculator
    pub fn new(config: &'a ChainConfig) -> Self {
        Self { config }
    }

    /// Base reward for a validator; fails on a zero total balance.
    pub fn base_reward(&self, effective_balance: u64, total_active_balance: u64) -> Result<u64> {
        if total_active_balance == 0 {
            return Err(EconomicsError::invalid("total active balance must be non-zero"));
        }
        let effective_balance = self.config.clamp_effective_balance(effective_balance);

        Ok(effective_balance
            .safe_mul(self.config.base_reward_factor)?
            .safe_div(integer_sqrt(total_active_balance))?)
    }

    /// Base reward of one effective balance increment
    pub fn base_reward_per_increment(&self, total_active_balance: u64) -> Result<u64> {
        if total_active_balance == 0 {
            return Err(EconomicsError::invalid("total active balance must be non-zero"));
        }
        Ok(self
            .config
            .effective_balance_increment
            .safe_mul(self.config.base_reward_factor)?
            .safe_div(integer_sqrt(total_active_balance))?)
    }

    /// `base_reward * weight / WEIGHT_DENOMINATOR`, truncating
    pub fn weighted_reward(&self, base_reward: u64, weight: u64) -> Result<u64> {
        Ok(base_reward
            .safe_mul(weight)?
            .safe_div(self.config.weight_denominator)?)
    }

    /// Source, target and head rewards for a base reward
    pub fn attestation_components(&self, base_reward: u64) -> Result<AttestationRewards> {
        Ok(AttestationRewards {
            source: self.weighted_reward(base_reward, self.config.timely_source_weight)?,
            target: self.weighted_reward(base_reward, self.config.timely_target_weight)?,
            head: self.weighted_reward(base_reward, self.config.timely_head_weight)?,
        })
    }

    /// Reward for a single attestation with the given correctness flags.
    ///
    /// Inclusion later than the minimum delay scales the reward by
    /// `PROPOSER_REWARD_QUOTIENT / (PROPOSER_REWARD_QUOTIENT + delay - MIN_DELAY)`.
    pub fn attestation_reward(
        &self,
        state: &NetworkState,
        validator_index: usize,
        correct_source: bool,
        correct_target: bool,
        correct_head: bool,
        inclusion_delay: u64,
    ) -> Result<u64> {
        let min_delay = self.config.min_attestation_inclusion_delay;
        if inclusion_delay < min_delay {
            return Err(EconomicsError::invalid(format!(
                "inclusion delay {} is below the minimum of {}",
                inclusion_delay, min_delay
            )));
        }
        let validator = state.validator(validator_index)?;
        let base_reward =
            self.base_reward(validator.effective_balance, state.total_active_balance)?;
        let components = self.attestation_components(base_reward)?;

        let mut reward = 0u64;
        if correct_source {
            reward.safe_add_assign(components.source)?;
        }
        if correct_target {
            reward.safe_add_assign(components.target)?;
        }
        if correct_head {
            reward.safe_add_assign(components.head)?;
        }

        if inclusion_delay > min_delay && reward > 0 {
            let quotient = self.config.proposer_reward_quotient;
            reward = reward
                .safe_mul(quotient)?
                .safe_div(quotient.safe_add(inclusion_delay - min_delay)?)?;
        }

        Ok(reward)
    }

    /// Proposer reward for including one reward-bearing attestation component.
    ///
    /// The proposer earns `PROPOSER_WEIGHT / (WEIGHT_DENOMINATOR - PROPOSER_WEIGHT)` of
    /// what it includes, averaged over the timely flags.
    pub fn proposer_reward_per_component(&self, attestation_reward: u64) -> Result<u64> {
        let denominator = self
            .config
            .weight_denominator
            .safe_sub(self.config.proposer_weight)?
            .safe_mul(PARTICIPATION_FLAG_COUNT)?;

        Ok(attestation_reward
            .safe_mul(self.config.proposer_weight)?
            .safe_div(denominator)?)
    }

    /// Attestations a block is estimated to include for a validator set size
    pub fn included_attestations_per_block(&self, validator_count: usize) -> f64 {
        let model = &self.config.inclusion;
        let attesters_per_slot = validator_count as f64 / self.config.slots_per_epoch as f64;

        attesters_per_slot * model.inclusion_window_slots as f64 * model.inclusion_rate
    }

    /// Expected proposer reward for one block, in Gwei
    pub fn proposer_reward_per_block(
        &self,
        reward_per_component: u64,
        validator_count: usize,
        participation_rate: f64,
    ) -> f64 {
        let model = &self.config.inclusion;
        let rewarded_components = self.included_attestations_per_block(validator_count)
            * model.components_per_attestation
            * participation_rate
            * model.inclusion_effectiveness;

        rewarded_components * reward_per_component as f64
    }

    /// Per-slot reward of one fully participating sync committee member
    pub fn sync_committee_participant_reward(&self, total_active_balance: u64) -> Result<u64> {
        let config = self.config;
        let per_increment = self.base_reward_per_increment(total_active_balance)? as u128;
        let total_increments =
            total_active_balance.safe_div(config.effective_balance_increment)? as u128;

        let max_participant_rewards = per_increment
            .safe_mul(total_increments)?
            .safe_mul(config.sync_reward_weight as u128)?
            .safe_div(config.weight_denominator as u128)?
            .safe_div(config.slots_per_epoch as u128)?;

        Ok(narrow(max_participant_rewards.safe_div(config.sync_committee_size as u128)?)?)
    }

    /// Sync committee reward for one slot with `participant_count` participants
    pub fn sync_committee_reward(
        &self,
        state: &NetworkState,
        participant_count: u64,
    ) -> Result<u64> {
        if participant_count > self.config.sync_committee_size {
            return Err(EconomicsError::invalid(format!(
                "{} participants exceed the sync committee size of {}",
                participant_count, self.config.sync_committee_size
            )));
        }
        let per_participant = self.sync_committee_participant_reward(state.total_active_balance)?;
        Ok(per_participant.safe_mul(participant_count)?)
    }

    /// Compute all reward components for the validator at index 0 of `state`.
    pub fn compute_rewards(
        &self,
        state: &NetworkState,
        participation_rate: f64,
    ) -> Result<RewardResult> {
        validate_participation(participation_rate)?;
        state.ensure_nonzero_balance()?;
        if state.validators.is_empty() {
            return Err(EconomicsError::invalid("network state has no validators"));
        }

        let config = self.config;
        let validator_count = state.validator_count();
        let effective_balance =
            config.clamp_effective_balance(state.validators[0].effective_balance);
        if effective_balance == 0 {
            return Err(EconomicsError::invalid(
                "representative validator has zero effective balance",
            ));
        }
        let epochs_per_year = config.epochs_per_year()? as f64;

        // Base reward
        let sqrt_total_balance = integer_sqrt(state.total_active_balance);
        let base_reward = self.base_reward(effective_balance, state.total_active_balance)?;

        // Attestation components
        let components = self.attestation_components(base_reward)?;
        let attestation_reward = components.total()?;

        // Proposer, at the full participation baseline
        let n = validator_count as f64;
        let slots = config.slots_per_epoch as f64;

        let reward_per_component = self.proposer_reward_per_component(attestation_reward)?;
        let included_attestations = self.included_attestations_per_block(validator_count);
        let proposer_per_block =
            self.proposer_reward_per_block(reward_per_component, validator_count, 1.0);
        let proposer_probability = 1.0 / n;
        let proposer_per_epoch = proposer_per_block * slots / n;
        let expected_proposals_per_year = slots * epochs_per_year / n;

        // Sync committee
        let sync_per_slot = self.sync_committee_participant_reward(state.total_active_balance)?;
        let sync_selection = (config.sync_committee_size as f64 / n).min(1.0);
        let sync_per_epoch = sync_per_slot as f64 * slots * sync_selection;

        // Baseline annualization
        let attestation_annual = attestation_reward as f64 * epochs_per_year;
        let proposer_annual = proposer_per_epoch * epochs_per_year;
        let sync_annual = sync_per_epoch * epochs_per_year;
        let base_annual = attestation_annual + proposer_annual + sync_annual;
        let base_apy = base_annual / effective_balance as f64 * 100.0;

        // Inverse participation multiplier
        let participation_multiplier = 1.0 / participation_rate;
        let total_annual_rewards = base_annual / participation_rate;
        let effective_apy = base_apy / participation_rate;

        let network_health = NetworkHealth::from_participation(participation_rate);

        tracing::debug!(
            validators = validator_count,
            base_reward,
            base_apy,
            effective_apy,
            "Computed rewards"
        );

        Ok(RewardResult {
            validator_count,
            total_staked_gwei: state.total_active_balance,
            participation_rate,
            effective_balance,

            sqrt_total_balance,
            base_reward_per_epoch: base_reward,

            source_reward: components.source,
            target_reward: components.target,
            head_reward: components.head,
            attestation_reward_per_epoch: attestation_reward,

            proposer_probability,
            expected_proposals_per_year,
            included_attestations_per_block: included_attestations,
            proposer_reward_per_component: reward_per_component,
            avg_proposer_reward_per_block: proposer_per_block,
            proposer_reward_per_epoch: proposer_per_epoch,

            sync_committee_reward_per_slot: sync_per_slot,
            sync_committee_selection_probability: sync_selection,
            sync_committee_reward_per_epoch: sync_per_epoch,

            attestation_rewards_annual: attestation_annual / participation_rate,
            proposer_rewards_annual: proposer_annual / participation_rate,
            sync_committee_rewards_annual: sync_annual / participation_rate,
            total_annual_rewards,
            apy: effective_apy,

            participation_multiplier,
            base_apy,
            effective_apy,
            network_health,
            network_health_warning: network_health.warning().map(str::to_string),

            daily_rewards: total_annual_rewards / DAYS_PER_YEAR,
            weekly_rewards: total_annual_rewards / WEEKS_PER_YEAR,
            monthly_rewards: total_annual_rewards / MONTHS_PER_YEAR,
        })
    }
}
