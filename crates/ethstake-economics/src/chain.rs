//! # Chain Configuration
//!
//! Protocol constants and fork-dependent parameter sets.
//!
//! A [`ChainConfig`] is built once (mainnet defaults, optionally overridden from a
//! config file) and passed by reference into every calculator. Nothing in the
//! engine reads mutable global state.
//!
//! ## Fork Parameters (mainnet)
//!
//! | Fork | Version | Inactivity Quotient | Min Slashing Quotient | Proportional Multiplier |
//! |------|---------|---------------------|-----------------------|-------------------------|
//! | phase0 | 0x00000000 | 2^26 | 128 | 1 |
//! | altair | 0x01000000 | 3 * 2^24 | 64 | 2 |
//! | bellatrix (merge) | 0x02000000 | 2^25 | 32 | 3 |
//!
//! Unknown fork names resolve to [`ChainConfig::default_fork`].

use crate::arith::SafeArith;
use crate::error::{EconomicsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One ETH in Gwei
pub const GWEI_PER_ETH: u64 = 1_000_000_000;

/// Number of timely participation flags (source, target, head)
pub const PARTICIPATION_FLAG_COUNT: u64 = 3;

/// Seconds in a day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Seconds in a 365.25 day year
pub const SECONDS_PER_YEAR: u64 = 31_557_600;

/// Known forks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForkName {
    Phase0,
    Altair,
    Bellatrix,
}

impl ForkName {
    /// All forks, oldest first
    pub fn list_all() -> Vec<ForkName> {
        vec![ForkName::Phase0, ForkName::Altair, ForkName::Bellatrix]
    }

    /// Canonical lowercase name used as the fork table key
    pub fn as_str(&self) -> &'static str {
        match self {
            ForkName::Phase0 => "phase0",
            ForkName::Altair => "altair",
            ForkName::Bellatrix => "bellatrix",
        }
    }
}

impl fmt::Display for ForkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForkName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "phase0" | "base" => Ok(ForkName::Phase0),
            "altair" => Ok(ForkName::Altair),
            "bellatrix" | "merge" => Ok(ForkName::Bellatrix),
            other => Err(format!("unknown fork: {}", other)),
        }
    }
}

/// Fork-dependent penalty parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkConfig {
    /// Fork version bytes, hex encoded
    pub version: String,

    /// Divisor of the inactivity leak penalty (larger is gentler)
    pub inactivity_penalty_quotient: u64,

    /// Divisor of the initial slashing penalty
    pub min_slashing_penalty_quotient: u64,

    /// Multiplier applied to total slashed balance for the correlation penalty
    pub proportional_slashing_multiplier: u64,
}

impl ForkConfig {
    pub fn phase0() -> Self {
        Self {
            version: "0x00000000".to_string(),
            inactivity_penalty_quotient: 1 << 26,
            min_slashing_penalty_quotient: 128,
            proportional_slashing_multiplier: 1,
        }
    }

    pub fn altair() -> Self {
        Self {
            version: "0x01000000".to_string(),
            inactivity_penalty_quotient: 3 * (1 << 24),
            min_slashing_penalty_quotient: 64,
            proportional_slashing_multiplier: 2,
        }
    }

    pub fn bellatrix() -> Self {
        Self {
            version: "0x02000000".to_string(),
            inactivity_penalty_quotient: 1 << 25,
            min_slashing_penalty_quotient: 32,
            proportional_slashing_multiplier: 3,
        }
    }

    /// Built-in parameters for a known fork
    pub fn for_fork(fork: ForkName) -> Self {
        match fork {
            ForkName::Phase0 => Self::phase0(),
            ForkName::Altair => Self::altair(),
            ForkName::Bellatrix => Self::bellatrix(),
        }
    }
}

/// Empirical factors of the inclusion-modeled proposer reward.
///
/// None of these come from the protocol; they calibrate how many reward-bearing
/// attestation components a typical block carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InclusionModel {
    /// Fraction of slot-estimated attestations that make it into a block
    pub inclusion_rate: f64,

    /// Number of recent slots whose attestations a block can include
    pub inclusion_window_slots: u64,

    /// Average reward-bearing components per included attestation
    pub components_per_attestation: f64,

    /// Share of included components that are actually rewarded
    pub inclusion_effectiveness: f64,
}

impl Default for InclusionModel {
    fn default() -> Self {
        Self {
            inclusion_rate: 0.6,
            inclusion_window_slots: 8,
            components_per_attestation: 2.8,
            inclusion_effectiveness: 0.9,
        }
    }
}

/// Complete set of protocol constants used by the engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    // Base reward
    pub base_reward_factor: u64,
    pub proposer_reward_quotient: u64,
    pub whistleblower_reward_quotient: u64,

    // Participation flag weights
    pub timely_source_weight: u64,
    pub timely_target_weight: u64,
    pub timely_head_weight: u64,
    pub sync_reward_weight: u64,
    pub proposer_weight: u64,
    pub weight_denominator: u64,

    // Sync committee
    pub sync_committee_size: u64,

    // Balances (Gwei)
    pub effective_balance_increment: u64,
    pub max_effective_balance: u64,
    pub ejection_balance: u64,

    // Time
    pub slots_per_epoch: u64,
    pub seconds_per_slot: u64,
    pub min_attestation_inclusion_delay: u64,

    // Inactivity
    pub inactivity_score_bias: u64,

    // Validator churn
    pub min_per_epoch_churn_limit: u64,
    pub churn_limit_quotient: u64,
    pub max_per_epoch_activation_churn_limit: u64,

    /// Assumed circulating supply in ETH, used only for the inflation estimate
    pub total_supply_eth: u64,

    /// Proposer reward calibration
    pub inclusion: InclusionModel,

    /// Fork table keyed by lowercase fork name
    pub forks: BTreeMap<String, ForkConfig>,

    /// Fork used for names missing from [`ChainConfig::forks`]
    pub default_fork: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl ChainConfig {
    /// Ethereum mainnet parameters
    pub fn mainnet() -> Self {
        let mut forks = BTreeMap::new();
        for fork in ForkName::list_all() {
            forks.insert(fork.to_string(), ForkConfig::for_fork(fork));
        }
        forks.insert("merge".to_string(), ForkConfig::bellatrix());

        Self {
            base_reward_factor: 64,
            proposer_reward_quotient: 8,
            whistleblower_reward_quotient: 512,

            timely_source_weight: 14,
            timely_target_weight: 26,
            timely_head_weight: 14,
            sync_reward_weight: 2,
            proposer_weight: 8,
            weight_denominator: 64,

            sync_committee_size: 512,

            effective_balance_increment: GWEI_PER_ETH,
            max_effective_balance: 32 * GWEI_PER_ETH,
            ejection_balance: 16 * GWEI_PER_ETH,

            slots_per_epoch: 32,
            seconds_per_slot: 12,
            min_attestation_inclusion_delay: 1,

            inactivity_score_bias: 4,

            min_per_epoch_churn_limit: 4,
            churn_limit_quotient: 65_536,
            max_per_epoch_activation_churn_limit: 8,

            total_supply_eth: 120_000_000,

            inclusion: InclusionModel::default(),
            forks,
            default_fork: ForkName::Bellatrix.to_string(),
        }
    }

    /// Reject configurations the engine cannot compute with
    pub fn validate(&self) -> Result<()> {
        let nonzero = [
            ("base_reward_factor", self.base_reward_factor),
            ("proposer_reward_quotient", self.proposer_reward_quotient),
            ("whistleblower_reward_quotient", self.whistleblower_reward_quotient),
            ("weight_denominator", self.weight_denominator),
            ("sync_committee_size", self.sync_committee_size),
            ("effective_balance_increment", self.effective_balance_increment),
            ("max_effective_balance", self.max_effective_balance),
            ("slots_per_epoch", self.slots_per_epoch),
            ("seconds_per_slot", self.seconds_per_slot),
            ("churn_limit_quotient", self.churn_limit_quotient),
            ("max_per_epoch_activation_churn_limit", self.max_per_epoch_activation_churn_limit),
            ("inclusion.inclusion_window_slots", self.inclusion.inclusion_window_slots),
        ];
        for (name, value) in nonzero {
            if value == 0 {
                return Err(EconomicsError::InvalidConfig(format!("{} must be non-zero", name)));
            }
        }

        if self.proposer_weight >= self.weight_denominator {
            return Err(EconomicsError::InvalidConfig(format!(
                "proposer_weight {} must be below weight_denominator {}",
                self.proposer_weight, self.weight_denominator
            )));
        }

        if self.epochs_per_day()? == 0 {
            return Err(EconomicsError::InvalidConfig(
                "an epoch must be shorter than a day".to_string(),
            ));
        }

        let rates = [
            ("inclusion.inclusion_rate", self.inclusion.inclusion_rate),
            ("inclusion.inclusion_effectiveness", self.inclusion.inclusion_effectiveness),
        ];
        for (name, value) in rates {
            if !(value > 0.0 && value <= 1.0) {
                return Err(EconomicsError::InvalidConfig(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(self.inclusion.components_per_attestation > 0.0) {
            return Err(EconomicsError::InvalidConfig(
                "inclusion.components_per_attestation must be positive".to_string(),
            ));
        }

        if !self.forks.contains_key(&self.default_fork.to_lowercase()) {
            return Err(EconomicsError::InvalidConfig(format!(
                "default fork '{}' is not in the fork table",
                self.default_fork
            )));
        }
        for (name, fork) in &self.forks {
            if fork.inactivity_penalty_quotient == 0 || fork.min_slashing_penalty_quotient == 0 {
                return Err(EconomicsError::InvalidConfig(format!(
                    "fork '{}' has a zero penalty quotient",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Parameters for `fork_name`, falling back to the default fork for unknown names.
    pub fn fork_config(&self, fork_name: &str) -> ForkConfig {
        let key = fork_name.to_lowercase();
        if let Some(fork) = self.forks.get(&key) {
            return fork.clone();
        }

        tracing::warn!(
            fork = fork_name,
            default = %self.default_fork,
            "Unknown fork, using default fork parameters"
        );
        self.forks
            .get(&self.default_fork.to_lowercase())
            .cloned()
            .unwrap_or_else(ForkConfig::bellatrix)
    }

    /// Slot duration times slots per epoch
    pub fn seconds_per_epoch(&self) -> Result<u64> {
        Ok(self.seconds_per_slot.safe_mul(self.slots_per_epoch)?)
    }

    /// Whole epochs in a day (225 on mainnet)
    pub fn epochs_per_day(&self) -> Result<u64> {
        Ok(SECONDS_PER_DAY.safe_div(self.seconds_per_epoch()?)?)
    }

    /// Whole epochs in a 365.25 day year (82,181 on mainnet)
    pub fn epochs_per_year(&self) -> Result<u64> {
        Ok(SECONDS_PER_YEAR.safe_div(self.seconds_per_epoch()?)?)
    }

    /// Cap an effective balance at the protocol maximum
    pub fn clamp_effective_balance(&self, effective_balance: u64) -> u64 {
        effective_balance.min(self.max_effective_balance)
    }

    /// Sum of the three timely attestation weights
    pub fn attestation_weight_sum(&self) -> Result<u64> {
        Ok(self
            .timely_source_weight
            .safe_add(self.timely_target_weight)?
            .safe_add(self.timely_head_weight)?)
    }
}
