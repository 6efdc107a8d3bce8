//! # Derived Projections
//!
//! Helpers built on top of [`RewardResult`]: issuance, break-even time,
//! compounding, activation queue, inflation/tax adjusted returns and
//! side-by-side comparisons.

use crate::arith::SafeArith;
use crate::chain::{ChainConfig, GWEI_PER_ETH};
use crate::error::{EconomicsError, Result};
use crate::rewards::{validate_participation, RewardCalculator};
use crate::types::{
    ComparisonResult, NetworkMetrics, NetworkState, ParticipationComparison, RewardResult,
};
use serde::{Deserialize, Serialize};

/// Participation rates compared by default.
///
/// The supermajority thresholds are exact so those rows land on the
/// intended side of each health band.
pub const STANDARD_PARTICIPATION_RATES: [f64; 10] =
    [1.0, 0.95, 0.9, 0.8, 0.7, 2.0 / 3.0, 0.6, 0.5, 0.4, 1.0 / 3.0];

/// Longest compounding projection
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// ETH needed for one full validator
const ETH_PER_VALIDATOR: f64 = 32.0;

/// Time for rewards to equal the initial stake.
///
/// Every field is `None` when the yield is not positive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreakEven {
    pub years: Option<f64>,
    pub months: Option<f64>,
    pub days: Option<f64>,
}

impl BreakEven {
    /// Whether the stake is ever recovered
    pub fn is_reachable(&self) -> bool {
        self.years.is_some()
    }
}

/// Portfolio value at the end of one year
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct YearlyValue {
    pub year: u32,
    pub value: f64,
}

/// Reinvested returns over several years
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompoundingProjection {
    pub years: Vec<YearlyValue>,
    pub total_return: f64,
    pub total_return_percentage: f64,
}

/// Activation queue wait
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueEstimate {
    pub churn_limit: u64,
    pub epochs: f64,
    pub days: f64,
}

/// Yield after inflation and tax
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetReturns {
    pub gross_apy: f64,
    pub inflation_adjusted: f64,
    pub after_tax: f64,
    pub real_after_tax: f64,
}

/// How an ETH amount splits into full validators
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidatorDistribution {
    pub total_eth: f64,
    pub full_validators: u64,
    pub staked_eth: f64,
    pub remaining_eth: f64,
    pub efficiency: f64,
    pub recommendation: String,
}

/// Years, months and days until cumulative yield reaches 100%.
///
/// Non-positive or NaN APY never breaks even.
pub fn break_even(apy: f64) -> BreakEven {
    if !(apy > 0.0) {
        return BreakEven {
            years: None,
            months: None,
            days: None,
        };
    }

    let years = 100.0 / apy;
    BreakEven {
        years: Some(years),
        months: Some(years * 12.0),
        days: Some(years * 365.25),
    }
}

/// `principal * (1 + apy/100)^y` for each year `1..=years`, with `years`
/// capped at [`MAX_PROJECTION_YEARS`]
pub fn compounding_returns(principal: f64, apy: f64, years: u32) -> Result<CompoundingProjection> {
    if years > MAX_PROJECTION_YEARS {
        return Err(EconomicsError::invalid(format!(
            "projection length must be at most {} years, got {}",
            MAX_PROJECTION_YEARS, years
        )));
    }

    let rate = apy / 100.0;
    let values: Vec<YearlyValue> = (1..=years)
        .map(|year| YearlyValue {
            year,
            // years <= MAX_PROJECTION_YEARS fits in i32
            value: principal * (1.0 + rate).powi(year as i32),
        })
        .collect();

    let final_value = values.last().map(|v| v.value).unwrap_or(principal);
    let total_return = final_value - principal;
    let total_return_percentage = if principal != 0.0 {
        total_return / principal * 100.0
    } else {
        0.0
    };

    Ok(CompoundingProjection {
        years: values,
        total_return,
        total_return_percentage,
    })
}

/// Per-epoch activation churn for the current validator count
pub fn churn_limit(config: &ChainConfig, current_validators: u64) -> Result<u64> {
    Ok(current_validators
        .safe_div(config.churn_limit_quotient)?
        .max(config.min_per_epoch_churn_limit)
        .min(config.max_per_epoch_activation_churn_limit))
}

/// Time for `pending_validators` to clear the activation queue
pub fn validator_queue(
    config: &ChainConfig,
    current_validators: u64,
    pending_validators: u64,
) -> Result<QueueEstimate> {
    let churn = churn_limit(config, current_validators)?;
    if churn == 0 {
        return Err(EconomicsError::InvalidConfig("activation churn limit is zero".to_string()));
    }

    let epochs = pending_validators as f64 / churn as f64;
    Ok(QueueEstimate {
        churn_limit: churn,
        epochs,
        days: epochs / config.epochs_per_day()? as f64,
    })
}

/// Inflation and tax adjustments; the two are applied independently.
pub fn net_returns(gross_apy: f64, inflation_rate: f64, tax_rate: f64) -> NetReturns {
    let after_tax = gross_apy * (1.0 - tax_rate / 100.0);
    NetReturns {
        gross_apy,
        inflation_adjusted: gross_apy - inflation_rate,
        after_tax,
        real_after_tax: after_tax - inflation_rate,
    }
}

/// Split `total_eth` into 32 ETH validators
pub fn optimal_distribution(total_eth: f64) -> Result<ValidatorDistribution> {
    if !(total_eth > 0.0) || !total_eth.is_finite() {
        return Err(EconomicsError::invalid(format!(
            "ETH amount must be positive, got {}",
            total_eth
        )));
    }

    let full_validators = (total_eth / ETH_PER_VALIDATOR).floor();
    let staked_eth = full_validators * ETH_PER_VALIDATOR;
    let remaining_eth = total_eth % ETH_PER_VALIDATOR;

    let recommendation = if remaining_eth >= ETH_PER_VALIDATOR / 2.0 {
        "Consider waiting to accumulate 32 ETH for another validator".to_string()
    } else if remaining_eth > 0.0 {
        format!("Keep {:.2} ETH liquid or in DeFi", remaining_eth)
    } else {
        "Optimal distribution achieved".to_string()
    };

    Ok(ValidatorDistribution {
        total_eth,
        full_validators: full_validators as u64,
        staked_eth,
        remaining_eth,
        efficiency: staked_eth / total_eth * 100.0,
        recommendation,
    })
}

/// Network-wide issuance implied by a reward result
pub fn estimate_network_issuance(
    config: &ChainConfig,
    state: &NetworkState,
    participation_rate: f64,
) -> Result<NetworkMetrics> {
    let rewards = RewardCalculator::new(config).compute_rewards(state, participation_rate)?;
    network_metrics(config, state, &rewards)
}

/// Issuance figures from an already computed [`RewardResult`]
pub fn network_metrics(
    config: &ChainConfig,
    state: &NetworkState,
    rewards: &RewardResult,
) -> Result<NetworkMetrics> {
    let validator_count = state.validator_count();
    let active_validators = (validator_count as f64 * rewards.participation_rate).floor() as usize;
    let epochs_per_year = config.epochs_per_year()? as f64;

    // Only participating validators earn, each at the participation-adjusted rate
    let per_validator_epoch = rewards.total_annual_rewards / epochs_per_year;
    let new_issuance_per_epoch = (per_validator_epoch * active_validators as f64).floor() as u64;
    let new_issuance_per_year =
        new_issuance_per_epoch as f64 * epochs_per_year / GWEI_PER_ETH as f64;

    let total_supply = config.total_supply_eth;
    let (inflation_rate, staked_percentage) = if total_supply > 0 {
        (
            new_issuance_per_year / total_supply as f64 * 100.0,
            (state.total_active_balance / GWEI_PER_ETH) as f64 / total_supply as f64 * 100.0,
        )
    } else {
        (0.0, 0.0)
    };

    Ok(NetworkMetrics {
        new_issuance_per_epoch,
        new_issuance_per_year,
        inflation_rate,
        active_validators,
        total_validators: validator_count,
        network_participation: rewards.participation_rate,
        total_supply,
        staked_percentage,
        yield_per_validator: rewards.total_annual_rewards / GWEI_PER_ETH as f64,
    })
}

/// Rewards across several network sizes at one participation rate
pub fn compare_validator_counts(
    config: &ChainConfig,
    participation_rate: f64,
    validator_counts: &[usize],
) -> Result<Vec<ComparisonResult>> {
    validate_participation(participation_rate)?;
    let calculator = RewardCalculator::new(config);
    let fork = config.default_fork.as_str();

    validator_counts
        .iter()
        .map(|&count| {
            let state = NetworkState::uniform(count, config.max_effective_balance, fork);
            let rewards = calculator.compute_rewards(&state, participation_rate)?;
            Ok(ComparisonResult {
                validator_count: count,
                total_staked: state.total_active_balance / GWEI_PER_ETH,
                base_reward: rewards.base_reward_per_epoch,
                annual_rewards: rewards.total_annual_rewards / GWEI_PER_ETH as f64,
                apy: rewards.apy,
                daily_rewards: rewards.daily_rewards / GWEI_PER_ETH as f64,
            })
        })
        .collect()
}

/// Rewards across participation rates for one network size
pub fn compare_participation_rates(
    config: &ChainConfig,
    validator_count: usize,
    rates: &[f64],
) -> Result<Vec<ParticipationComparison>> {
    let calculator = RewardCalculator::new(config);
    let state = NetworkState::uniform(
        validator_count,
        config.max_effective_balance,
        &config.default_fork,
    );

    rates
        .iter()
        .map(|&rate| {
            let rewards = calculator.compute_rewards(&state, rate)?;
            Ok(ParticipationComparison {
                participation_rate: rate,
                participation_multiplier: rewards.participation_multiplier,
                base_apy: rewards.base_apy,
                effective_apy: rewards.effective_apy,
                annual_rewards: rewards.total_annual_rewards / GWEI_PER_ETH as f64,
                network_health: rewards.network_health,
            })
        })
        .collect()
}
