//! Subcommand handlers
//!
//! Each handler runs the engine and renders the result either as tables or,
//! with `--json`, as a single JSON document on stdout.

use crate::output;
use anyhow::Context;
use ethstake_economics::analysis::{
    break_even, compare_participation_rates, compare_validator_counts, compounding_returns,
    net_returns, network_metrics, optimal_distribution, validator_queue, BreakEven,
    CompoundingProjection, NetReturns, STANDARD_PARTICIPATION_RATES,
};
use ethstake_economics::{
    ChainConfig, DetailedBreakdown, ForkConfig, NetworkState, PenaltyCalculator, RewardCalculator,
    SlashingCalculator,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Stake assumed for one validator in the return projections
const VALIDATOR_STAKE_ETH: f64 = 32.0;

/// Flags of the `rewards` command
pub struct RewardsOptions {
    pub validators: usize,
    pub participation: f64,
    pub fork: String,
    pub detailed: bool,
    pub penalties: bool,
    pub inactivity_epochs: u64,
    pub slashed_count: u64,
}

#[derive(Serialize)]
#[cfg_attr(test, derive(serde::Deserialize, Debug, PartialEq))]
struct ReturnsReport {
    apy_percentage: f64,
    break_even: BreakEven,
    compounding: CompoundingProjection,
    net_returns: NetReturns,
}

#[derive(Serialize)]
struct ForkTable<'a> {
    default_fork: &'a str,
    forks: &'a BTreeMap<String, ForkConfig>,
}

fn ensure_validators(count: usize) -> anyhow::Result<()> {
    if count == 0 {
        anyhow::bail!("Validator count must be at least 1");
    }
    Ok(())
}

/// Network state for `validators` max-balance validators
fn network_state(
    config: &ChainConfig,
    validators: usize,
    fork: &str,
    inactivity_epochs: u64,
) -> NetworkState {
    NetworkState::uniform(validators, config.max_effective_balance, fork)
        .with_inactivity(inactivity_epochs, config)
}

pub fn rewards(config: &ChainConfig, json: bool, options: &RewardsOptions) -> anyhow::Result<()> {
    ensure_validators(options.validators)?;
    let state = network_state(config, options.validators, &options.fork, options.inactivity_epochs);

    tracing::info!(
        validators = options.validators,
        participation = options.participation,
        fork = %options.fork,
        "Calculating rewards"
    );

    let rewards = RewardCalculator::new(config).compute_rewards(&state, options.participation)?;

    let penalties = if options.penalties {
        Some(PenaltyCalculator::new(config).compute_penalties(&state, 0, false, false, false)?)
    } else {
        None
    };

    let slashing = if options.slashed_count > 0 {
        let slashed_balance = options
            .slashed_count
            .checked_mul(config.max_effective_balance)
            .context("Slashed balance overflows")?;
        Some(SlashingCalculator::new(config).slashing_penalties(&state, 0, slashed_balance)?)
    } else {
        None
    };

    if json {
        if options.detailed || penalties.is_some() || slashing.is_some() {
            let breakdown = DetailedBreakdown {
                network_metrics: network_metrics(config, &state, &rewards)?,
                reward_results: rewards,
                penalty_results: penalties,
                slashing_results: slashing,
            };
            return output::print_json(&breakdown);
        }
        return output::print_json(&rewards);
    }

    output::print_rewards(&rewards, config, options.detailed)?;
    if let Some(penalties) = &penalties {
        output::print_penalties(penalties, options.inactivity_epochs, config.epochs_per_day()?);
    }
    if let Some(slashing) = &slashing {
        output::print_slashing(slashing, options.slashed_count);
    }
    Ok(())
}

pub fn compare(
    config: &ChainConfig,
    json: bool,
    counts: &[usize],
    participation: f64,
) -> anyhow::Result<()> {
    for &count in counts {
        ensure_validators(count)?;
    }
    let rows = compare_validator_counts(config, participation, counts)?;

    if json {
        return output::print_json(&rows);
    }

    output::banner("STAKING REWARDS COMPARISON");
    println!();
    println!("Participation Rate: {:.1}%", participation * 100.0);
    println!("{}", output::comparison_table(&rows));
    Ok(())
}

pub fn participation(config: &ChainConfig, json: bool, validators: usize) -> anyhow::Result<()> {
    ensure_validators(validators)?;
    let rows = compare_participation_rates(config, validators, &STANDARD_PARTICIPATION_RATES)?;

    if json {
        return output::print_json(&rows);
    }
    output::print_participation(validators, &rows);
    Ok(())
}

pub fn slashing(
    config: &ChainConfig,
    json: bool,
    validators: usize,
    count: u64,
    fork: &str,
) -> anyhow::Result<()> {
    ensure_validators(validators)?;
    if count == 0 {
        anyhow::bail!("Slashed validator count must be at least 1");
    }
    let state = network_state(config, validators, fork, 0);
    let impact = SlashingCalculator::new(config).slashing_impact(&state, count)?;

    if impact.network_percentage > 100.0 {
        tracing::warn!(
            slashed = count,
            validators,
            "More validators slashed than exist; penalties are clamped"
        );
    }

    if json {
        return output::print_json(&impact);
    }
    output::print_slashing_impact(&impact);
    Ok(())
}

pub fn returns(
    config: &ChainConfig,
    json: bool,
    validators: usize,
    participation: f64,
    years: u32,
    inflation: f64,
    tax: f64,
) -> anyhow::Result<()> {
    ensure_validators(validators)?;
    let state = network_state(config, validators, &config.default_fork, 0);
    let rewards = RewardCalculator::new(config).compute_rewards(&state, participation)?;

    let report = ReturnsReport {
        apy_percentage: rewards.apy,
        break_even: break_even(rewards.apy),
        compounding: compounding_returns(VALIDATOR_STAKE_ETH, rewards.apy, years)?,
        net_returns: net_returns(rewards.apy, inflation, tax),
    };

    if json {
        return output::print_json(&report);
    }
    output::print_returns(
        report.apy_percentage,
        &report.break_even,
        &report.compounding,
        &report.net_returns,
    );
    Ok(())
}

pub fn queue(
    config: &ChainConfig,
    json: bool,
    validators: u64,
    pending: u64,
) -> anyhow::Result<()> {
    let estimate = validator_queue(config, validators, pending)?;

    if json {
        return output::print_json(&estimate);
    }
    output::print_queue(validators, pending, &estimate);
    Ok(())
}

pub fn distribution(json: bool, eth: f64) -> anyhow::Result<()> {
    let distribution = optimal_distribution(eth)?;

    if json {
        return output::print_json(&distribution);
    }
    output::print_distribution(&distribution);
    Ok(())
}

pub fn forks(config: &ChainConfig, json: bool) -> anyhow::Result<()> {
    if json {
        return output::print_json(&ForkTable {
            default_fork: &config.default_fork,
            forks: &config.forks,
        });
    }

    output::banner("FORK PARAMETERS");
    println!("{}", output::fork_table(config));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(validators: usize, participation: f64) -> RewardsOptions {
        RewardsOptions {
            validators,
            participation,
            fork: "bellatrix".to_string(),
            detailed: true,
            penalties: true,
            inactivity_epochs: 10,
            slashed_count: 5,
        }
    }

    #[test]
    fn test_rewards_command_runs() {
        let config = ChainConfig::mainnet();
        assert!(rewards(&config, false, &options(4096, 0.95)).is_ok());
        assert!(rewards(&config, true, &options(4096, 0.95)).is_ok());
    }

    #[test]
    fn test_rewards_rejects_bad_participation() {
        let config = ChainConfig::mainnet();
        assert!(rewards(&config, false, &options(4096, 1.5)).is_err());
        assert!(rewards(&config, false, &options(4096, 0.0)).is_err());
        assert!(rewards(&config, false, &options(0, 0.9)).is_err());
    }

    #[test]
    fn test_other_commands_run() {
        let config = ChainConfig::mainnet();
        assert!(compare(&config, false, &[1_000, 10_000], 0.95).is_ok());
        assert!(compare(&config, false, &[1_000, 0], 0.95).is_err());
        assert!(participation(&config, true, 1_000).is_ok());
        assert!(slashing(&config, false, 10_000, 100, "altair").is_ok());
        assert!(slashing(&config, false, 10_000, 0, "altair").is_err());
        assert!(returns(&config, false, 10_000, 0.95, 3, 2.0, 25.0).is_ok());
        assert!(queue(&config, false, 500_000, 1_000).is_ok());
        assert!(distribution(false, 100.0).is_ok());
        assert!(distribution(false, -1.0).is_err());
        assert!(forks(&config, true).is_ok());
    }

    #[test]
    fn test_returns_rejects_long_projection() {
        let config = ChainConfig::mainnet();
        assert!(returns(&config, true, 10_000, 0.95, 100, 0.0, 0.0).is_ok());
        assert!(returns(&config, true, 10_000, 0.95, 101, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_returns_report_json_keeps_unreachable_break_even() {
        let report = ReturnsReport {
            apy_percentage: 0.0,
            break_even: break_even(0.0),
            compounding: compounding_returns(VALIDATOR_STAKE_ETH, 0.0, 2).unwrap(),
            net_returns: net_returns(0.0, 2.0, 25.0),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["break_even"]["years"].is_null());

        let back: ReturnsReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
        assert!(!back.break_even.is_reachable());
    }

    #[test]
    fn test_commands_error_on_unvalidated_config() {
        let mut config = ChainConfig::mainnet();
        config.seconds_per_slot = 0;
        assert!(rewards(&config, false, &options(4096, 0.95)).is_err());
        assert!(queue(&config, false, 500_000, 1_000).is_err());
    }
}
