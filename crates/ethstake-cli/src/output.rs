//! Human readable and JSON rendering

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use ethstake_economics::analysis::{
    BreakEven, CompoundingProjection, NetReturns, QueueEstimate, ValidatorDistribution,
};
use ethstake_economics::{
    ChainConfig, ComparisonResult, NetworkHealth, ParticipationComparison, PenaltyResult,
    RewardResult, SlashingImpact, SlashingResult, GWEI_PER_ETH,
};
use serde::Serialize;

/// Pretty-printed JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `1234567` -> `1,234,567`
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Gwei to ETH
pub fn eth(gwei: f64) -> f64 {
    gwei / GWEI_PER_ETH as f64
}

/// Boxed section banner
pub fn banner(title: &str) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╚══════════════════════════════════════════════════════════════╝");
}

fn section(title: &str) {
    println!();
    println!("{}:", title);
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn right(text: impl ToString) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Single network size report
pub fn print_rewards(
    result: &RewardResult,
    config: &ChainConfig,
    detailed: bool,
) -> anyhow::Result<()> {
    banner("ETHEREUM STAKING REWARDS");

    section("Network Parameters");
    println!("- Validator Count: {}", format_number(result.validator_count as u64));
    println!("- Total Staked: {} ETH", format_number(result.total_staked_gwei / GWEI_PER_ETH));
    println!("- Participation Rate: {:.1}%", result.participation_rate * 100.0);
    println!("- Effective Balance: {:.0} ETH", eth(result.effective_balance as f64));

    section("Base Reward Calculation");
    println!("- Base Reward Factor: {}", config.base_reward_factor);
    println!("- Square Root of Total Balance: {}", format_number(result.sqrt_total_balance));
    println!(
        "- Base Reward per Epoch: {} Gwei ({:.9} ETH)",
        format_number(result.base_reward_per_epoch),
        eth(result.base_reward_per_epoch as f64)
    );

    if detailed {
        let share = |weight: u64| weight as f64 / config.weight_denominator as f64 * 100.0;

        section("Reward Breakdown (per epoch)");
        let mut table = new_table(vec!["Component", "Gwei", "Weight"]);
        table.add_row(vec![
            Cell::new("Source vote"),
            right(format_number(result.source_reward)),
            right(format!("{:.2}%", share(config.timely_source_weight))),
        ]);
        table.add_row(vec![
            Cell::new("Target vote"),
            right(format_number(result.target_reward)),
            right(format!("{:.2}%", share(config.timely_target_weight))),
        ]);
        table.add_row(vec![
            Cell::new("Head vote"),
            right(format_number(result.head_reward)),
            right(format!("{:.2}%", share(config.timely_head_weight))),
        ]);
        table.add_row(vec![
            Cell::new("Total attestation"),
            right(format_number(result.attestation_reward_per_epoch)),
            right(format!("{:.2}%", share(config.attestation_weight_sum()?))),
        ]);
        println!("{table}");

        section("Proposer Statistics");
        println!("- Probability per Slot: {:.4}%", result.proposer_probability * 100.0);
        println!("- Expected Proposals per Year: {:.2}", result.expected_proposals_per_year);
        println!(
            "- Included Attestations per Block: {:.1}",
            result.included_attestations_per_block
        );
        println!(
            "- Average Proposer Reward per Block: {} Gwei",
            format_number(result.avg_proposer_reward_per_block as u64)
        );

        section("Sync Committee");
        println!(
            "- Selection Probability: {:.4}%",
            result.sync_committee_selection_probability * 100.0
        );
        println!(
            "- Reward per Slot while Serving: {} Gwei",
            format_number(result.sync_committee_reward_per_slot)
        );
    }

    if result.participation_rate < 1.0 {
        section("Participation Economics");
        println!("- Participation Multiplier: {:.2}x", result.participation_multiplier);
        println!("- Base APY (at 100% participation): {:.2}%", result.base_apy);
        println!("- Effective APY: {:.2}%", result.effective_apy);
        if let Some(warning) = &result.network_health_warning {
            println!("- WARNING: {}", warning);
        }
    }

    section("Annual Rewards");
    let mut table = new_table(vec!["Source", "ETH"]);
    for (label, gwei) in [
        ("Attestations", result.attestation_rewards_annual),
        ("Proposals", result.proposer_rewards_annual),
        ("Sync committee", result.sync_committee_rewards_annual),
        ("Total", result.total_annual_rewards),
    ] {
        table.add_row(vec![Cell::new(label), right(format!("{:.6}", eth(gwei)))]);
    }
    println!("{table}");
    println!("Annual Percentage Yield (APY): {:.2}%", result.apy);

    section("Projected Earnings");
    println!("- Daily: {:.6} ETH", eth(result.daily_rewards));
    println!("- Weekly: {:.6} ETH", eth(result.weekly_rewards));
    println!("- Monthly: {:.6} ETH", eth(result.monthly_rewards));
    Ok(())
}

/// Missed-duty and inactivity penalties for validator 0
pub fn print_penalties(penalties: &PenaltyResult, inactivity_epochs: u64, epochs_per_day: u64) {
    banner("PENALTY EXAMPLES");

    section("Missed Attestation Penalties");
    println!("- Source Penalty: {} Gwei", format_number(penalties.source_penalty));
    println!("- Target Penalty: {} Gwei", format_number(penalties.target_penalty));
    println!("- Head Penalty: {} Gwei", format_number(penalties.head_penalty));
    println!("- Total per Epoch: {} Gwei", format_number(penalties.total_attestation_penalty));
    println!("- Daily Cost: {:.6} ETH", penalties.daily_attestation_penalty);

    if inactivity_epochs > 0 {
        section(&format!("Inactivity Leak ({} epochs without finality)", inactivity_epochs));
        println!("- Inactivity Score: {}", penalties.inactivity_score);
        println!(
            "- Penalty per Epoch: {} Gwei ({:.6} ETH)",
            format_number(penalties.inactivity_penalty),
            eth(penalties.inactivity_penalty as f64)
        );
        println!("- Daily Penalty: {:.6} ETH", penalties.daily_inactivity_penalty);
        println!(
            "- Projected Loss in 30 days: {:.6} ETH",
            eth(penalties.inactivity_penalty as f64 * epochs_per_day as f64 * 30.0)
        );
    }
}

/// Slashing of validator 0 alongside `slashed_count - 1` others
pub fn print_slashing(result: &SlashingResult, slashed_count: u64) {
    section(&format!("Slashing Penalties ({} validators slashed together)", slashed_count));
    println!("- Initial Penalty: {:.6} ETH", eth(result.initial_penalty as f64));
    println!("- Proportional Penalty: {:.6} ETH", eth(result.proportional_penalty as f64));
    println!(
        "- Total Penalty: {:.6} ETH ({:.2}% of stake)",
        eth(result.total_penalty as f64),
        result.percentage_of_stake
    );
    println!(
        "- Whistleblower Reward: {:.6} ETH (proposer share {:.6} ETH)",
        eth(result.whistleblower_reward as f64),
        eth(result.proposer_reward as f64)
    );
}

pub fn comparison_table(rows: &[ComparisonResult]) -> Table {
    let mut table = new_table(vec![
        "Validators",
        "Total Staked (ETH)",
        "Base Reward (Gwei)",
        "Annual ETH",
        "APY %",
        "Daily ETH",
    ]);
    for row in rows {
        table.add_row(vec![
            right(format_number(row.validator_count as u64)),
            right(format_number(row.total_staked)),
            right(format_number(row.base_reward)),
            right(format!("{:.6}", row.annual_rewards)),
            right(format!("{:.2}%", row.apy)),
            right(format!("{:.6}", row.daily_rewards)),
        ]);
    }
    table
}

pub fn participation_table(rows: &[ParticipationComparison]) -> Table {
    let mut table = new_table(vec![
        "Participation",
        "Multiplier",
        "Base APY %",
        "Effective APY %",
        "Annual ETH",
        "Network Status",
    ]);
    for row in rows {
        table.add_row(vec![
            right(format!("{:.1}%", row.participation_rate * 100.0)),
            right(format!("{:.2}x", row.participation_multiplier)),
            right(format!("{:.2}%", row.base_apy)),
            right(format!("{:.2}%", row.effective_apy)),
            right(format!("{:.6}", row.annual_rewards)),
            Cell::new(row.network_health.label()),
        ]);
    }
    table
}

pub fn print_participation(validator_count: usize, rows: &[ParticipationComparison]) {
    banner("PARTICIPATION RATE IMPACT");
    println!();
    println!("Validator Count: {}", format_number(validator_count as u64));
    println!("{}", participation_table(rows));

    if rows.iter().any(|row| row.network_health != NetworkHealth::Healthy) {
        println!();
        println!("NOTE: Active validators earn more while others are offline.");
        println!(
            "      Below 2/3 participation the inactivity leak and loss of finality dominate."
        );
    }
}

pub fn print_slashing_impact(impact: &SlashingImpact) {
    banner("SLASHING IMPACT");

    section("Event");
    println!("- Slashed Validators: {}", format_number(impact.slashed_validator_count));
    println!("- Slashed Balance: {:.0} ETH", impact.slashed_balance);
    println!("- Share of Network: {:.4}%", impact.network_percentage);

    section("Per Validator");
    let mut table = new_table(vec![
        "Scenario",
        "Initial ETH",
        "Proportional ETH",
        "Total ETH",
        "% of Stake",
    ]);
    for (label, summary) in [
        ("Isolated", &impact.single_validator_penalty),
        ("Correlated", &impact.correlated_penalty),
    ] {
        table.add_row(vec![
            Cell::new(label),
            right(format!("{:.6}", summary.initial)),
            right(format!("{:.6}", summary.proportional)),
            right(format!("{:.6}", summary.total)),
            right(format!("{:.2}%", summary.percentage)),
        ]);
    }
    println!("{table}");

    section("Network");
    println!("- Total Penalties: {:.4} ETH", impact.network_impact.total_penalties);
    println!("- Stake Removed: {:.0} ETH", impact.network_impact.reduced_staking);
    println!("- Security Impact: {}", impact.network_impact.security_impact.name());
}

pub fn print_returns(
    apy: f64,
    break_even: &BreakEven,
    projection: &CompoundingProjection,
    net: &NetReturns,
) {
    banner("RETURN PROJECTIONS");
    println!();
    println!("APY: {:.2}%", apy);

    section("Break-even (rewards equal initial stake)");
    match (break_even.years, break_even.months, break_even.days) {
        (Some(years), Some(months), Some(days)) => {
            println!("- {:.2} years ({:.1} months, {:.0} days)", years, months, days);
        }
        _ => println!("- Never at a non-positive APY"),
    }

    section("Compounding (32 ETH, rewards restaked)");
    let mut table = new_table(vec!["Year", "Value (ETH)"]);
    for year in &projection.years {
        table.add_row(vec![right(year.year), right(format!("{:.6}", year.value))]);
    }
    println!("{table}");
    println!(
        "Total Return: {:.6} ETH ({:.2}%)",
        projection.total_return, projection.total_return_percentage
    );

    section("Net Returns");
    println!("- Gross APY: {:.2}%", net.gross_apy);
    println!("- Inflation Adjusted: {:.2}%", net.inflation_adjusted);
    println!("- After Tax: {:.2}%", net.after_tax);
    println!("- Real After Tax: {:.2}%", net.real_after_tax);
}

pub fn print_queue(current_validators: u64, pending_validators: u64, estimate: &QueueEstimate) {
    banner("ACTIVATION QUEUE");
    println!();
    println!("- Active Validators: {}", format_number(current_validators));
    println!("- Pending Validators: {}", format_number(pending_validators));
    println!("- Churn Limit: {} per epoch", estimate.churn_limit);
    println!("- Wait: {:.1} epochs ({:.2} days)", estimate.epochs, estimate.days);
}

pub fn print_distribution(distribution: &ValidatorDistribution) {
    banner("VALIDATOR DISTRIBUTION");
    println!();
    println!("- Total: {:.4} ETH", distribution.total_eth);
    println!("- Full Validators: {}", format_number(distribution.full_validators));
    println!("- Staked: {:.4} ETH", distribution.staked_eth);
    println!("- Remaining: {:.4} ETH", distribution.remaining_eth);
    println!("- Efficiency: {:.2}%", distribution.efficiency);
    println!("- Recommendation: {}", distribution.recommendation);
}

pub fn fork_table(config: &ChainConfig) -> Table {
    let mut table = new_table(vec![
        "Fork",
        "Version",
        "Inactivity Quotient",
        "Min Slashing Quotient",
        "Proportional Multiplier",
    ]);
    for (name, fork) in &config.forks {
        let label = if name.eq_ignore_ascii_case(&config.default_fork) {
            format!("{} (default)", name)
        } else {
            name.clone()
        };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(&fork.version),
            right(format_number(fork.inactivity_penalty_quotient)),
            right(fork.min_slashing_penalty_quotient),
            right(fork.proportional_slashing_multiplier),
        ]);
    }
    table
}
