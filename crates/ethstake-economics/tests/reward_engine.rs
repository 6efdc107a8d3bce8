//! Integration tests for the reward, penalty and slashing engine
//!
//! Reference values are derived by hand from the published formulas:
//! 4096 validators at 32 ETH, `isqrt(131_072e9) = 11_448_668`,
//! `base_reward = 32e9 * 64 / 11_448_668 = 178_885`, 82_181 epochs per year.

use ethstake_economics::{
    integer_sqrt, next_inactivity_score, ChainConfig, DetailedBreakdown, EconomicsError,
    NetworkHealth, NetworkState, PenaltyCalculator, RewardCalculator, RewardResult,
    SlashingCalculator, GWEI_PER_ETH,
};
use ethstake_economics::analysis::network_metrics;
use proptest::prelude::*;

const MAX_EB: u64 = 32 * GWEI_PER_ETH;

fn assert_close(actual: f64, expected: f64) {
    let tolerance = expected.abs() * 1e-9;
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {}, got {}",
        expected,
        actual
    );
}

mod end_to_end {
    use super::*;

    fn reference_result() -> RewardResult {
        let config = ChainConfig::mainnet();
        let state = NetworkState::uniform(4096, MAX_EB, "bellatrix");
        RewardCalculator::new(&config).compute_rewards(&state, 0.95).unwrap()
    }

    #[test]
    fn test_reference_integers() {
        let result = reference_result();

        assert_eq!(result.validator_count, 4096);
        assert_eq!(result.total_staked_gwei, 131_072_000_000_000);
        assert_eq!(result.effective_balance, MAX_EB);
        assert_eq!(result.sqrt_total_balance, 11_448_668);
        assert_eq!(result.base_reward_per_epoch, 178_885);
        assert_eq!(result.source_reward, 39_131);
        assert_eq!(result.target_reward, 72_672);
        assert_eq!(result.head_reward, 39_131);
        assert_eq!(result.attestation_reward_per_epoch, 150_934);
        assert_eq!(result.proposer_reward_per_component, 7_187);
        assert_eq!(result.sync_committee_reward_per_slot, 1_397);
    }

    #[test]
    fn test_reference_proposer_and_sync() {
        let result = reference_result();

        assert_close(result.proposer_probability, 1.0 / 4096.0);
        assert_close(result.expected_proposals_per_year, 642.0390625);
        assert_close(result.included_attestations_per_block, 614.4);
        assert_close(result.avg_proposer_reward_per_block, 11_127_545.856);
        assert_close(result.proposer_reward_per_epoch, 86_933.952);
        assert_close(result.sync_committee_selection_probability, 0.125);
        assert_close(result.sync_committee_reward_per_epoch, 5_588.0);
    }

    #[test]
    fn test_reference_annualization() {
        let result = reference_result();

        // Baseline: 12_403_907_054 + 7_144_319_109.312 + 459_227_428 Gwei
        let baseline = 20_007_453_591.312;
        assert_close(result.base_apy, 62.52329247285);
        assert_close(result.total_annual_rewards, baseline / 0.95);
        assert_close(result.attestation_rewards_annual, 12_403_907_054.0 / 0.95);
        assert_close(result.proposer_rewards_annual, 7_144_319_109.312 / 0.95);
        assert_close(result.sync_committee_rewards_annual, 459_227_428.0 / 0.95);
        assert_close(result.effective_apy, 65.81399207668422);
        assert_eq!(result.apy, result.effective_apy);
        assert_close(result.participation_multiplier, 1.0 / 0.95);
        assert_close(result.daily_rewards, baseline / 0.95 / 365.25);
        assert_close(result.monthly_rewards, baseline / 0.95 / 12.0);
        assert_eq!(result.network_health, NetworkHealth::Healthy);
        assert!(result.network_health_warning.is_none());
    }

    #[test]
    fn test_half_participation() {
        let config = ChainConfig::mainnet();
        let state = NetworkState::uniform(4096, MAX_EB, "bellatrix");
        let result = RewardCalculator::new(&config).compute_rewards(&state, 0.5).unwrap();

        assert_eq!(result.participation_multiplier, 2.0);
        assert_eq!(result.effective_apy, 2.0 * result.base_apy);
        assert_eq!(format!("{:.2}", result.participation_multiplier), "2.00");
    }

    #[test]
    fn test_penalty_and_slashing_scenario() {
        let config = ChainConfig::mainnet();
        let state = NetworkState::uniform(4096, MAX_EB, "altair").with_inactivity(25, &config);

        let penalties = PenaltyCalculator::new(&config)
            .compute_penalties(&state, 17, true, false, false)
            .unwrap();
        assert_eq!(penalties.source_penalty, 0);
        assert_eq!(penalties.target_penalty + penalties.head_penalty, 111_803);
        assert_eq!(penalties.inactivity_score, 100);
        // 32e9 * 100 / (4 * 50_331_648)
        assert_eq!(penalties.inactivity_penalty, 15_894);

        let slashing = SlashingCalculator::new(&config)
            .slashing_penalties(&state, 17, 41 * MAX_EB)
            .unwrap();
        assert_eq!(slashing.initial_penalty, 500_000_000);
        // 32e9 * (41 * 32e9 * 2) / (4096 * 32e9)
        assert_eq!(slashing.proportional_penalty, 640_625_000);
    }

    #[test]
    fn test_errors_are_atomic() {
        let config = ChainConfig::mainnet();
        let state = NetworkState::uniform(8, MAX_EB, "bellatrix");

        assert!(matches!(
            RewardCalculator::new(&config).compute_rewards(&state, 1.0000001),
            Err(EconomicsError::InvalidArgument(_))
        ));
        assert!(matches!(
            PenaltyCalculator::new(&config).compute_penalties(&state, 8, true, true, true),
            Err(EconomicsError::IndexOutOfRange { index: 8, len: 8 })
        ));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_reward_result_json_round_trip() {
        let config = ChainConfig::mainnet();
        for (count, rate) in [(4096, 0.95), (12_345, 0.5), (900_000, 0.3)] {
            let state = NetworkState::uniform(count, MAX_EB, "bellatrix");
            let result = RewardCalculator::new(&config).compute_rewards(&state, rate).unwrap();

            let json = serde_json::to_string_pretty(&result).unwrap();
            let parsed: RewardResult = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, result);
        }
    }

    #[test]
    fn test_stable_field_names() {
        let config = ChainConfig::mainnet();
        let state = NetworkState::uniform(4096, MAX_EB, "bellatrix");
        let result = RewardCalculator::new(&config).compute_rewards(&state, 0.6).unwrap();
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["total_staked_gwei"], serde_json::json!(131_072_000_000_000u64));
        assert_eq!(value["base_reward_per_epoch"], serde_json::json!(178_885));
        assert!(value["base_reward_per_epoch"].is_u64());
        assert!(value["apy_percentage"].is_f64());
        assert_eq!(value["network_health"], "inactivity_leak");
        assert_eq!(value["network_health_warning"], "Inactivity leak active");

        let penalties = PenaltyCalculator::new(&config)
            .compute_penalties(&state, 0, false, true, true)
            .unwrap();
        let value = serde_json::to_value(&penalties).unwrap();
        assert!(value.get("daily_attestation_penalty_eth").is_some());
        assert!(value.get("daily_inactivity_penalty_eth").is_some());
    }

    #[test]
    fn test_detailed_breakdown_round_trip() {
        let config = ChainConfig::mainnet();
        let state = NetworkState::uniform(10_000, MAX_EB, "bellatrix");
        let rewards = RewardCalculator::new(&config).compute_rewards(&state, 0.9).unwrap();
        let breakdown = DetailedBreakdown {
            network_metrics: network_metrics(&config, &state, &rewards).unwrap(),
            penalty_results: None,
            slashing_results: Some(
                SlashingCalculator::new(&config)
                    .slashing_penalties(&state, 0, MAX_EB)
                    .unwrap(),
            ),
            reward_results: rewards,
        };

        let json = serde_json::to_string(&breakdown).unwrap();
        assert!(!json.contains("penalty_results"));
        let parsed: DetailedBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, breakdown);
    }
}

mod properties {
    use super::*;

    proptest! {
        #[test]
        fn prop_isqrt_bounds(n in any::<u64>()) {
            let r = integer_sqrt(n) as u128;
            prop_assert!(r * r <= n as u128);
            prop_assert!((n as u128) < (r + 1) * (r + 1));
        }

        #[test]
        fn prop_base_reward_monotone_in_balance(
            a in 0u64..=64_000_000_000,
            b in 0u64..=64_000_000_000,
            total in 1_000_000_000u64..=40_000_000_000_000_000,
        ) {
            let config = ChainConfig::mainnet();
            let calculator = RewardCalculator::new(&config);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (low_reward, high_reward) = (
                calculator.base_reward(lo, total).unwrap(),
                calculator.base_reward(hi, total).unwrap(),
            );
            prop_assert!(low_reward <= high_reward);
        }

        #[test]
        fn prop_base_reward_antitone_in_total(
            eb in 0u64..=32_000_000_000,
            a in 1u64..=40_000_000_000_000_000,
            b in 1u64..=40_000_000_000_000_000,
        ) {
            let config = ChainConfig::mainnet();
            let calculator = RewardCalculator::new(&config);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                calculator.base_reward(eb, lo).unwrap() >= calculator.base_reward(eb, hi).unwrap()
            );
        }

        #[test]
        fn prop_participation_identity(rate in 0.01f64..=1.0, count in 1usize..50_000) {
            let config = ChainConfig::mainnet();
            let state = NetworkState::uniform(count, MAX_EB, "bellatrix");
            let result = RewardCalculator::new(&config).compute_rewards(&state, rate).unwrap();
            prop_assert_eq!(result.effective_apy, result.base_apy / rate);
            prop_assert_eq!(result.apy, result.effective_apy);
        }

        #[test]
        fn prop_inactivity_score_never_negative(
            start in 0u64..1_000,
            steps in proptest::collection::vec((any::<bool>(), any::<bool>()), 0..50),
        ) {
            let config = ChainConfig::mainnet();
            let mut score = start;
            for (active, finalized) in steps {
                let next = next_inactivity_score(score, active, finalized, &config).unwrap();
                if finalized {
                    prop_assert_eq!(next, score.saturating_sub(1));
                } else {
                    prop_assert!(next > score);
                }
                score = next;
            }
        }

        #[test]
        fn prop_slashing_bounded_by_balance(
            slashed in 0u64..=2_000_000_000_000_000,
            count in 1usize..50_000,
        ) {
            let config = ChainConfig::mainnet();
            let state = NetworkState::uniform(count, MAX_EB, "bellatrix");
            let result = SlashingCalculator::new(&config)
                .slashing_penalties(&state, 0, slashed)
                .unwrap();
            prop_assert!(result.proportional_penalty <= MAX_EB);
            prop_assert_eq!(
                result.total_penalty,
                result.initial_penalty + result.proportional_penalty
            );
        }
    }
}
