//! # Ethstake Economics - Validator Reward & Penalty Engine
//!
//! Closed-form estimates of Ethereum proof-of-stake validator rewards, penalties
//! and annualized yield for a simulated network state.
//!
//! ## Key Features
//!
//! - **Base reward**: `eb * BASE_REWARD_FACTOR / isqrt(total_active_balance)`
//! - **Attestation rewards**: source / target / head weighted components
//! - **Inclusion-modeled proposer reward** with configurable calibration
//! - **Participation economics**: inverse participation multiplier on a 100% baseline
//! - **Penalties**: missed duties, inactivity leak, slashing with correlation term
//!
//! ## Component Weights
//!
//! | Component | Weight | Share |
//! |-----------|--------|-------|
//! | Timely source | 14 | 21.9% |
//! | Timely target | 26 | 40.6% |
//! | Timely head | 14 | 21.9% |
//! | Sync committee | 2 | 3.1% |
//! | Proposer | 8 | 12.5% |
//!
//! ## Example
//!
//! ```
//! use ethstake_economics::{ChainConfig, NetworkState, RewardCalculator};
//!
//! let config = ChainConfig::mainnet();
//! let state = NetworkState::uniform(4096, config.max_effective_balance, "bellatrix");
//! let rewards = RewardCalculator::new(&config).compute_rewards(&state, 0.95).unwrap();
//! assert_eq!(rewards.base_reward_per_epoch, 178_885);
//! ```
//!
//! All Gwei amounts are integers and every integer division truncates. Every
//! calculation is a pure function of its inputs.

pub mod analysis;
pub mod arith;
pub mod chain;
pub mod error;
pub mod math;
pub mod penalties;
pub mod rewards;
pub mod slashing;
pub mod types;

// Re-exports
pub use analysis::{
    BreakEven, CompoundingProjection, NetReturns, QueueEstimate, ValidatorDistribution,
};
pub use chain::{ChainConfig, ForkConfig, ForkName, InclusionModel, GWEI_PER_ETH};
pub use error::{EconomicsError, Result};
pub use math::integer_sqrt;
pub use penalties::{next_inactivity_score, PenaltyCalculator};
pub use rewards::{AttestationRewards, RewardCalculator};
pub use slashing::{whistleblower_reward, SlashingCalculator, SlashingImpact};
pub use types::{
    ComparisonResult, DetailedBreakdown, NetworkHealth, NetworkMetrics, NetworkState,
    ParticipationComparison, PenaltyResult, RewardResult, SecurityImpact, SlashingResult, Validator,
};
