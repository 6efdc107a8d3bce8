//! Ethstake CLI
//!
//! Command-line front end for the staking reward engine.

mod commands;
mod output;
mod settings;

use clap::{Parser, Subcommand};
use ethstake_economics::analysis::MAX_PROJECTION_YEARS;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ethstake")]
#[command(version)]
#[command(
    about = "Ethereum proof-of-stake validator rewards, penalties and APY",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Chain configuration file (TOML); mainnet defaults when omitted
    #[arg(long, global = true, env = "ETHSTAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(short, long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewards for one network size
    Rewards {
        /// Number of active validators
        #[arg(short, long)]
        validators: usize,

        /// Network participation rate in (0, 1]
        #[arg(short, long, default_value = "0.95")]
        participation: f64,

        /// Fork whose penalty parameters apply (default from config)
        #[arg(short, long)]
        fork: Option<String>,

        /// Show the per-component breakdown
        #[arg(short, long)]
        detailed: bool,

        /// Show penalty examples
        #[arg(long)]
        penalties: bool,

        /// Epochs without finality for the inactivity leak example
        #[arg(short, long, default_value = "0")]
        inactivity: u64,

        /// Number of validators slashed together
        #[arg(short, long, default_value = "0")]
        slashing: u64,
    },

    /// Compare several network sizes
    Compare {
        /// Comma separated validator counts
        #[arg(short, long, value_delimiter = ',', required = true)]
        counts: Vec<usize>,

        /// Network participation rate in (0, 1]
        #[arg(short, long, default_value = "0.95")]
        participation: f64,
    },

    /// Compare the standard participation rates for one network size
    Participation {
        /// Number of active validators
        #[arg(short, long, default_value = "10000")]
        validators: usize,
    },

    /// Impact of a correlated slashing event
    Slashing {
        /// Number of active validators
        #[arg(short, long)]
        validators: usize,

        /// Number of validators slashed together
        #[arg(short = 'k', long)]
        count: u64,

        /// Fork whose slashing parameters apply (default from config)
        #[arg(short, long)]
        fork: Option<String>,
    },

    /// Break-even, compounding and net returns
    Returns {
        /// Number of active validators
        #[arg(short, long)]
        validators: usize,

        /// Network participation rate in (0, 1]
        #[arg(short, long, default_value = "0.95")]
        participation: f64,

        /// Years of compounding (1 to 100)
        #[arg(
            short,
            long,
            default_value = "5",
            value_parser = clap::value_parser!(u32).range(1..=MAX_PROJECTION_YEARS as i64)
        )]
        years: u32,

        /// Inflation rate in percent
        #[arg(long, default_value = "0.0")]
        inflation: f64,

        /// Tax rate in percent
        #[arg(long, default_value = "0.0")]
        tax: f64,
    },

    /// Activation queue wait time
    Queue {
        /// Current active validators
        #[arg(short, long)]
        validators: u64,

        /// Validators waiting to activate
        #[arg(long)]
        pending: u64,
    },

    /// Split an ETH amount into 32 ETH validators
    Distribution {
        /// ETH available to stake
        #[arg(long)]
        eth: f64,
    },

    /// Show the fork parameter table
    Forks,

    /// Print the effective chain configuration as TOML
    Config,
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = settings::load_chain_config(cli.config.as_deref())?;
    let json = cli.json;

    match cli.command {
        Commands::Rewards {
            validators,
            participation,
            fork,
            detailed,
            penalties,
            inactivity,
            slashing,
        } => {
            let fork = fork.unwrap_or_else(|| config.default_fork.clone());
            commands::rewards(
                &config,
                json,
                &commands::RewardsOptions {
                    validators,
                    participation,
                    fork,
                    detailed,
                    penalties,
                    inactivity_epochs: inactivity,
                    slashed_count: slashing,
                },
            )?;
        }

        Commands::Compare { counts, participation } => {
            commands::compare(&config, json, &counts, participation)?;
        }

        Commands::Participation { validators } => {
            commands::participation(&config, json, validators)?;
        }

        Commands::Slashing { validators, count, fork } => {
            let fork = fork.unwrap_or_else(|| config.default_fork.clone());
            commands::slashing(&config, json, validators, count, &fork)?;
        }

        Commands::Returns {
            validators,
            participation,
            years,
            inflation,
            tax,
        } => {
            commands::returns(&config, json, validators, participation, years, inflation, tax)?;
        }

        Commands::Queue { validators, pending } => {
            commands::queue(&config, json, validators, pending)?;
        }

        Commands::Distribution { eth } => {
            commands::distribution(json, eth)?;
        }

        Commands::Forks => {
            commands::forks(&config, json)?;
        }

        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
