//! Chain configuration loading
//!
//! Sources are layered, later ones win:
//!
//! 1. Mainnet defaults
//! 2. Optional TOML file (`--config`)
//! 3. `ETHSTAKE__*` environment variables, `__` separating nested keys
//!    (`ETHSTAKE__INCLUSION__INCLUSION_RATE=0.7`)

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use ethstake_economics::ChainConfig;
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ETHSTAKE";

/// Build and validate the chain configuration
pub fn load_chain_config(path: Option<&Path>) -> anyhow::Result<ChainConfig> {
    load_with_environment(path, chain_environment())
}

/// `ETHSTAKE__*` variables, `__` separating nested keys
fn chain_environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn load_with_environment(
    path: Option<&Path>,
    environment: Environment,
) -> anyhow::Result<ChainConfig> {
    let defaults = Config::try_from(&ChainConfig::mainnet())
        .context("Failed to serialize default configuration")?;
    let mut builder = Config::builder().add_source(defaults);

    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        tracing::debug!("Loading chain configuration from {}", path.display());
        builder = builder
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(true));
    }

    let chain_config: ChainConfig = builder
        .add_source(environment)
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Invalid configuration values")?;

    chain_config.validate()?;
    Ok(chain_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn isolated_env() -> Environment {
        // Prefix nothing in the test process sets
        Environment::with_prefix("ETHSTAKE_SETTINGS_TEST").separator("__")
    }

    /// The production environment layer fed from a fixed variable set
    fn chain_environment_from(vars: &[(&str, &str)]) -> Environment {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        chain_environment().source(Some(vars))
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_with_environment(None, isolated_env()).unwrap();
        assert_eq!(config, ChainConfig::mainnet());
    }

    #[test]
    fn test_partial_file_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_reward_factor = 32").unwrap();
        writeln!(file, "[inclusion]").unwrap();
        writeln!(file, "inclusion_rate = 0.75").unwrap();

        let config = load_with_environment(Some(file.path()), isolated_env()).unwrap();
        assert_eq!(config.base_reward_factor, 32);
        assert_eq!(config.inclusion.inclusion_rate, 0.75);
        assert_eq!(config.inclusion.inclusion_window_slots, 8);
        assert_eq!(config.slots_per_epoch, 32);
        assert!(config.forks.contains_key("merge"));
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "weight_denominator = 0").unwrap();

        assert!(load_with_environment(Some(file.path()), isolated_env()).is_err());
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let env = chain_environment_from(&[
            ("ETHSTAKE__INCLUSION__INCLUSION_RATE", "0.7"),
            ("ETHSTAKE__BASE_REWARD_FACTOR", "48"),
        ]);

        let config = load_with_environment(None, env).unwrap();
        assert_eq!(config.inclusion.inclusion_rate, 0.7);
        assert_eq!(config.base_reward_factor, 48);
        assert_eq!(config.inclusion.inclusion_window_slots, 8);
    }

    #[test]
    fn test_environment_wins_over_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_reward_factor = 32").unwrap();
        writeln!(file, "[inclusion]").unwrap();
        writeln!(file, "inclusion_rate = 0.5").unwrap();

        let env = chain_environment_from(&[("ETHSTAKE__INCLUSION__INCLUSION_RATE", "0.7")]);
        let config = load_with_environment(Some(file.path()), env).unwrap();

        assert_eq!(config.inclusion.inclusion_rate, 0.7);
        // Keys the environment leaves alone keep the file value
        assert_eq!(config.base_reward_factor, 32);
    }

    #[test]
    fn test_environment_values_are_validated() {
        let env = chain_environment_from(&[("ETHSTAKE__SECONDS_PER_SLOT", "0")]);
        assert!(load_with_environment(None, env).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let missing = Path::new("/nonexistent/ethstake.toml");
        let err = load_with_environment(Some(missing), isolated_env()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
