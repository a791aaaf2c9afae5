//! Configuration management for the snowline toolkit
//!
//! Loads configuration from TOML files with environment variable substitution.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub network: NetworkConfig,
    #[serde(default)]
    pub submit: SubmitConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Gateway base URL, e.g. https://devnet-gateway.multiversx.com
    pub gateway_url: String,
    /// Chain identifier included in every transaction ("D" for devnet)
    pub chain_id: String,
    /// Gas price in the smallest denomination
    #[serde(default = "default_gas_price")]
    pub gas_price: u64,
    /// Explorer base URL used only for log output
    pub explorer_url: Option<String>,
    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Submission and finalization tuning shared by every operation
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitConfig {
    /// Total attempts for one transaction send, including the first
    pub max_attempts: u32,
    /// Sleep between send attempts
    pub retry_backoff_ms: u64,
    /// Delay before the first status poll, so the gateway has indexed the tx
    pub initial_delay_secs: u64,
    /// Interval between status polls
    pub poll_interval_secs: u64,
    /// Overall finalization timeout per transaction
    pub poll_timeout_secs: u64,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_backoff_ms: 1000,
            initial_delay_secs: 2,
            poll_interval_secs: 5,
            poll_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
    /// Environment variable holding a hex-encoded secret key
    pub private_key_env: Option<String>,
    /// Path to a file holding a hex-encoded secret key
    pub key_file: Option<PathBuf>,
}

fn default_gas_price() -> u64 {
    1_000_000_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Settings {
    /// Load settings from configuration files
    pub fn load() -> Result<Self> {
        let config_path = env::var("SNOWLINE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific path
    pub fn load_from(config_path: &PathBuf) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        // Substitute environment variables
        let config_str = substitute_env_vars(&config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.network.gateway_url.is_empty() {
            anyhow::bail!("network.gateway_url must be set");
        }
        if self.network.chain_id.is_empty() {
            anyhow::bail!("network.chain_id must be set");
        }
        if self.submit.max_attempts == 0 {
            anyhow::bail!("submit.max_attempts must be at least 1");
        }
        if self.submit.poll_interval_secs == 0 {
            anyhow::bail!("submit.poll_interval_secs must be positive");
        }
        Ok(())
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();
    let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_env_var_substitution() {
        env::set_var("TEST_VAR", "test_value");
        let input = "url = \"https://api.example.com/${TEST_VAR}/endpoint\"";
        let result = substitute_env_vars(input);
        assert_eq!(
            result,
            "url = \"https://api.example.com/test_value/endpoint\""
        );
    }

    #[test]
    fn test_load_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[network]\ngateway_url = \"https://devnet-gateway.multiversx.com\"\nchain_id = \"D\""
        )
        .unwrap();

        let settings = Settings::load_from(&file.path().to_path_buf()).unwrap();
        assert_eq!(settings.network.chain_id, "D");
        assert_eq!(settings.network.gas_price, 1_000_000_000);
        assert_eq!(settings.submit.max_attempts, 5);
        assert_eq!(settings.submit.poll_timeout_secs, 60);
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[network]\ngateway_url = \"http://localhost\"\nchain_id = \"D\"\n\
             [submit]\nmax_attempts = 5\nretry_backoff_ms = 1000\n\
             initial_delay_secs = 2\npoll_interval_secs = 0\npoll_timeout_secs = 60"
        )
        .unwrap();

        assert!(Settings::load_from(&file.path().to_path_buf()).is_err());
    }
}
