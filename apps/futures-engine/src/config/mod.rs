//! Configuration module for the futures engine.
//!
//! Loads a YAML file with `${VAR}` / `${VAR:-default}` environment
//! interpolation, then validates it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use futures_engine::config::load_config;
//!
//! let config = load_config(Some("config.yaml"))?;
//! let timing = config.rules.to_timing()?;
//! ```

mod accounts;
mod brokerage;
mod observability;
mod risk;
mod rules;

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::sizing::InstrumentTable;

pub use accounts::AccountConfig;
pub use brokerage::{BrokerageSettings, RetrySettings};
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use risk::RiskConfig;
pub use rules::RulesConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Brokerage connection. Required when any account is configured.
    #[serde(default)]
    pub brokerage: Option<BrokerageSettings>,
    /// Live accounts, in fan-out order after the simulator.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
    /// Default risk budget and tier cutoff.
    #[serde(default)]
    pub risk: RiskConfig,
    /// Micro/standard instrument pairs.
    #[serde(default)]
    pub instruments: InstrumentTable,
    /// Rule pipeline timing.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// `path` defaults to `config.yaml`.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}`. A missing variable with
/// no default becomes the empty string.
#[allow(clippy::expect_used)] // constant pattern
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let default_value = caps.get(2).map_or("", |m| m.as_str());
        match std::env::var(&caps[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.risk.risk_per_trade <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "risk.risk_per_trade must be positive".to_string(),
        ));
    }

    if config.risk.micro_cutoff == 0 {
        return Err(ConfigError::ValidationError(
            "risk.micro_cutoff must be at least 1".to_string(),
        ));
    }

    for spec in config.instruments.specs() {
        if spec.tick_size <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "instruments.{}.tick_size must be positive",
                spec.micro_root
            )));
        }
    }

    // Surfaces malformed times and zones at load time.
    config.rules.to_timing()?;

    let mut names = HashSet::new();
    for account in &config.accounts {
        if !names.insert(account.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "accounts: duplicate account name '{}'",
                account.name
            )));
        }
        if account.risk_per_trade.is_some_and(|r| r <= Decimal::ZERO) {
            return Err(ConfigError::ValidationError(format!(
                "accounts.{}.risk_per_trade must be positive",
                account.name
            )));
        }
    }

    if !config.accounts.is_empty() {
        let Some(brokerage) = &config.brokerage else {
            return Err(ConfigError::ValidationError(
                "accounts require a brokerage section".to_string(),
            ));
        };
        if brokerage.credentials().is_incomplete() {
            return Err(ConfigError::ValidationError(
                "brokerage credentials are incomplete".to_string(),
            ));
        }
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.observability.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_from_string("{}").unwrap();
        assert!(config.brokerage.is_none());
        assert!(config.accounts.is_empty());
        assert_eq!(config.risk.risk_per_trade, dec!(550));
        assert_eq!(config.risk.micro_cutoff, 10);
        assert!(config.instruments.lookup("MESM4").is_some());
        assert_eq!(config.observability.logging.format, "json");

        let timing = config.rules.to_timing().unwrap();
        assert_eq!(timing.timezone, chrono_tz::America::New_York);
    }

    #[test]
    fn env_var_with_default_when_missing() {
        let input = "mode: ${FUTURES_ENGINE_TEST_NONEXISTENT_VAR:-demo}";
        assert_eq!(interpolate_env_vars(input), "mode: demo");
    }

    #[test]
    fn env_var_without_default_becomes_empty() {
        let input = "password: ${FUTURES_ENGINE_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "password: ");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax
    fn env_var_with_default_uses_existing() {
        let result = interpolate_env_vars("path: ${PATH:-default}");
        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn full_config_parse() {
        let yaml = r#"
brokerage:
  base_url: "https://demo.example.com/v1/"
  username: trader
  password: hunter2
  client_id: "42"
  client_secret: s3cret
  device_id: device-1
  timeout_secs: 10
  retry:
    max_retries: 5
    initial_delay_ms: 250
accounts:
  - name: DEMO1
    account_id: 1001
  - name: DEMO2
    account_id: 1002
    risk_per_trade: 275
risk:
  risk_per_trade: 1100
instruments:
  - micro_root: MNQ
    standard_root: NQ
    micro_point_value: 2
    standard_point_value: 20
rules:
  stale_grace_minutes: 7
  session_close: "17:00"
  timezone: America/Chicago
observability:
  logging:
    level: debug
    format: pretty
"#;
        let config = load_config_from_string(yaml).unwrap();

        let brokerage = config.brokerage.as_ref().unwrap();
        let client = brokerage.to_client_config();
        assert_eq!(client.base_url, "https://demo.example.com/v1");
        assert_eq!(client.timeout, std::time::Duration::from_secs(10));
        assert_eq!(client.retry.max_retries, 5);
        assert_eq!(client.credentials.app_id, "futures-engine");

        let demo1 = config.accounts[0].to_live_account(config.risk.risk_per_trade);
        let demo2 = config.accounts[1].to_live_account(config.risk.risk_per_trade);
        assert_eq!(demo1.risk_per_trade, dec!(1100));
        assert_eq!(demo2.risk_per_trade, dec!(275));

        assert!(config.instruments.lookup("MESM4").is_none());
        assert!(config.instruments.lookup("NQM4").is_some());

        let timing = config.rules.to_timing().unwrap();
        assert_eq!(timing.stale_grace, chrono::Duration::minutes(7));
        assert_eq!(timing.unfilled_timeout, chrono::Duration::minutes(10));
        assert_eq!(timing.timezone, chrono_tz::America::Chicago);
    }

    #[test]
    fn accounts_without_brokerage_rejected() {
        let yaml = r"
accounts:
  - name: DEMO1
    account_id: 1001
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for missing brokerage");
        };
        assert!(err.to_string().contains("brokerage"));
    }

    #[test]
    fn incomplete_credentials_rejected() {
        let yaml = r#"
brokerage:
  username: trader
  password: "${FUTURES_ENGINE_TEST_UNLIKELY_TO_EXIST}"
accounts:
  - name: DEMO1
    account_id: 1001
"#;
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for incomplete credentials");
        };
        assert!(err.to_string().contains("incomplete"));
    }

    #[test]
    fn duplicate_account_names_rejected() {
        let yaml = r"
brokerage:
  username: trader
  password: p
  client_id: c
  client_secret: s
  device_id: d
accounts:
  - { name: DEMO1, account_id: 1001 }
  - { name: DEMO1, account_id: 1002 }
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for duplicate names");
        };
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn bad_session_close_rejected() {
        let Err(err) = load_config_from_string("rules: { session_close: \"4pm\" }") else {
            panic!("expected error for malformed close");
        };
        assert!(err.to_string().contains("session_close"));
    }

    #[test]
    fn unknown_timezone_rejected() {
        let Err(err) = load_config_from_string("rules: { timezone: Mars/Olympus }") else {
            panic!("expected error for unknown zone");
        };
        assert!(err.to_string().contains("timezone"));
    }

    #[test]
    fn non_positive_risk_rejected() {
        let Err(err) = load_config_from_string("risk: { risk_per_trade: 0 }") else {
            panic!("expected error for zero risk");
        };
        assert!(err.to_string().contains("risk_per_trade"));
    }

    #[test]
    fn unknown_log_format_rejected() {
        let yaml = "observability: { logging: { format: xml } }";
        assert!(load_config_from_string(yaml).is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "risk:\n  risk_per_trade: 300").unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.risk.risk_per_trade, dec!(300));
    }

    #[test]
    fn load_config_missing_file() {
        let Err(err) = load_config(Some("/nonexistent/futures-engine.yaml")) else {
            panic!("expected read error");
        };
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
