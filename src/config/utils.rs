/// Configuration loading and validation
///
/// The configuration is loaded once per run and handed to the keeper by
/// value; there is no process-wide instance.
use super::schemas::Config;
use crate::errors::{KeeperError, KeeperResult};
use crate::logger::{self, LogTag};
use std::path::Path;
use url::Url;

/// Largest supported feed precision, 10^38 still fits in a u128
pub const MAX_ORACLE_DECIMALS: u32 = 38;

/// Load configuration from a TOML file.
///
/// A missing file is not an error: defaults are used and a warning is logged.
/// An unreadable, malformed or invalid file is a `Configuration` error.
pub fn load_config_from_path(path: &str) -> KeeperResult<Config> {
    let config = if Path::new(path).exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            KeeperError::configuration(format!("Failed to read config file '{}': {}", path, e))
        })?;
        parse_config(&contents)
            .map_err(|e| KeeperError::configuration(format!("'{}': {}", path, e)))?
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        Config::default()
    };

    config.validate()?;

    logger::debug(
        LogTag::Config,
        &format!(
            "Loaded config: oracle={} backend={} failures={:?}",
            config.oracle.rpc_url, config.backend.base_url, config.candidate_failures
        ),
    );

    Ok(config)
}

/// Parse configuration from TOML text without validating it
pub fn parse_config(contents: &str) -> KeeperResult<Config> {
    toml::from_str::<Config>(contents)
        .map_err(|e| KeeperError::configuration(format!("Failed to parse config: {}", e)))
}

impl Config {
    /// Validate values that would otherwise surface as confusing network errors
    pub fn validate(&self) -> KeeperResult<()> {
        validate_http_url("oracle.rpc_url", &self.oracle.rpc_url)?;
        validate_http_url("backend.base_url", &self.backend.base_url)?;

        if !is_hex_of_len(&self.oracle.contract_address, 40) {
            return Err(KeeperError::configuration(format!(
                "oracle.contract_address must be a 0x-prefixed 20-byte hex address, got '{}'",
                self.oracle.contract_address
            )));
        }

        if !is_hex_of_len(&self.oracle.selector, 8) {
            return Err(KeeperError::configuration(format!(
                "oracle.selector must be a 0x-prefixed 4-byte hex selector, got '{}'",
                self.oracle.selector
            )));
        }

        if self.oracle.decimals > MAX_ORACLE_DECIMALS {
            return Err(KeeperError::configuration(format!(
                "oracle.decimals must be at most {}, got {}",
                MAX_ORACLE_DECIMALS, self.oracle.decimals
            )));
        }

        if self.oracle.timeout_secs == 0 || self.backend.timeout_secs == 0 {
            return Err(KeeperError::configuration(
                "timeouts must be greater than zero",
            ));
        }

        if !self.execute_orders.volatility.is_finite() {
            return Err(KeeperError::configuration(
                "execute_orders.volatility must be a finite number",
            ));
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> KeeperResult<()> {
    let url = Url::parse(value)
        .map_err(|e| KeeperError::configuration(format!("{} '{}': {}", field, value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(KeeperError::configuration(format!(
            "{} must use http or https, got '{}'",
            field, scheme
        ))),
    }
}

fn is_hex_of_len(value: &str, digits: usize) -> bool {
    value
        .strip_prefix("0x")
        .map(|hex| hex.len() == digits && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CandidateFailurePolicy, ResultEncoding};

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.oracle.decimals, 8);
        assert_eq!(config.execute_orders.max_candidates, 3);
        assert_eq!(config.close_positions.max_candidates, 0);
        assert_eq!(config.candidate_failures, CandidateFailurePolicy::Log);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = parse_config(
            r#"
candidate_failures = "silent"

[backend]
base_url = "http://localhost:8080"

[execute_orders]
max_candidates = 0
output = "ids"
"#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "http://localhost:8080");
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.execute_orders.max_candidates, 0);
        assert_eq!(config.execute_orders.volatility, 1.3);
        assert_eq!(config.execute_orders.output, ResultEncoding::Ids);
        assert_eq!(config.candidate_failures, CandidateFailurePolicy::Silent);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_toml_is_configuration_error() {
        let err = parse_config("[backend\nbase_url = 1").unwrap_err();
        assert!(matches!(err, KeeperError::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.backend.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.oracle.selector = "50d25bcd".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.oracle.contract_address = "0x1234".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.oracle.decimals = 40;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.backend.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config_from_path("/nonexistent/perpkeeper.toml").unwrap();
        assert_eq!(config, Config::default());
    }
}
