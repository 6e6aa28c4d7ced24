use alloy::primitives::{Address, U256};
use serde::Deserialize;
use shared::models::policy::{ReregistrationPolicy, MAX_PLATFORM_FEE_RATE_BPS};
use shared::models::{ModelInfo, PolicyConfig};
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpeningBalance {
    pub address: Address,
    #[serde(with = "shared::models::amount")]
    pub amount: U256,
}

/// Ledger settings read from the optional TOML file passed with `--config`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    #[serde(default)]
    pub admin: Address,
    #[serde(default)]
    pub treasury: Address,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub reregistration: ReregistrationPolicy,
    #[serde(default)]
    pub models: Vec<ModelInfo>,
    #[serde(default)]
    pub balances: Vec<OpeningBalance>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            admin: Address::ZERO,
            treasury: Address::ZERO,
            policy: PolicyConfig::default(),
            reregistration: ReregistrationPolicy::default(),
            models: Vec::new(),
            balances: Vec::new(),
        }
    }
}

impl LedgerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy.platform_fee_rate_bps > MAX_PLATFORM_FEE_RATE_BPS {
            return Err(ConfigError::Invalid(format!(
                "platform_fee_rate_bps {} exceeds {MAX_PLATFORM_FEE_RATE_BPS}",
                self.policy.platform_fee_rate_bps
            )));
        }

        let mut seen = HashSet::new();
        for model in &self.models {
            if model.id.trim().is_empty() {
                return Err(ConfigError::Invalid("model id must not be blank".to_string()));
            }
            if !seen.insert(model.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate model id: {}",
                    model.id
                )));
            }
        }
        Ok(())
    }

    /// Opening balances folded by address.
    pub fn opening_balances(&self) -> HashMap<Address, U256> {
        let mut balances: HashMap<Address, U256> = HashMap::new();
        for entry in &self.balances {
            let slot = balances.entry(entry.address).or_default();
            *slot = slot.saturating_add(entry.amount);
        }
        balances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::catalog::InputType;
    use std::io::Write;
    use std::str::FromStr;

    const SAMPLE: &str = r#"
admin = "0x00000000000000000000000000000000000000ad"
treasury = "0x0000000000000000000000000000000000000007"
reregistration = "replace_inactive"

[policy]
min_node_stake = "2000"
platform_fee_rate_bps = 250

[[models]]
id = "sentiment-analysis"
name = "Sentiment Analysis"
description = "Analyze text to determine sentiment"
input_type = "text"
token_cost = 0.05

[[balances]]
address = "0x0000000000000000000000000000000000000002"
amount = "600"

[[balances]]
address = "0x0000000000000000000000000000000000000002"
amount = 400
"#;

    #[test]
    fn test_parse_full_config() {
        let config = LedgerConfig::parse(SAMPLE).unwrap();
        assert_eq!(
            config.admin,
            Address::from_str("0x00000000000000000000000000000000000000ad").unwrap()
        );
        assert_eq!(config.treasury, Address::with_last_byte(7));
        assert_eq!(config.reregistration, ReregistrationPolicy::ReplaceInactive);
        assert_eq!(config.policy.min_node_stake, U256::from(2000u64));
        assert_eq!(config.policy.platform_fee_rate_bps, 250);
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].input_type, InputType::Text);

        let balances = config.opening_balances();
        assert_eq!(
            balances.get(&Address::with_last_byte(2)),
            Some(&U256::from(1000u64))
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LedgerConfig::parse("").unwrap();
        assert_eq!(config.policy, PolicyConfig::default());
        assert_eq!(config.reregistration, ReregistrationPolicy::Reject);
        assert!(config.models.is_empty());
    }

    #[test]
    fn test_rejects_fee_rate_above_cap() {
        let err = LedgerConfig::parse(
            r#"
[policy]
min_node_stake = "1000"
platform_fee_rate_bps = 3001
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_duplicate_models_and_unknown_keys() {
        let duplicate = r#"
[[models]]
id = "a"
name = "A"
input_type = "text"

[[models]]
id = "a"
name = "A again"
input_type = "image"
"#;
        assert!(matches!(
            LedgerConfig::parse(duplicate).unwrap_err(),
            ConfigError::Invalid(_)
        ));
        assert!(matches!(
            LedgerConfig::parse("unknown_key = 1").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = LedgerConfig::load(file.path()).unwrap();
        assert_eq!(config.policy.platform_fee_rate_bps, 250);

        let missing = LedgerConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config =
            LedgerConfig::parse(include_str!("../../../config/ledger.example.toml")).unwrap();
        assert_eq!(config.models.len(), 6);
        assert_eq!(config.policy, PolicyConfig::default());
        assert_eq!(
            config.models[2].accuracy.as_deref(),
            Some("94%")
        );
    }
}
