//! Token amounts travel over JSON and TOML as decimal strings so that values
//! beyond `u64` survive untouched. Use with `#[serde(with = "...")]`.

use alloy::primitives::U256;
use serde::{Deserialize, Deserializer, Serializer};
use std::str::FromStr;

pub fn serialize<S>(amount: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&amount.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(text) => parse_amount(&text).map_err(serde::de::Error::custom),
        Raw::Number(value) => Ok(U256::from(value)),
    }
}

/// Parses a decimal (or `0x`-prefixed hex) amount string.
pub fn parse_amount(text: &str) -> Result<U256, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("amount must not be empty".to_string());
    }
    U256::from_str(trimmed).map_err(|e| format!("invalid amount {trimmed:?}: {e}"))
}
