use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upper bound on the platform fee rate: 3000 bps = 30%.
pub const MAX_PLATFORM_FEE_RATE_BPS: u16 = 3000;
pub const BASIS_POINTS_DENOMINATOR: u64 = 10_000;

pub const DEFAULT_MIN_NODE_STAKE: u64 = 1000;
pub const DEFAULT_PLATFORM_FEE_RATE_BPS: u16 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PolicyConfig {
    #[serde(with = "crate::models::amount")]
    #[schema(value_type = String, example = "1000")]
    pub min_node_stake: U256,
    pub platform_fee_rate_bps: u16,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_node_stake: U256::from(DEFAULT_MIN_NODE_STAKE),
            platform_fee_rate_bps: DEFAULT_PLATFORM_FEE_RATE_BPS,
        }
    }
}

/// How a registration is treated when the identity already holds an inactive node.
/// An identity with an active node is always rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReregistrationPolicy {
    #[default]
    Reject,
    ReplaceInactive,
}

/// Result of splitting an escrowed fee between the node and the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeeSplit {
    #[serde(with = "crate::models::amount")]
    #[schema(value_type = String)]
    pub node_payment: U256,
    #[serde(with = "crate::models::amount")]
    #[schema(value_type = String)]
    pub platform_fee: U256,
}

impl FeeSplit {
    /// `platform_fee = floor(fee * rate / 10000)`, the remainder goes to the node.
    ///
    /// Computed as `(fee / d) * rate + (fee % d) * rate / d`, which equals the
    /// floor of the full product and never overflows for `rate <= d`.
    pub fn compute(fee: U256, rate_bps: u16) -> Self {
        let denominator = U256::from(BASIS_POINTS_DENOMINATOR);
        let rate = U256::from(rate_bps);
        let whole = (fee / denominator) * rate;
        let partial = (fee % denominator) * rate / denominator;
        let platform_fee = whole + partial;
        Self {
            node_payment: fee - platform_fee,
            platform_fee,
        }
    }
}
