use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use utoipa::ToSchema;

/// A registered compute provider. The provider's address doubles as the node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Node {
    #[schema(value_type = String, example = "0x742d35Cc6634C0532925a3b8D6Ac6f29d1e6b8e0")]
    pub address: Address,
    pub metadata: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(example = "North America")]
    pub location: Option<String>,
    #[serde(with = "crate::models::amount")]
    #[schema(value_type = String, example = "1000")]
    pub stake: U256,
    pub supported_models: BTreeSet<String>,
    pub active: bool,
    pub registered_at: DateTime<Utc>,
}

impl Node {
    pub fn supports(&self, model_id: &str) -> bool {
        self.supported_models.contains(model_id)
    }

    /// Case-insensitive substring match on the declared location. Nodes that
    /// declared none never match.
    pub fn located_in(&self, location: &str) -> bool {
        self.location
            .as_deref()
            .is_some_and(|own| own.to_lowercase().contains(&location.to_lowercase()))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{json}"),
            Err(_) => write!(f, "Node({})", self.address),
        }
    }
}

/// Registration payload submitted by a provider for itself.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NodeRegistration {
    pub metadata: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub supported_models: BTreeSet<String>,
    #[serde(with = "crate::models::amount")]
    #[schema(value_type = String, example = "1000")]
    pub stake: U256,
}
