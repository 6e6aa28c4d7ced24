use crate::models::policy::FeeSplit;
use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InferenceRequest {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub requester: Address,
    #[schema(value_type = String)]
    pub node: Address,
    pub model_id: String,
    #[serde(with = "crate::models::amount")]
    #[schema(value_type = String, example = "10")]
    pub fee: U256,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement: Option<FeeSplit>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl InferenceRequest {
    pub fn new(requester: Address, node: Address, model_id: String, fee: U256) -> Self {
        Self {
            id: Uuid::new_v4(),
            requester,
            node,
            model_id,
            fee,
            completed: false,
            result: None,
            settlement: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }
}

/// Body of `POST /requests`; the requester is the authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRequestPayload {
    #[schema(value_type = String)]
    pub node: Address,
    pub model_id: String,
    #[serde(with = "crate::models::amount")]
    #[schema(value_type = String, example = "10")]
    pub fee: U256,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitResultPayload {
    pub result: String,
}
