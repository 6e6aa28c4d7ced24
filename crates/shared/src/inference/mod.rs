use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InferenceOutput {
    pub output_text: String,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("node not found: {0}")]
    NodeNotFound(Address),
    #[error("node {node} does not support model {model_id}")]
    ModelNotSupportedByNode { node: Address, model_id: String },
    #[error("inference service unavailable: {0}")]
    Unavailable(String),
}

/// Runs a prompt against a model on a given node. Output is opaque to the ledger.
#[async_trait]
pub trait InferenceExecutor: Send + Sync {
    async fn execute(
        &self,
        model_id: &str,
        node: Address,
        prompt: &str,
    ) -> Result<InferenceOutput, ExecutionError>;
}
