use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::inference::{ExecutionError, InferenceExecutor, InferenceOutput};
use std::time::Duration;
use url::Url;

#[derive(Serialize)]
struct InferRequest<'a> {
    model_id: &'a str,
    node_id: String,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
}

/// Client for an external inference service exposing `POST /infer`.
pub struct HttpInferenceExecutor {
    client: Client,
    endpoint: Url,
}

impl HttpInferenceExecutor {
    pub fn new(base_url: &Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = base_url.join("infer")?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl InferenceExecutor for HttpInferenceExecutor {
    async fn execute(
        &self,
        model_id: &str,
        node: Address,
        prompt: &str,
    ) -> Result<InferenceOutput, ExecutionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&InferRequest {
                model_id,
                node_id: node.to_string(),
                prompt,
            })
            .send()
            .await
            .map_err(|e| ExecutionError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<InferenceOutput>()
                .await
                .map_err(|e| ExecutionError::Unavailable(format!("malformed response: {e}"))),
            StatusCode::NOT_FOUND => {
                let body = response
                    .json::<ErrorBody>()
                    .await
                    .map(|body| body.code)
                    .unwrap_or_default();
                match body.as_str() {
                    "NODE_NOT_FOUND" => Err(ExecutionError::NodeNotFound(node)),
                    _ => Err(ExecutionError::ModelNotFound(model_id.to_string())),
                }
            }
            StatusCode::UNPROCESSABLE_ENTITY => Err(ExecutionError::ModelNotSupportedByNode {
                node,
                model_id: model_id.to_string(),
            }),
            status => Err(ExecutionError::Unavailable(format!(
                "inference service returned {status}"
            ))),
        }
    }
}
