pub mod http_executor;

pub use http_executor::HttpInferenceExecutor;

use crate::error::{LedgerError, LedgerResult};
use crate::registry::NodeRegistry;
use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::inference::{InferenceExecutor, InferenceOutput};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One completed dispatch, kept in the inference history.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceRecord {
    pub id: Uuid,
    pub model_id: String,
    pub node: Address,
    pub prompt: String,
    #[serde(flatten)]
    pub output: InferenceOutput,
    pub latency_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// Forwards prompts to the execution service after the registry confirmed the
/// node serves the model. Payment is not involved here.
pub struct InferenceDispatcher {
    registry: Arc<NodeRegistry>,
    executor: Arc<dyn InferenceExecutor>,
    history: RwLock<Vec<InferenceRecord>>,
}

impl InferenceDispatcher {
    pub fn new(registry: Arc<NodeRegistry>, executor: Arc<dyn InferenceExecutor>) -> Self {
        Self {
            registry,
            executor,
            history: RwLock::new(Vec::new()),
        }
    }

    /// Successful dispatches, newest first, optionally only those served by `node`.
    pub async fn history(&self, node: Option<Address>) -> Vec<InferenceRecord> {
        self.history
            .read()
            .await
            .iter()
            .rev()
            .filter(|record| node.map_or(true, |node| record.node == node))
            .cloned()
            .collect()
    }

    pub async fn run(&self, model_id: &str, node: Address, prompt: &str) -> LedgerResult<InferenceRecord> {
        if model_id.trim().is_empty() || prompt.trim().is_empty() {
            return Err(LedgerError::Validation(
                "model_id and prompt are required".to_string(),
            ));
        }
        self.registry.ensure_serves(node, model_id).await?;

        let started = Instant::now();
        let output = self.executor.execute(model_id, node, prompt).await?;
        let record = InferenceRecord {
            id: Uuid::new_v4(),
            model_id: model_id.to_string(),
            node,
            prompt: prompt.to_string(),
            output,
            latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            created_at: Utc::now(),
        };
        self.history.write().await.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyStore;
    use crate::store::LedgerStore;
    use alloy::primitives::U256;
    use async_trait::async_trait;
    use shared::inference::ExecutionError;
    use shared::models::node::NodeRegistration;
    use shared::models::policy::ReregistrationPolicy;
    use shared::models::PolicyConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingExecutor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InferenceExecutor for CountingExecutor {
        async fn execute(
            &self,
            model_id: &str,
            _node: Address,
            prompt: &str,
        ) -> Result<InferenceOutput, ExecutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if model_id == "vanished" {
                return Err(ExecutionError::ModelNotFound(model_id.to_string()));
            }
            Ok(InferenceOutput {
                output_text: format!("{model_id}: {}", prompt.len()),
                confidence_score: 0.9,
            })
        }
    }

    async fn dispatcher() -> (InferenceDispatcher, Arc<CountingExecutor>, Address) {
        let store = Arc::new(LedgerStore::new(PolicyConfig::default()));
        let policy = Arc::new(PolicyStore::new(store.clone(), Address::repeat_byte(0xAD)));
        let registry = Arc::new(NodeRegistry::new(
            store,
            policy,
            ReregistrationPolicy::Reject,
        ));
        let node = Address::repeat_byte(0x01);
        registry
            .register_node(
                node,
                NodeRegistration {
                    metadata: String::new(),
                    name: None,
                    location: None,
                    supported_models: ["summarization", "vanished"]
                        .iter()
                        .map(|m| m.to_string())
                        .collect(),
                    stake: U256::from(1000u64),
                },
            )
            .await
            .unwrap();
        let executor = Arc::new(CountingExecutor::default());
        (
            InferenceDispatcher::new(registry, executor.clone()),
            executor,
            node,
        )
    }

    #[tokio::test]
    async fn test_dispatch_runs_eligible_node() {
        let (dispatcher, executor, node) = dispatcher().await;
        let record = dispatcher.run("summarization", node, "hello").await.unwrap();
        assert_eq!(record.output.output_text, "summarization: 5");
        assert_eq!(record.node, node);
        assert_eq!(record.prompt, "hello");
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_history_keeps_successful_dispatches_newest_first() {
        let (dispatcher, _, node) = dispatcher().await;
        assert!(dispatcher.history(None).await.is_empty());

        let first = dispatcher.run("summarization", node, "first").await.unwrap();
        let second = dispatcher.run("summarization", node, "second").await.unwrap();
        dispatcher.run("vanished", node, "lost").await.unwrap_err();
        dispatcher
            .run("summarization", Address::repeat_byte(0x02), "nowhere")
            .await
            .unwrap_err();

        let history = dispatcher.history(None).await;
        let ids: Vec<Uuid> = history.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(history[0].prompt, "second");
        assert_eq!(history[1].model_id, "summarization");
        assert!(history[1].created_at <= history[0].created_at);

        assert_eq!(dispatcher.history(Some(node)).await.len(), 2);
        assert!(dispatcher
            .history(Some(Address::repeat_byte(0x02)))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_ineligible_node_never_reaches_executor() {
        let (dispatcher, executor, node) = dispatcher().await;
        let err = dispatcher
            .run("sentiment-analysis", node, "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ModelNotSupported { .. }));

        let stranger = Address::repeat_byte(0x02);
        let err = dispatcher
            .run("summarization", stranger, "hello")
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::NodeNotFound(stranger));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_executor_errors_are_translated() {
        let (dispatcher, _, node) = dispatcher().await;
        let err = dispatcher.run("vanished", node, "hello").await.unwrap_err();
        assert_eq!(err, LedgerError::ModelNotFound("vanished".to_string()));
    }

    #[tokio::test]
    async fn test_missing_prompt() {
        let (dispatcher, executor, node) = dispatcher().await;
        let err = dispatcher.run("summarization", node, "").await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }
}
