use crate::error::{LedgerError, LedgerResult};
use crate::registry::eligible_node;
use crate::store::LedgerStore;
use alloy::primitives::{Address, U256};
use shared::balance::BalanceHolder;
use shared::models::InferenceRequest;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub requester: Option<Address>,
    pub node: Option<Address>,
    pub completed: Option<bool>,
}

impl RequestFilter {
    fn matches(&self, request: &InferenceRequest) -> bool {
        self.requester.map_or(true, |r| r == request.requester)
            && self.node.map_or(true, |n| n == request.node)
            && self.completed.map_or(true, |c| c == request.completed)
    }
}

/// Creates escrow-backed inference requests against registered nodes.
pub struct RequestLedger {
    store: Arc<LedgerStore>,
    balances: Arc<dyn BalanceHolder>,
}

impl RequestLedger {
    pub fn new(store: Arc<LedgerStore>, balances: Arc<dyn BalanceHolder>) -> Self {
        Self { store, balances }
    }

    /// Escrows `fee` from `requester` and records a pending request assigned to `node`.
    /// The debit happens before the record is written; if it fails nothing is stored.
    pub async fn create_request(
        &self,
        requester: Address,
        node: Address,
        model_id: &str,
        fee: U256,
    ) -> LedgerResult<Uuid> {
        if model_id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "model_id must not be blank".to_string(),
            ));
        }

        let seq = self.store.sequence().await;
        self.store
            .read(|state| eligible_node(state, node, model_id).map(|_| ()))
            .await?;

        self.balances
            .debit(requester, fee)
            .await
            .map_err(LedgerError::from_debit)?;

        let request = InferenceRequest::new(requester, node, model_id.to_string(), fee);
        let id = request.id;
        self.store
            .commit(&seq, |state| state.requests.insert(id, request))
            .await;
        Ok(id)
    }

    pub async fn get_request(&self, id: Uuid) -> LedgerResult<InferenceRequest> {
        self.store
            .read(|state| state.requests.get(&id).cloned())
            .await
            .ok_or(LedgerError::RequestNotFound(id))
    }

    /// Newest first.
    pub async fn list_requests(&self, filter: &RequestFilter) -> Vec<InferenceRequest> {
        let mut requests: Vec<InferenceRequest> = self
            .store
            .read(|state| {
                state
                    .requests
                    .values()
                    .filter(|request| filter.matches(request))
                    .cloned()
                    .collect()
            })
            .await;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyStore;
    use crate::registry::NodeRegistry;
    use async_trait::async_trait;
    use shared::balance::{BalanceError, Credit, InMemoryBalances};
    use shared::models::node::NodeRegistration;
    use shared::models::policy::ReregistrationPolicy;
    use shared::models::PolicyConfig;

    struct OfflineBalances;

    #[async_trait]
    impl BalanceHolder for OfflineBalances {
        async fn debit(&self, _: Address, _: U256) -> Result<(), BalanceError> {
            Err(BalanceError::Unavailable("connection refused".to_string()))
        }
        async fn credit(&self, _: Address, _: U256) -> Result<(), BalanceError> {
            Err(BalanceError::Unavailable("connection refused".to_string()))
        }
        async fn payout(&self, _: &[Credit]) -> Result<(), BalanceError> {
            Err(BalanceError::Unavailable("connection refused".to_string()))
        }
        async fn balance_of(&self, _: Address) -> Result<U256, BalanceError> {
            Err(BalanceError::Unavailable("connection refused".to_string()))
        }
    }

    const OPERATOR: u8 = 0x01;
    const USER: u8 = 0x02;

    async fn setup(balances: Arc<dyn BalanceHolder>) -> (NodeRegistry, RequestLedger) {
        let store = Arc::new(LedgerStore::new(PolicyConfig::default()));
        let policy = Arc::new(PolicyStore::new(store.clone(), Address::repeat_byte(0xAD)));
        let registry = NodeRegistry::new(store.clone(), policy, ReregistrationPolicy::Reject);
        registry
            .register_node(
                Address::repeat_byte(OPERATOR),
                NodeRegistration {
                    metadata: "https://metadata.example.com/node1".to_string(),
                    name: None,
                    location: None,
                    supported_models: ["sentiment-analysis", "text-classification"]
                        .iter()
                        .map(|m| m.to_string())
                        .collect(),
                    stake: U256::from(1000u64),
                },
            )
            .await
            .unwrap();
        (registry, RequestLedger::new(store, balances))
    }

    async fn funded(amount: u64) -> Arc<InMemoryBalances> {
        let balances = Arc::new(InMemoryBalances::new());
        balances
            .deposit(Address::repeat_byte(USER), U256::from(amount))
            .await
            .unwrap();
        balances
    }

    #[tokio::test]
    async fn test_create_request_escrows_fee() {
        let balances = funded(1000).await;
        let (_, ledger) = setup(balances.clone()).await;
        let user = Address::repeat_byte(USER);
        let operator = Address::repeat_byte(OPERATOR);

        let id = ledger
            .create_request(user, operator, "sentiment-analysis", U256::from(10u64))
            .await
            .unwrap();

        let request = ledger.get_request(id).await.unwrap();
        assert_eq!(request.requester, user);
        assert_eq!(request.node, operator);
        assert_eq!(request.model_id, "sentiment-analysis");
        assert_eq!(request.fee, U256::from(10u64));
        assert!(!request.completed);
        assert!(request.result.is_none());
        assert_eq!(balances.balance_of(user).await.unwrap(), U256::from(990u64));
    }

    #[tokio::test]
    async fn test_unsupported_model_rejected_regardless_of_fee() {
        let balances = funded(1000).await;
        let (_, ledger) = setup(balances.clone()).await;
        let user = Address::repeat_byte(USER);
        let operator = Address::repeat_byte(OPERATOR);

        for fee in [0u64, 10, 1000, 1_000_000] {
            let err = ledger
                .create_request(user, operator, "unsupported-model", U256::from(fee))
                .await
                .unwrap_err();
            assert_eq!(
                err,
                LedgerError::ModelNotSupported {
                    node: operator,
                    model_id: "unsupported-model".to_string()
                }
            );
        }
        assert_eq!(balances.balance_of(user).await.unwrap(), U256::from(1000u64));
        assert!(ledger.list_requests(&RequestFilter::default()).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_or_inactive_node() {
        let balances = funded(1000).await;
        let (registry, ledger) = setup(balances.clone()).await;
        let user = Address::repeat_byte(USER);
        let operator = Address::repeat_byte(OPERATOR);
        let stranger = Address::repeat_byte(0x09);

        assert_eq!(
            ledger
                .create_request(user, stranger, "sentiment-analysis", U256::from(10u64))
                .await
                .unwrap_err(),
            LedgerError::NodeNotFound(stranger)
        );

        registry
            .set_node_active(Address::repeat_byte(0xAD), operator, false)
            .await
            .unwrap();
        assert_eq!(
            ledger
                .create_request(user, operator, "sentiment-analysis", U256::from(10u64))
                .await
                .unwrap_err(),
            LedgerError::NodeNotFound(operator)
        );
        assert_eq!(balances.balance_of(user).await.unwrap(), U256::from(1000u64));
    }

    #[tokio::test]
    async fn test_insufficient_funds_leaves_no_request() {
        let balances = funded(5).await;
        let (_, ledger) = setup(balances.clone()).await;
        let user = Address::repeat_byte(USER);

        let err = ledger
            .create_request(
                user,
                Address::repeat_byte(OPERATOR),
                "sentiment-analysis",
                U256::from(10u64),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds(_)));
        assert!(err.is_retryable());
        assert!(ledger.list_requests(&RequestFilter::default()).await.is_empty());
        assert_eq!(balances.balance_of(user).await.unwrap(), U256::from(5u64));
    }

    #[tokio::test]
    async fn test_unavailable_balance_holder_is_internal() {
        let (_, ledger) = setup(Arc::new(OfflineBalances)).await;
        let err = ledger
            .create_request(
                Address::repeat_byte(USER),
                Address::repeat_byte(OPERATOR),
                "sentiment-analysis",
                U256::from(10u64),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Internal(_)));
        assert!(ledger.list_requests(&RequestFilter::default()).await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_model_is_validation_error() {
        let (_, ledger) = setup(funded(10).await).await;
        let err = ledger
            .create_request(
                Address::repeat_byte(USER),
                Address::repeat_byte(OPERATOR),
                " ",
                U256::from(1u64),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_unknown_request() {
        let (_, ledger) = setup(funded(0).await).await;
        let id = Uuid::new_v4();
        assert_eq!(
            ledger.get_request(id).await.unwrap_err(),
            LedgerError::RequestNotFound(id)
        );
    }

    #[tokio::test]
    async fn test_list_requests_filters_by_requester() {
        let balances = funded(100).await;
        let other = Address::repeat_byte(0x03);
        balances.deposit(other, U256::from(100u64)).await.unwrap();
        let (_, ledger) = setup(balances).await;
        let operator = Address::repeat_byte(OPERATOR);
        let user = Address::repeat_byte(USER);

        let mine = ledger
            .create_request(user, operator, "sentiment-analysis", U256::from(1u64))
            .await
            .unwrap();
        ledger
            .create_request(other, operator, "text-classification", U256::from(1u64))
            .await
            .unwrap();

        let history = ledger
            .list_requests(&RequestFilter {
                requester: Some(user),
                ..Default::default()
            })
            .await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, mine);

        let for_node = ledger
            .list_requests(&RequestFilter {
                node: Some(operator),
                completed: Some(false),
                ..Default::default()
            })
            .await;
        assert_eq!(for_node.len(), 2);
    }
}
