use crate::policy::PolicyStore;
use crate::registry::NodeRegistry;
use crate::requests::RequestLedger;
use crate::settlement::SettlementEngine;
use crate::store::LedgerStore;
use alloy::primitives::Address;
use shared::balance::BalanceHolder;
use shared::models::policy::ReregistrationPolicy;
use shared::models::PolicyConfig;
use std::sync::Arc;

/// The four ledger components wired to one shared store.
pub struct LedgerContext {
    pub policy: Arc<PolicyStore>,
    pub registry: Arc<NodeRegistry>,
    pub requests: Arc<RequestLedger>,
    pub settlement: Arc<SettlementEngine>,
    pub balances: Arc<dyn BalanceHolder>,
}

impl LedgerContext {
    pub fn new(
        policy: PolicyConfig,
        admin: Address,
        treasury: Address,
        reregistration: ReregistrationPolicy,
        balances: Arc<dyn BalanceHolder>,
    ) -> Self {
        let store = Arc::new(LedgerStore::new(policy));
        let policy = Arc::new(PolicyStore::new(store.clone(), admin));
        Self {
            registry: Arc::new(NodeRegistry::new(
                store.clone(),
                policy.clone(),
                reregistration,
            )),
            requests: Arc::new(RequestLedger::new(store.clone(), balances.clone())),
            settlement: Arc::new(SettlementEngine::new(store, balances.clone(), treasury)),
            policy,
            balances,
        }
    }
}
