use crate::error::{LedgerError, LedgerResult};
use crate::store::LedgerStore;
use alloy::primitives::Address;
use chrono::Utc;
use shared::balance::{BalanceHolder, Credit};
use shared::models::policy::FeeSplit;
use std::sync::Arc;
use uuid::Uuid;

/// Releases escrow when the assigned node delivers a result.
pub struct SettlementEngine {
    store: Arc<LedgerStore>,
    balances: Arc<dyn BalanceHolder>,
    treasury: Address,
}

impl SettlementEngine {
    pub fn new(store: Arc<LedgerStore>, balances: Arc<dyn BalanceHolder>, treasury: Address) -> Self {
        Self {
            store,
            balances,
            treasury,
        }
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    /// Pays out the escrowed fee at the fee rate in force right now, stores the
    /// result and marks the request completed. Nothing is committed unless the
    /// payout went through.
    pub async fn submit_result(
        &self,
        caller: Address,
        request_id: Uuid,
        result: String,
    ) -> LedgerResult<FeeSplit> {
        let seq = self.store.sequence().await;
        let (request, rate) = self
            .store
            .read(|state| {
                state
                    .requests
                    .get(&request_id)
                    .cloned()
                    .map(|request| (request, state.policy.platform_fee_rate_bps))
            })
            .await
            .ok_or(LedgerError::RequestNotFound(request_id))?;

        if request.completed {
            return Err(LedgerError::AlreadyCompleted(request_id));
        }
        if caller != request.node {
            return Err(LedgerError::NotAssignedNode { caller, request_id });
        }

        let split = FeeSplit::compute(request.fee, rate);
        self.balances
            .payout(&[
                Credit::new(request.node, split.node_payment),
                Credit::new(self.treasury, split.platform_fee),
            ])
            .await
            .map_err(LedgerError::from_payout)?;

        self.store
            .commit(&seq, |state| {
                if let Some(entry) = state.requests.get_mut(&request_id) {
                    entry.completed = true;
                    entry.result = Some(result);
                    entry.settlement = Some(split);
                    entry.completed_at = Some(Utc::now());
                }
            })
            .await;
        Ok(split)
    }
}
