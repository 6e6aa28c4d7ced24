use crate::error::{LedgerError, LedgerResult};
use crate::store::LedgerStore;
use alloy::primitives::{Address, U256};
use shared::models::policy::MAX_PLATFORM_FEE_RATE_BPS;
use shared::models::PolicyConfig;
use std::sync::Arc;

/// Minimum stake and platform fee rate, updatable by the admin only.
pub struct PolicyStore {
    store: Arc<LedgerStore>,
    admin: Address,
}

impl PolicyStore {
    pub fn new(store: Arc<LedgerStore>, admin: Address) -> Self {
        Self { store, admin }
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub async fn current(&self) -> PolicyConfig {
        self.store.read(|state| state.policy).await
    }

    pub(crate) fn ensure_admin(&self, caller: Address) -> LedgerResult<()> {
        if caller != self.admin {
            return Err(LedgerError::Unauthorized(caller));
        }
        Ok(())
    }

    pub async fn set_min_node_stake(&self, caller: Address, value: U256) -> LedgerResult<()> {
        self.ensure_admin(caller)?;
        let seq = self.store.sequence().await;
        self.store
            .commit(&seq, |state| state.policy.min_node_stake = value)
            .await;
        Ok(())
    }

    /// Takes effect for every settlement after this call, including requests
    /// that were created under the previous rate.
    pub async fn set_platform_fee_rate(&self, caller: Address, rate_bps: u16) -> LedgerResult<()> {
        self.ensure_admin(caller)?;
        if rate_bps > MAX_PLATFORM_FEE_RATE_BPS {
            return Err(LedgerError::FeeRateTooHigh {
                rate: rate_bps,
                max: MAX_PLATFORM_FEE_RATE_BPS,
            });
        }
        let seq = self.store.sequence().await;
        self.store
            .commit(&seq, |state| state.policy.platform_fee_rate_bps = rate_bps)
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Address {
        Address::repeat_byte(0xAD)
    }

    fn policy_store() -> PolicyStore {
        PolicyStore::new(Arc::new(LedgerStore::new(PolicyConfig::default())), admin())
    }

    #[tokio::test]
    async fn test_fee_rate_cap() {
        let policy = policy_store();

        let err = policy.set_platform_fee_rate(admin(), 3500).await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::FeeRateTooHigh {
                rate: 3500,
                max: 3000
            }
        );
        assert_eq!(policy.current().await.platform_fee_rate_bps, 1000);

        policy.set_platform_fee_rate(admin(), 3000).await.unwrap();
        assert_eq!(policy.current().await.platform_fee_rate_bps, 3000);

        policy.set_platform_fee_rate(admin(), 0).await.unwrap();
        assert_eq!(policy.current().await.platform_fee_rate_bps, 0);
    }

    #[tokio::test]
    async fn test_min_stake_update_is_visible_immediately() {
        let policy = policy_store();
        policy
            .set_min_node_stake(admin(), U256::from(2000u64))
            .await
            .unwrap();
        assert_eq!(policy.current().await.min_node_stake, U256::from(2000u64));

        policy.set_min_node_stake(admin(), U256::ZERO).await.unwrap();
        assert_eq!(policy.current().await.min_node_stake, U256::ZERO);
    }

    #[tokio::test]
    async fn test_non_admin_rejected() {
        let policy = policy_store();
        let intruder = Address::repeat_byte(0x01);

        assert_eq!(
            policy.set_platform_fee_rate(intruder, 10).await.unwrap_err(),
            LedgerError::Unauthorized(intruder)
        );
        assert_eq!(
            policy
                .set_min_node_stake(intruder, U256::from(1u64))
                .await
                .unwrap_err(),
            LedgerError::Unauthorized(intruder)
        );
        assert_eq!(policy.current().await, PolicyConfig::default());
    }
}
