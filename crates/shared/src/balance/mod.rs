use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    #[error("insufficient funds: {account} holds {available}, needs {requested}")]
    InsufficientFunds {
        account: Address,
        available: U256,
        requested: U256,
    },
    #[error("balance overflow crediting {account}")]
    Overflow { account: Address },
    #[error("balance holder unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credit {
    pub account: Address,
    pub amount: U256,
}

impl Credit {
    pub fn new(account: Address, amount: U256) -> Self {
        Self { account, amount }
    }
}

/// Custodian of account balances. The ledger calls it at most once per
/// mutating operation and commits its own state only after the call returned.
#[async_trait]
pub trait BalanceHolder: Send + Sync {
    /// Remove `amount` from `account`, failing without effect if it cannot be covered.
    async fn debit(&self, account: Address, amount: U256) -> Result<(), BalanceError>;

    async fn credit(&self, account: Address, amount: U256) -> Result<(), BalanceError>;

    /// Apply every credit or none of them.
    async fn payout(&self, credits: &[Credit]) -> Result<(), BalanceError>;

    async fn balance_of(&self, account: Address) -> Result<U256, BalanceError>;
}

/// Process-local balance holder used for development and tests.
#[derive(Default, Clone)]
pub struct InMemoryBalances {
    balances: Arc<Mutex<HashMap<Address, U256>>>,
}

impl InMemoryBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balances(balances: HashMap<Address, U256>) -> Self {
        Self {
            balances: Arc::new(Mutex::new(balances)),
        }
    }

    pub async fn deposit(&self, account: Address, amount: U256) -> Result<(), BalanceError> {
        self.credit(account, amount).await
    }
}

#[async_trait]
impl BalanceHolder for InMemoryBalances {
    async fn debit(&self, account: Address, amount: U256) -> Result<(), BalanceError> {
        let mut balances = self.balances.lock().await;
        let available = balances.get(&account).copied().unwrap_or_default();
        let remaining =
            available
                .checked_sub(amount)
                .ok_or(BalanceError::InsufficientFunds {
                    account,
                    available,
                    requested: amount,
                })?;
        balances.insert(account, remaining);
        Ok(())
    }

    async fn credit(&self, account: Address, amount: U256) -> Result<(), BalanceError> {
        self.payout(&[Credit::new(account, amount)]).await
    }

    async fn payout(&self, credits: &[Credit]) -> Result<(), BalanceError> {
        let mut balances = self.balances.lock().await;

        // Stage on a copy of the touched entries so an overflow leaves nothing applied.
        let mut staged: HashMap<Address, U256> = HashMap::new();
        for credit in credits {
            let current = match staged.get(&credit.account) {
                Some(value) => *value,
                None => balances.get(&credit.account).copied().unwrap_or_default(),
            };
            let next = current
                .checked_add(credit.amount)
                .ok_or(BalanceError::Overflow {
                    account: credit.account,
                })?;
            staged.insert(credit.account, next);
        }

        balances.extend(staged);
        Ok(())
    }

    async fn balance_of(&self, account: Address) -> Result<U256, BalanceError> {
        let balances = self.balances.lock().await;
        Ok(balances.get(&account).copied().unwrap_or_default())
    }
}
