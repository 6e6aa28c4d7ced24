pub(crate) mod context;

pub use context::LedgerContext;

use alloy::primitives::Address;
use shared::models::{InferenceRequest, Node, PolicyConfig};
use std::collections::HashMap;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

/// Node table, request table and the policy singleton.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub nodes: HashMap<Address, Node>,
    pub requests: HashMap<Uuid, InferenceRequest>,
    pub policy: PolicyConfig,
}

/// Proof that the holder is the only mutating operation in flight.
pub struct Sequenced<'a> {
    _guard: MutexGuard<'a, ()>,
}

/// Single lock domain for every mutating ledger operation.
///
/// A mutation first takes the sequencer, validates against the current state,
/// performs its one external call, and only then commits. Readers touch the
/// state lock alone, so they never wait on an external call.
pub struct LedgerStore {
    sequencer: Mutex<()>,
    state: RwLock<LedgerState>,
}

impl LedgerStore {
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            sequencer: Mutex::new(()),
            state: RwLock::new(LedgerState {
                policy,
                ..Default::default()
            }),
        }
    }

    pub async fn sequence(&self) -> Sequenced<'_> {
        Sequenced {
            _guard: self.sequencer.lock().await,
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    /// Apply a mutation. Callers must hold the sequencer, and `f` must not fail
    /// halfway: validation belongs before the external call, not in here.
    pub async fn commit<R>(&self, _seq: &Sequenced<'_>, f: impl FnOnce(&mut LedgerState) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state)
    }
}
