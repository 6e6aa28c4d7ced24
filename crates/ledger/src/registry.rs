use crate::error::{LedgerError, LedgerResult};
use crate::policy::PolicyStore;
use crate::store::{LedgerState, LedgerStore};
use alloy::primitives::{Address, U256};
use chrono::Utc;
use shared::models::node::NodeRegistration;
use shared::models::policy::ReregistrationPolicy;
use shared::models::Node;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    pub model: Option<String>,
    /// Case-insensitive substring of the node's declared location.
    pub location: Option<String>,
    pub include_inactive: bool,
}

/// The one place that decides whether `node` may serve `model_id`.
pub(crate) fn eligible_node<'a>(
    state: &'a LedgerState,
    node: Address,
    model_id: &str,
) -> LedgerResult<&'a Node> {
    let entry = state
        .nodes
        .get(&node)
        .filter(|entry| entry.active)
        .ok_or(LedgerError::NodeNotFound(node))?;
    if !entry.supports(model_id) {
        return Err(LedgerError::ModelNotSupported {
            node,
            model_id: model_id.to_string(),
        });
    }
    Ok(entry)
}

pub struct NodeRegistry {
    store: Arc<LedgerStore>,
    policy: Arc<PolicyStore>,
    reregistration: ReregistrationPolicy,
}

impl NodeRegistry {
    pub fn new(
        store: Arc<LedgerStore>,
        policy: Arc<PolicyStore>,
        reregistration: ReregistrationPolicy,
    ) -> Self {
        Self {
            store,
            policy,
            reregistration,
        }
    }

    pub async fn register_node(
        &self,
        identity: Address,
        registration: NodeRegistration,
    ) -> LedgerResult<Address> {
        let NodeRegistration {
            metadata,
            name,
            location,
            supported_models,
            stake,
        } = registration;

        if supported_models.is_empty() {
            return Err(LedgerError::Validation(
                "supported_models must not be empty".to_string(),
            ));
        }
        if supported_models.iter().any(|model| model.trim().is_empty()) {
            return Err(LedgerError::Validation(
                "model ids must not be blank".to_string(),
            ));
        }

        let seq = self.store.sequence().await;
        let (minimum, existing) = self
            .store
            .read(|state| {
                (
                    state.policy.min_node_stake,
                    state.nodes.get(&identity).map(|node| node.active),
                )
            })
            .await;

        if stake < minimum {
            return Err(LedgerError::InsufficientStake { stake, minimum });
        }
        match (existing, self.reregistration) {
            (None, _) | (Some(false), ReregistrationPolicy::ReplaceInactive) => {}
            (Some(true), _) | (Some(false), ReregistrationPolicy::Reject) => {
                return Err(LedgerError::AlreadyRegistered(identity));
            }
        }

        let node = Node {
            address: identity,
            metadata,
            name,
            location,
            stake,
            supported_models,
            active: true,
            registered_at: Utc::now(),
        };
        self.store
            .commit(&seq, |state| state.nodes.insert(identity, node))
            .await;
        Ok(identity)
    }

    pub async fn get_node(&self, identity: Address) -> LedgerResult<Node> {
        self.store
            .read(|state| state.nodes.get(&identity).cloned())
            .await
            .ok_or(LedgerError::NodeNotFound(identity))
    }

    pub async fn list_nodes(&self, filter: &NodeFilter) -> Vec<Node> {
        let mut nodes: Vec<Node> = self
            .store
            .read(|state| {
                state
                    .nodes
                    .values()
                    .filter(|node| filter.include_inactive || node.active)
                    .filter(|node| {
                        filter
                            .model
                            .as_deref()
                            .map_or(true, |model| node.supports(model))
                    })
                    .filter(|node| {
                        filter
                            .location
                            .as_deref()
                            .map_or(true, |location| node.located_in(location))
                    })
                    .cloned()
                    .collect()
            })
            .await;
        nodes.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then(a.address.cmp(&b.address))
        });
        nodes
    }

    /// Eligibility check shared by request creation and inference dispatch.
    pub async fn ensure_serves(&self, node: Address, model_id: &str) -> LedgerResult<Node> {
        self.store
            .read(|state| eligible_node(state, node, model_id).cloned())
            .await
    }

    pub async fn set_node_active(
        &self,
        caller: Address,
        identity: Address,
        active: bool,
    ) -> LedgerResult<Node> {
        self.policy.ensure_admin(caller)?;
        self.update_node(identity, |node| node.active = active)
            .await
    }

    /// Stake is only checked against the minimum at registration; adjusting it
    /// here does not re-validate.
    pub async fn set_node_stake(
        &self,
        caller: Address,
        identity: Address,
        stake: U256,
    ) -> LedgerResult<Node> {
        self.policy.ensure_admin(caller)?;
        self.update_node(identity, |node| node.stake = stake).await
    }

    async fn update_node(&self, identity: Address, f: impl FnOnce(&mut Node)) -> LedgerResult<Node> {
        let seq = self.store.sequence().await;
        let exists = self
            .store
            .read(|state| state.nodes.contains_key(&identity))
            .await;
        if !exists {
            return Err(LedgerError::NodeNotFound(identity));
        }
        let updated = self
            .store
            .commit(&seq, |state| {
                state.nodes.get_mut(&identity).map(|node| {
                    f(node);
                    node.clone()
                })
            })
            .await;
        updated.ok_or(LedgerError::NodeNotFound(identity))
    }
}
