use alloy::primitives::{Address, U256};
use serde::Serialize;
use shared::balance::BalanceError;
use shared::inference::ExecutionError;
use std::fmt;
use uuid::Uuid;

/// Coarse classification callers use to translate errors and judge retry-ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Authorization,
    PolicyViolation,
    StateConflict,
    Funds,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("node not found: {0}")]
    NodeNotFound(Address),
    #[error("request not found: {0}")]
    RequestNotFound(Uuid),
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("caller {0} is not the platform admin")]
    Unauthorized(Address),
    #[error("caller {caller} is not the node assigned to request {request_id}")]
    NotAssignedNode { caller: Address, request_id: Uuid },

    #[error("stake {stake} is below the minimum of {minimum}")]
    InsufficientStake { stake: U256, minimum: U256 },
    #[error("fee rate {rate} bps exceeds the maximum of {max} bps")]
    FeeRateTooHigh { rate: u16, max: u16 },
    #[error("node {node} does not support model {model_id}")]
    ModelNotSupported { node: Address, model_id: String },

    #[error("identity {0} already holds a registered node")]
    AlreadyRegistered(Address),
    #[error("request {0} is already completed")]
    AlreadyCompleted(Uuid),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("balance holder rejected the payout: {0}")]
    PayoutRejected(String),

    #[error("internal fault: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::NodeNotFound(_)
            | LedgerError::RequestNotFound(_)
            | LedgerError::ModelNotFound(_) => ErrorKind::NotFound,
            LedgerError::Unauthorized(_) | LedgerError::NotAssignedNode { .. } => {
                ErrorKind::Authorization
            }
            LedgerError::InsufficientStake { .. }
            | LedgerError::FeeRateTooHigh { .. }
            | LedgerError::ModelNotSupported { .. } => ErrorKind::PolicyViolation,
            LedgerError::AlreadyRegistered(_) | LedgerError::AlreadyCompleted(_) => {
                ErrorKind::StateConflict
            }
            LedgerError::InsufficientFunds(_) | LedgerError::PayoutRejected(_) => ErrorKind::Funds,
            LedgerError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Funds and internal failures may succeed on a later attempt; everything
    /// else is deterministic given the same state.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Funds | ErrorKind::Internal)
    }

    /// Translate a failed escrow debit.
    pub(crate) fn from_debit(err: BalanceError) -> Self {
        match err {
            BalanceError::InsufficientFunds { .. } => LedgerError::InsufficientFunds(err.to_string()),
            BalanceError::Overflow { .. } | BalanceError::Unavailable(_) => {
                LedgerError::Internal(err.to_string())
            }
        }
    }

    /// Translate a failed settlement payout.
    pub(crate) fn from_payout(err: BalanceError) -> Self {
        match err {
            BalanceError::Unavailable(_) => LedgerError::Internal(err.to_string()),
            BalanceError::InsufficientFunds { .. } | BalanceError::Overflow { .. } => {
                LedgerError::PayoutRejected(err.to_string())
            }
        }
    }
}

impl From<ExecutionError> for LedgerError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::ModelNotFound(model_id) => LedgerError::ModelNotFound(model_id),
            ExecutionError::NodeNotFound(node) => LedgerError::NodeNotFound(node),
            ExecutionError::ModelNotSupportedByNode { node, model_id } => {
                LedgerError::ModelNotSupported { node, model_id }
            }
            ExecutionError::Unavailable(msg) => LedgerError::Internal(msg),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
