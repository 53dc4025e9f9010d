//! Ledger error taxonomy

use crate::types::{Address, PoolId, Role};
use core::fmt;

/// What a rejected caller was missing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    /// A single role
    Role(Role),
    /// Either of two roles (owner/governance style gates)
    AnyOf(Role, Role),
    /// Consent of the named principal
    Consent(Address),
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Role(role) => write!(f, "role {}", role),
            Permission::AnyOf(a, b) => write!(f, "role {} or {}", a, b),
            Permission::Consent(principal) => write!(f, "consent of {}", principal),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("unauthorized: caller lacks {0}")]
    Unauthorized(Permission),

    #[error("ledger is not live")]
    NotLive,
    #[error("ledger is already caged")]
    AlreadyCaged,
    #[error("ledger is not caged")]
    NotCaged,

    #[error("collateral pool {0} is not initialized")]
    PoolNotInitialized(PoolId),
    #[error("collateral pool {0} is already initialized")]
    PoolAlreadyInitialized(PoolId),

    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error("arithmetic underflow")]
    ArithmeticUnderflow,

    #[error("debt ceiling exceeded")]
    CeilingExceeded,

    #[error("position is not safe")]
    NotSafe,
    #[error("source position is not safe")]
    UnsafeSource,
    #[error("destination position is not safe")]
    UnsafeDestination,

    #[error("position debt is below the pool debt floor")]
    DebtFloorViolation,
    #[error("source position debt is below the pool debt floor")]
    DebtFloorSource,
    #[error("destination position debt is below the pool debt floor")]
    DebtFloorDestination,

    #[error("confiscation did not reduce position debt")]
    DebtNotReduced,
}

pub type Result<T> = core::result::Result<T, LedgerError>;
