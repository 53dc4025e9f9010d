//! Change notifications for off-ledger observers

use crate::math::Signed;
use crate::types::{Address, PoolId, Role};
use primitive_types::U256;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    RoleGranted { role: Role, account: Address, caller: Address },
    RoleRevoked { role: Role, account: Address, caller: Address },
    Whitelisted { principal: Address, delegate: Address },
    Blacklisted { principal: Address, delegate: Address },
    PoolInitialized { pool: PoolId, caller: Address },
    SetTotalDebtCeiling { caller: Address, value: U256 },
    SetDebtCeiling { caller: Address, pool: PoolId, value: U256 },
    SetDebtFloor { caller: Address, pool: PoolId, value: U256 },
    SetPriceWithSafetyMargin { caller: Address, pool: PoolId, value: U256 },
    Cage,
    Uncage,
    AdjustPosition {
        caller: Address,
        pool: PoolId,
        owner: Address,
        locked_collateral: U256,
        debt_share: U256,
        collateral_delta: Signed,
        debt_share_delta: Signed,
    },
    ConfiscatePosition {
        pool: PoolId,
        owner: Address,
        collateral_recipient: Address,
        debt_recipient: Address,
        collateral_delta: Signed,
        debt_value_delta: Signed,
    },
    AccrueStabilityFee { pool: PoolId, recipient: Address, rate_delta: Signed, value: Signed },
}

/// Receives events after the call that produced them has committed
pub trait EventSink: Send {
    fn emit(&mut self, event: &LedgerEvent);
}

/// Writes every event through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: &LedgerEvent) {
        log::info!(target: "bookkeeper::events", "{:?}", event);
    }
}

/// Keeps events in a shared buffer; clones observe the same buffer
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<LedgerEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<LedgerEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &LedgerEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
