//! Ledger storage: pool registry, positions, balances and global counters

use crate::error::Result;
use crate::math::*;
use crate::types::{Address, PoolId, Role};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-collateral-type parameters and aggregate debt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralPool {
    pub total_debt_share: U256,         // wad
    pub debt_accumulated_rate: U256,    // ray, zero until initialized
    pub price_with_safety_margin: U256, // ray
    pub debt_ceiling: U256,             // rad
    pub debt_floor: U256,               // rad
}

impl CollateralPool {
    pub fn is_initialized(&self) -> bool {
        !self.debt_accumulated_rate.is_zero()
    }

    /// Total debt value of the pool (rad)
    pub fn total_debt_value(&self) -> Result<U256> {
        mul(self.total_debt_share, self.debt_accumulated_rate)
    }

    /// Debt value of a position under the current rate (rad)
    pub fn debt_value(&self, position: &Position) -> Result<U256> {
        mul(position.debt_share, self.debt_accumulated_rate)
    }

    /// Collateral value of a position at the safety-margin price (rad)
    pub fn collateral_value(&self, position: &Position) -> Result<U256> {
        mul(position.locked_collateral, self.price_with_safety_margin)
    }
}

/// Locked collateral and debt share of one owner in one pool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub locked_collateral: U256, // wad
    pub debt_share: U256,        // wad
}

impl Position {
    pub fn is_empty(&self) -> bool {
        self.locked_collateral.is_zero() && self.debt_share.is_zero()
    }
}

/// Everything the ledger persists
///
/// Zero balances and empty positions are never stored, so two states holding
/// the same values compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub pools: BTreeMap<PoolId, CollateralPool>,
    pub positions: BTreeMap<(PoolId, Address), Position>,
    /// Free collateral per (pool, account), wad
    pub collateral: BTreeMap<(PoolId, Address), U256>,
    /// Free stablecoin per account, rad
    pub stablecoin: BTreeMap<Address, U256>,
    /// Unresolved bad debt per account, rad
    pub system_bad_debt: BTreeMap<Address, U256>,
    pub total_stablecoin_issued: U256,   // rad
    pub total_unbacked_stablecoin: U256, // rad
    pub total_debt_ceiling: U256,        // rad
    pub live: bool,
    /// (principal, delegate) pairs
    pub consents: BTreeSet<(Address, Address)>,
    pub roles: BTreeMap<Role, BTreeSet<Address>>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            pools: BTreeMap::new(),
            positions: BTreeMap::new(),
            collateral: BTreeMap::new(),
            stablecoin: BTreeMap::new(),
            system_bad_debt: BTreeMap::new(),
            total_stablecoin_issued: U256::zero(),
            total_unbacked_stablecoin: U256::zero(),
            total_debt_ceiling: U256::zero(),
            live: true,
            consents: BTreeSet::new(),
            roles: BTreeMap::new(),
        }
    }
}

impl LedgerState {
    /// Fresh live state with `owner` holding the owner role
    pub fn new(owner: Address) -> Self {
        let mut state = Self::default();
        state.insert_role(Role::Owner, owner);
        state
    }

    pub fn pool(&self, pool: &PoolId) -> CollateralPool {
        self.pools.get(pool).copied().unwrap_or_default()
    }

    pub fn position(&self, pool: &PoolId, owner: &Address) -> Position {
        self.positions.get(&(*pool, *owner)).copied().unwrap_or_default()
    }

    pub fn collateral_balance(&self, pool: &PoolId, account: &Address) -> U256 {
        self.collateral.get(&(*pool, *account)).copied().unwrap_or_default()
    }

    pub fn stablecoin_balance(&self, account: &Address) -> U256 {
        self.stablecoin.get(account).copied().unwrap_or_default()
    }

    pub fn bad_debt(&self, account: &Address) -> U256 {
        self.system_bad_debt.get(account).copied().unwrap_or_default()
    }

    pub(crate) fn put_position(&mut self, pool: PoolId, owner: Address, position: Position) {
        if position.is_empty() {
            self.positions.remove(&(pool, owner));
        } else {
            self.positions.insert((pool, owner), position);
        }
    }

    pub(crate) fn put_collateral(&mut self, pool: PoolId, account: Address, amount: U256) {
        put_amount(&mut self.collateral, (pool, account), amount);
    }

    pub(crate) fn put_stablecoin(&mut self, account: Address, value: U256) {
        put_amount(&mut self.stablecoin, account, value);
    }

    pub(crate) fn put_bad_debt(&mut self, account: Address, value: U256) {
        put_amount(&mut self.system_bad_debt, account, value);
    }
}

fn put_amount<K: Ord>(map: &mut BTreeMap<K, U256>, key: K, amount: U256) {
    if amount.is_zero() {
        map.remove(&key);
    } else {
        map.insert(key, amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_live_and_empty() {
        let state = LedgerState::default();
        assert!(state.live);
        assert!(state.pools.is_empty());
        assert_eq!(state.total_stablecoin_issued, U256::zero());
    }

    #[test]
    fn test_pool_values() {
        let pool = CollateralPool {
            total_debt_share: wad(1000),
            debt_accumulated_rate: RAY,
            price_with_safety_margin: ray(2),
            ..Default::default()
        };
        assert!(pool.is_initialized());
        assert_eq!(pool.total_debt_value().unwrap(), rad(1000));

        let position = Position { locked_collateral: wad(100), debt_share: wad(150) };
        assert_eq!(pool.debt_value(&position).unwrap(), rad(150));
        assert_eq!(pool.collateral_value(&position).unwrap(), rad(200));
        assert!(!CollateralPool::default().is_initialized());
    }

    #[test]
    fn test_zero_entries_are_pruned() {
        let pool = PoolId::from_label("ETH-A").unwrap();
        let owner = Address::new([1; 32]);
        let mut state = LedgerState::default();

        state.put_collateral(pool, owner, wad(5));
        assert_eq!(state.collateral_balance(&pool, &owner), wad(5));
        state.put_collateral(pool, owner, U256::zero());
        assert!(state.collateral.is_empty());

        state.put_position(pool, owner, Position { locked_collateral: wad(1), debt_share: U256::zero() });
        assert_eq!(state.positions.len(), 1);
        state.put_position(pool, owner, Position::default());
        assert!(state.positions.is_empty());
        assert_eq!(state, LedgerState::default());
    }
}
