//! Invariant checking helpers

use crate::error::{LedgerError, Result};
use crate::math::*;
use crate::state::*;
use crate::types::PoolId;
use primitive_types::U256;
use std::collections::BTreeMap;

/// Debt value covered by collateral at the safety-margin price
pub fn is_safe(pool: &CollateralPool, position: &Position) -> Result<bool> {
    Ok(pool.debt_value(position)? <= pool.collateral_value(position)?)
}

/// Zero debt, or debt value at least the pool floor
pub fn respects_debt_floor(pool: &CollateralPool, position: &Position) -> Result<bool> {
    Ok(position.debt_share.is_zero() || pool.debt_value(position)? >= pool.debt_floor)
}

/// Collateral value minus debt value (rad); negative means unsafe
pub fn position_health(pool: &CollateralPool, position: &Position) -> Result<Signed> {
    Signed::difference(pool.collateral_value(position)?, pool.debt_value(position)?)
}

/// Liquidation-path check: confiscation must have lowered the debt share
pub fn ensure_debt_reduced(before: &Position, after: &Position) -> Result<()> {
    if after.debt_share < before.debt_share {
        Ok(())
    } else {
        Err(LedgerError::DebtNotReduced)
    }
}

/// Sum of position debt shares per pool equals the pool aggregate
pub fn debt_shares_conserved(s: &LedgerState) -> bool {
    let mut sums: BTreeMap<PoolId, U256> = BTreeMap::new();
    for ((pool, _), position) in s.positions.iter() {
        let sum = sums.entry(*pool).or_default();
        match add(*sum, position.debt_share) {
            Ok(total) => *sum = total,
            Err(_) => return false,
        }
    }
    s.pools.iter().all(|(id, pool)| sums.remove(id).unwrap_or_default() == pool.total_debt_share)
        && sums.values().all(|sum| sum.is_zero())
}

/// Issued stablecoin equals the sum of free stablecoin balances
pub fn stablecoin_conserved(s: &LedgerState) -> bool {
    sum_values(s.stablecoin.values()) == Some(s.total_stablecoin_issued)
}

/// Unbacked stablecoin equals the sum of per-account bad debt
pub fn bad_debt_conserved(s: &LedgerState) -> bool {
    sum_values(s.system_bad_debt.values()) == Some(s.total_unbacked_stablecoin)
}

/// Every position with debt is safe under its pool's current rate and price
pub fn all_positions_safe(s: &LedgerState) -> bool {
    s.positions.iter().all(|((pool, _), position)| {
        position.debt_share.is_zero() || is_safe(&s.pool(pool), position).unwrap_or(false)
    })
}

/// Count positions that are currently unsafe
pub fn unsafe_count(s: &LedgerState) -> usize {
    s.positions
        .iter()
        .filter(|((pool, _), position)| !is_safe(&s.pool(pool), position).unwrap_or(false))
        .count()
}

fn sum_values<'a>(mut values: impl Iterator<Item = &'a U256>) -> Option<U256> {
    values.try_fold(U256::zero(), |acc, v| acc.checked_add(*v))
}
