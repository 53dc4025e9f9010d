//! State space sanitizer - bounds values for Kani exploration

use bookkeeper::*;

pub const N_USERS: usize = 3;
pub const MAX_STEPS: u8 = 4;

/// Bounds for tractable verification, in whole units of each scale
const MAX_COLLATERAL: u64 = 1_000;
const MAX_DEBT_SHARE: u64 = 1_000;
const MAX_BALANCE: u64 = 10_000;
const MAX_RATE: u64 = 3;
const MAX_PRICE: u64 = 10;

pub trait Sanitize {
    fn sanitize(self) -> Self;
}

fn clamp(value: U256, bound: U256) -> U256 {
    if value > bound {
        value % bound
    } else {
        value
    }
}

impl Sanitize for Position {
    fn sanitize(self) -> Position {
        Position {
            locked_collateral: clamp(self.locked_collateral, wad(MAX_COLLATERAL)),
            debt_share: clamp(self.debt_share, wad(MAX_DEBT_SHARE)),
        }
    }
}

impl Sanitize for CollateralPool {
    fn sanitize(self) -> CollateralPool {
        // Keep the pool initialized: a zero rate means "not created"
        let rate = clamp(self.debt_accumulated_rate, ray(MAX_RATE));
        CollateralPool {
            total_debt_share: self.total_debt_share,
            debt_accumulated_rate: if rate.is_zero() { RAY } else { rate },
            price_with_safety_margin: clamp(self.price_with_safety_margin, ray(MAX_PRICE)),
            debt_ceiling: self.debt_ceiling,
            debt_floor: clamp(self.debt_floor, rad(MAX_BALANCE)),
        }
    }
}

impl Sanitize for LedgerState {
    fn sanitize(mut self) -> LedgerState {
        // Clamp position count
        while self.positions.len() > N_USERS {
            self.positions.pop_last();
        }

        for position in self.positions.values_mut() {
            *position = position.sanitize();
        }
        for pool in self.pools.values_mut() {
            *pool = pool.sanitize();
        }
        for balance in self.collateral.values_mut() {
            *balance = clamp(*balance, wad(MAX_BALANCE));
        }
        for balance in self.stablecoin.values_mut().chain(self.system_bad_debt.values_mut()) {
            *balance = clamp(*balance, rad(MAX_BALANCE));
        }
        self.positions.retain(|_, p| !p.is_empty());
        self.collateral.retain(|_, v| !v.is_zero());
        self.stablecoin.retain(|_, v| !v.is_zero());
        self.system_bad_debt.retain(|_, v| !v.is_zero());

        align_aggregates(&mut self);
        self
    }
}

/// Recompute every aggregate from the per-account entries it summarizes
///
/// Sums are bounded by the sanitized values, so they cannot overflow.
pub fn align_aggregates(s: &mut LedgerState) {
    for (id, pool) in s.pools.iter_mut() {
        pool.total_debt_share = s
            .positions
            .iter()
            .filter(|((p, _), _)| p == id)
            .fold(U256::zero(), |acc, (_, position)| acc.saturating_add(position.debt_share));
    }
    s.total_stablecoin_issued = s.stablecoin.values().fold(U256::zero(), |acc, v| acc.saturating_add(*v));
    s.total_unbacked_stablecoin =
        s.system_bad_debt.values().fold(U256::zero(), |acc, v| acc.saturating_add(*v));
}
