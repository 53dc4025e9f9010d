//! Generators for arbitrary ledger state (for Kani)

#[cfg(kani)]
use kani::any;
use arrayvec::ArrayVec;
use bookkeeper::*;

use crate::sanitizer::N_USERS;

pub const OWNER: Address = Address::new([1; 32]);
pub const ADAPTER: Address = Address::new([2; 32]);
pub const MANAGER: Address = Address::new([3; 32]);
pub const LIQUIDATOR: Address = Address::new([4; 32]);
pub const FEE_COLLECTOR: Address = Address::new([5; 32]);
pub const MINTER: Address = Address::new([6; 32]);
pub const DEBT_ENGINE: Address = Address::new([7; 32]);

// Small bounds keep the SAT problem tractable
#[cfg(kani)]
const MAX_UNITS: u8 = 100;

/// Position owners; each has whitelisted the manager
pub fn users() -> ArrayVec<Address, N_USERS> {
    let mut users = ArrayVec::new();
    for i in 0..N_USERS {
        users.push(Address::new([0xa0 + i as u8; 32]));
    }
    users
}

pub fn pool_id() -> PoolId {
    let mut bytes = [0u8; 32];
    bytes[..5].copy_from_slice(b"ETH-A");
    PoolId::new(bytes)
}

/// Roles and consents every generated state starts from
pub fn base_state() -> LedgerState {
    let mut state = LedgerState::new(OWNER);
    for (role, account) in [
        (Role::Adapter, ADAPTER),
        (Role::PositionManager, MANAGER),
        (Role::LiquidationEngine, LIQUIDATOR),
        (Role::StabilityFeeCollector, FEE_COLLECTOR),
        (Role::Mintable, MINTER),
    ] {
        state.roles.entry(role).or_default().insert(account);
    }
    for user in users() {
        state.consents.insert((user, MANAGER));
    }
    state.total_debt_ceiling = rad(1_000_000);
    state
}

#[cfg(kani)]
fn any_units() -> u64 {
    (any::<u8>() % MAX_UNITS) as u64
}

#[cfg(kani)]
pub fn any_position() -> Position {
    Position { locked_collateral: wad(any_units()), debt_share: wad(any_units()) }
}

#[cfg(kani)]
pub fn any_pool() -> CollateralPool {
    let rate_percent: u8 = any();
    let price_raw: u8 = any();
    CollateralPool {
        total_debt_share: U256::zero(),
        // 1.00 to 1.49
        debt_accumulated_rate: RAY + (RAY / 100) * U256::from(rate_percent % 50),
        price_with_safety_margin: ray(((price_raw % 4) + 1) as u64),
        debt_ceiling: rad(1_000_000),
        debt_floor: rad((any::<u8>() % 10) as u64),
    }
}

#[cfg(kani)]
pub fn any_signed_units() -> Signed {
    let raw: i8 = any();
    Signed::wad((raw % MAX_UNITS as i8) as i64)
}

/// One pool, up to N_USERS positions and balances, aggregates aligned
#[cfg(kani)]
pub fn any_state_bounded() -> LedgerState {
    let mut state = base_state();
    let pool = pool_id();
    state.pools.insert(pool, any_pool());
    for user in users() {
        state.positions.insert((pool, user), any_position());
        state.collateral.insert((pool, user), wad(any_units()));
        state.stablecoin.insert(user, rad(any_units()));
    }
    state.system_bad_debt.insert(DEBT_ENGINE, rad(any_units()));
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_id_matches_label() {
        assert_eq!(pool_id(), PoolId::from_label("ETH-A").unwrap());
    }

    #[test]
    fn test_base_state_roles() {
        let state = base_state();
        assert!(state.has_role(Role::Owner, &OWNER));
        assert!(state.has_role(Role::PositionManager, &MANAGER));
        assert!(users().iter().all(|u| state.wish(u, &MANAGER)));
        assert_eq!(users().len(), N_USERS);
    }
}
