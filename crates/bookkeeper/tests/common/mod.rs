//! Shared fixture: a live ledger with one configured pool and every role assigned

#![allow(dead_code)]

use bookkeeper::{ray, rad, Address, Ledger, PoolId, Role, Signed};

pub const OWNER: Address = Address::new([1; 32]);
pub const ADAPTER: Address = Address::new([2; 32]);
pub const MANAGER: Address = Address::new([3; 32]);
pub const ORACLE: Address = Address::new([4; 32]);
pub const LIQUIDATOR: Address = Address::new([5; 32]);
pub const FEE_COLLECTOR: Address = Address::new([6; 32]);
pub const MINTER: Address = Address::new([7; 32]);
pub const DEBT_ENGINE: Address = Address::new([8; 32]);

pub const ALICE: Address = Address::new([0xa1; 32]);
pub const BOB: Address = Address::new([0xb0; 32]);
pub const CAROL: Address = Address::new([0xc0; 32]);

pub fn eth() -> PoolId {
    PoolId::from_label("ETH-A").unwrap()
}

/// Pool `ETH-A` at rate 1.0 and safety-margin price 2.0, ceilings of 1M,
/// no debt floor. Alice, Bob and Carol have whitelisted the position manager.
pub fn setup() -> Ledger {
    let mut ledger = Ledger::new(OWNER);
    ledger.grant_role(OWNER, Role::Adapter, ADAPTER).unwrap();
    ledger.grant_role(OWNER, Role::PositionManager, MANAGER).unwrap();
    ledger.grant_role(OWNER, Role::PriceOracle, ORACLE).unwrap();
    ledger.grant_role(OWNER, Role::LiquidationEngine, LIQUIDATOR).unwrap();
    ledger.grant_role(OWNER, Role::StabilityFeeCollector, FEE_COLLECTOR).unwrap();
    ledger.grant_role(OWNER, Role::Mintable, MINTER).unwrap();

    ledger.init_pool(OWNER, eth()).unwrap();
    ledger.set_total_debt_ceiling(OWNER, rad(1_000_000)).unwrap();
    ledger.set_debt_ceiling(OWNER, eth(), rad(1_000_000)).unwrap();
    ledger.set_price_with_safety_margin(ORACLE, eth(), ray(2)).unwrap();

    for user in [ALICE, BOB, CAROL] {
        ledger.whitelist(user, MANAGER);
    }
    ledger
}

/// Adapter credit of whole wad units to `who`'s free collateral
pub fn deposit(ledger: &mut Ledger, who: Address, amount: i64) {
    ledger.add_collateral(ADAPTER, eth(), who, Signed::wad(amount)).unwrap();
}

/// Owner pays collateral and receives stablecoin
pub fn open(ledger: &mut Ledger, who: Address, collateral: i64, debt_share: i64) -> bookkeeper::Result<()> {
    ledger.adjust_position(
        MANAGER,
        eth(),
        who,
        who,
        who,
        Signed::wad(collateral),
        Signed::wad(debt_share),
    )
}
