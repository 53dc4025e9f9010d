//! Health calculation for positions

use crate::priority_queue::PositionHealth;
use bookkeeper::helpers::position_health;
use bookkeeper::{Address, CollateralPool, Ledger, PoolId, Position};

/// Calculate health: collateral value at the safety-margin price minus debt value
///
/// Returns health (rad) where:
/// - health < 0: unsafe, eligible for confiscation
/// - health >= 0: safe
pub fn calculate_health(
    pool_id: PoolId,
    owner: Address,
    pool: &CollateralPool,
    position: &Position,
) -> bookkeeper::Result<PositionHealth> {
    Ok(PositionHealth {
        pool: pool_id,
        owner,
        health: position_health(pool, position)?,
        collateral_value: pool.collateral_value(position)?,
        debt_value: pool.debt_value(position)?,
    })
}

/// Health of every open position
///
/// Positions whose values overflow are logged and skipped.
pub fn scan(ledger: &Ledger) -> Vec<PositionHealth> {
    ledger
        .positions()
        .filter_map(|(&(pool_id, owner), position)| {
            match calculate_health(pool_id, owner, &ledger.pool(&pool_id), position) {
                Ok(health) => Some(health),
                Err(e) => {
                    log::error!("Cannot value position {}/{}: {}", pool_id, owner, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookkeeper::{rad, ray, wad, Signed, RAY};

    fn pool(price: u64) -> CollateralPool {
        CollateralPool {
            total_debt_share: wad(100),
            debt_accumulated_rate: RAY,
            price_with_safety_margin: ray(price),
            debt_ceiling: rad(1_000),
            debt_floor: rad(0),
        }
    }

    fn eth() -> PoolId {
        PoolId::from_label("ETH-A").unwrap()
    }

    #[test]
    fn test_calculate_health_unsafe() {
        let position = Position { locked_collateral: wad(100), debt_share: wad(150) };
        let health = calculate_health(eth(), Address::default(), &pool(1), &position).unwrap();

        // 100 * 1 - 150 = -50
        assert_eq!(health.health, Signed::negative(rad(50)).unwrap());
        assert_eq!(health.collateral_value, rad(100));
        assert_eq!(health.debt_value, rad(150));
    }

    #[test]
    fn test_calculate_health_safe() {
        let position = Position { locked_collateral: wad(100), debt_share: wad(150) };
        let health = calculate_health(eth(), Address::default(), &pool(2), &position).unwrap();

        // 100 * 2 - 150 = 50
        assert_eq!(health.health, Signed::positive(rad(50)).unwrap());
    }

    #[test]
    fn test_health_reflects_accrued_rate() {
        let mut accrued = pool(2);
        accrued.debt_accumulated_rate = RAY + RAY / 2;
        let position = Position { locked_collateral: wad(100), debt_share: wad(150) };
        let health = calculate_health(eth(), Address::default(), &accrued, &position).unwrap();

        // 200 - 225 = -25
        assert_eq!(health.health, Signed::negative(rad(25)).unwrap());
    }

    #[test]
    fn test_scan_covers_every_position() {
        let owner = Address::new([1; 32]);
        let mut state = bookkeeper::LedgerState::new(owner);
        state.pools.insert(eth(), pool(1));
        state.positions.insert(
            (eth(), Address::new([2; 32])),
            Position { locked_collateral: wad(100), debt_share: wad(50) },
        );
        state.positions.insert(
            (eth(), Address::new([3; 32])),
            Position { locked_collateral: wad(10), debt_share: wad(50) },
        );

        let healths = scan(&Ledger::from_state(state));
        assert_eq!(healths.len(), 2);
        assert_eq!(healths.iter().filter(|h| h.health.is_negative()).count(), 1);
    }
}
