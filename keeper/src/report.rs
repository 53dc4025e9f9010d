//! End-of-run JSON report

use crate::priority_queue::PositionHealth;
use crate::scenario::Tally;
use bookkeeper::Ledger;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PoolReport {
    pub id: String,
    pub total_debt_share: String,
    pub debt_accumulated_rate: String,
    pub price_with_safety_margin: String,
    pub debt_ceiling: String,
    pub debt_floor: String,
}

#[derive(Debug, Serialize)]
pub struct PositionReport {
    pub pool: String,
    pub owner: String,
    pub locked_collateral: String,
    pub debt_share: String,
    pub health: String,
    pub safe: bool,
}

/// Raw fixed-point integers rendered as decimal strings
#[derive(Debug, Serialize)]
pub struct Report {
    pub live: bool,
    pub total_stablecoin_issued: String,
    pub total_unbacked_stablecoin: String,
    pub total_debt_ceiling: String,
    pub pools: Vec<PoolReport>,
    pub positions: Vec<PositionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replay: Option<Tally>,
    pub liquidations: usize,
}

impl Report {
    pub fn build(ledger: &Ledger, healths: &[PositionHealth], replay: Option<Tally>, liquidations: usize) -> Self {
        let pools = ledger
            .state()
            .pools
            .iter()
            .map(|(id, pool)| PoolReport {
                id: id.to_string(),
                total_debt_share: pool.total_debt_share.to_string(),
                debt_accumulated_rate: pool.debt_accumulated_rate.to_string(),
                price_with_safety_margin: pool.price_with_safety_margin.to_string(),
                debt_ceiling: pool.debt_ceiling.to_string(),
                debt_floor: pool.debt_floor.to_string(),
            })
            .collect();

        let positions = ledger
            .positions()
            .map(|(&(pool, owner), position)| {
                let health = healths.iter().find(|h| h.pool == pool && h.owner == owner);
                PositionReport {
                    pool: pool.to_string(),
                    owner: owner.to_string(),
                    locked_collateral: position.locked_collateral.to_string(),
                    debt_share: position.debt_share.to_string(),
                    health: health.map_or_else(|| "unknown".to_string(), |h| h.health.to_string()),
                    safe: health.map_or(false, |h| !h.health.is_negative()),
                }
            })
            .collect();

        Self {
            live: ledger.is_live(),
            total_stablecoin_issued: ledger.total_stablecoin_issued().to_string(),
            total_unbacked_stablecoin: ledger.total_unbacked_stablecoin().to_string(),
            total_debt_ceiling: ledger.total_debt_ceiling().to_string(),
            pools,
            positions,
            replay,
            liquidations,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
