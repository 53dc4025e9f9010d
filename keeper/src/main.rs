//! BookKeeper Liquidation Keeper
//!
//! Off-chain service that restores or bootstraps a ledger, replays a
//! scenario against it, ranks positions by health and confiscates the
//! unsafe ones.

mod amount;
mod config;
mod health;
mod priority_queue;
mod report;
mod scenario;
mod snapshot;

use anyhow::{Context, Result};
use bookkeeper::helpers::ensure_debt_reduced;
use bookkeeper::{Ledger, LogSink, Signed};
use config::Config;
use priority_queue::{HealthQueue, PositionHealth};
use report::Report;
use scenario::Scenario;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("init") {
        let path = args.next().unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
        return Config::write_default(&path);
    }

    log::info!("Starting BookKeeper Liquidation Keeper");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default local config", e);
        Config::default_local()
    });
    log::info!("Keeper account: {}", config.keeper);
    log::info!("System debt engine: {}", config.system_debt_engine);

    let mut ledger = open_ledger(&config)?;
    ledger.set_sink(Some(Box::new(LogSink)));

    let replay = match &config.scenario_path {
        Some(path) => Some(Scenario::load(path)?.replay(&mut ledger)),
        None => None,
    };

    let mut queue = HealthQueue::new();
    refresh_health_queue(&mut queue, &ledger);
    if let Some(worst) = queue.peek() {
        log::info!("Worst health: {} ({}/{})", worst.health, worst.pool, worst.owner);
    }

    let liquidations = process_liquidations(&mut queue, &mut ledger, &config);

    if let Some(path) = &config.state_path {
        snapshot::save(path, ledger.state())?;
    }

    let report = Report::build(&ledger, &health::scan(&ledger), replay, liquidations);
    println!("{}", report.to_json()?);
    Ok(())
}

/// Restore the snapshot if one exists, else build the genesis ledger
fn open_ledger(config: &Config) -> Result<Ledger> {
    if let Some(path) = &config.state_path {
        if let Some(state) = snapshot::load(path)? {
            return Ok(Ledger::from_state(state));
        }
    }
    config.genesis.build().context("Failed to build genesis ledger")
}

/// Rebuild the queue from every open position
fn refresh_health_queue(queue: &mut HealthQueue, ledger: &Ledger) {
    for health in health::scan(ledger) {
        queue.push(health);
    }
    log::debug!("Health queue size: {}", queue.len());
}

/// Confiscate up to a batch of unsafe positions, worst first
///
/// Returns the number of positions confiscated.
fn process_liquidations(queue: &mut HealthQueue, ledger: &mut Ledger, config: &Config) -> usize {
    let liquidatable = queue.get_liquidatable(Signed::ZERO);

    if liquidatable.is_empty() {
        log::debug!("No positions need liquidation");
        return 0;
    }

    log::info!("Found {} positions needing liquidation", liquidatable.len());

    let batch_size = config.max_liquidations_per_batch.min(liquidatable.len());
    let mut liquidated = 0;

    for position_health in liquidatable.iter().take(batch_size) {
        log::info!(
            "Liquidating position {}/{} (health: {})",
            position_health.pool,
            position_health.owner,
            position_health.health
        );

        match execute_liquidation(ledger, config, position_health) {
            Ok(()) => {
                queue.remove(&position_health.key());
                liquidated += 1;
            }
            Err(e) => {
                log::error!(
                    "Failed to liquidate position {}/{}: {:#}",
                    position_health.pool,
                    position_health.owner,
                    e
                );
            }
        }
    }

    liquidated
}

/// Seize all collateral to the keeper and move all debt to the debt engine
fn execute_liquidation(ledger: &mut Ledger, config: &Config, target: &PositionHealth) -> Result<()> {
    let before = ledger.position(&target.pool, &target.owner);
    let collateral_delta = Signed::negative(before.locked_collateral)?;
    let debt_share_delta = Signed::negative(before.debt_share)?;

    ledger.confiscate_position(
        config.keeper,
        target.pool,
        target.owner,
        config.keeper,
        config.system_debt_engine,
        collateral_delta,
        debt_share_delta,
    )?;

    let after = ledger.position(&target.pool, &target.owner);
    ensure_debt_reduced(&before, &after)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookkeeper::{rad, ray, wad, Address, PoolId, Role};

    const ALICE: Address = Address::new([0xa1; 32]);
    const BOB: Address = Address::new([0xb0; 32]);

    fn eth() -> PoolId {
        PoolId::from_label("ETH-A").unwrap()
    }

    /// Default local ledger with two positions opened at price 1500
    fn setup() -> (Config, Ledger) {
        let mut config = Config::default_local();
        config.max_liquidations_per_batch = 1;
        let mut ledger = config.genesis.build().unwrap();
        let keeper = config.keeper;

        for (who, debt) in [(ALICE, 1_000), (BOB, 1_200)] {
            ledger.whitelist(who, keeper);
            ledger.add_collateral(keeper, eth(), who, Signed::wad(1)).unwrap();
            ledger
                .adjust_position(keeper, eth(), who, who, who, Signed::wad(1), Signed::wad(debt))
                .unwrap();
        }
        (config, ledger)
    }

    #[test]
    fn test_no_liquidation_when_safe() {
        let (config, mut ledger) = setup();
        let mut queue = HealthQueue::new();
        refresh_health_queue(&mut queue, &ledger);

        assert_eq!(process_liquidations(&mut queue, &mut ledger, &config), 0);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_liquidates_worst_first_within_batch() {
        let (config, mut ledger) = setup();
        ledger.set_price_with_safety_margin(config.keeper, eth(), ray(900)).unwrap();

        let mut queue = HealthQueue::new();
        refresh_health_queue(&mut queue, &ledger);
        assert_eq!(process_liquidations(&mut queue, &mut ledger, &config), 1);

        // Bob (health -300) goes before Alice (health -100)
        assert!(ledger.position(&eth(), &BOB).is_empty());
        assert_eq!(ledger.position(&eth(), &ALICE).debt_share, wad(1_000));
        assert_eq!(ledger.collateral_balance(&eth(), &config.keeper), wad(1));
        assert_eq!(ledger.system_bad_debt(&config.system_debt_engine), rad(1_200));
        assert!(queue.contains(&(eth(), ALICE)));

        assert_eq!(process_liquidations(&mut queue, &mut ledger, &config), 1);
        assert!(ledger.positions().next().is_none());
        assert_eq!(ledger.total_unbacked_stablecoin(), rad(2_200));
    }

    #[test]
    fn test_liquidation_requires_engine_role() {
        let (config, mut ledger) = setup();
        ledger.revoke_role(config.genesis.owner, Role::LiquidationEngine, config.keeper).unwrap();
        let target = health::scan(&ledger).remove(0);

        assert!(execute_liquidation(&mut ledger, &config, &target).is_err());
        assert!(!ledger.position(&target.pool, &target.owner).is_empty());
    }
}
