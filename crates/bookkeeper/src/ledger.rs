//! The Ledger: owner of all state, entry points for administration

use crate::error::{LedgerError, Result};
use crate::events::{EventSink, LedgerEvent};
use crate::math::RAY;
use crate::state::{CollateralPool, LedgerState, Position};
use crate::types::{Address, PoolId, Role};
use primitive_types::U256;

/// Collateralized-debt ledger
///
/// Every entry point takes the calling account explicitly. A call either
/// commits all of its writes or returns an error having written nothing.
pub struct Ledger {
    pub(crate) state: LedgerState,
    sink: Option<Box<dyn EventSink>>,
}

impl Ledger {
    /// New live ledger administered by `owner`
    pub fn new(owner: Address) -> Self {
        Self::from_state(LedgerState::new(owner))
    }

    /// Resume from previously persisted state
    pub fn from_state(state: LedgerState) -> Self {
        Self { state, sink: None }
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn set_sink(&mut self, sink: Option<Box<dyn EventSink>>) {
        self.sink = sink;
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn into_state(self) -> LedgerState {
        self.state
    }

    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(&event);
        }
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn pool(&self, pool: &PoolId) -> CollateralPool {
        self.state.pool(pool)
    }

    pub fn position(&self, pool: &PoolId, owner: &Address) -> Position {
        self.state.position(pool, owner)
    }

    /// Non-empty positions, ordered by (pool, owner)
    pub fn positions(&self) -> impl Iterator<Item = (&(PoolId, Address), &Position)> {
        self.state.positions.iter()
    }

    pub fn collateral_balance(&self, pool: &PoolId, account: &Address) -> U256 {
        self.state.collateral_balance(pool, account)
    }

    pub fn stablecoin_balance(&self, account: &Address) -> U256 {
        self.state.stablecoin_balance(account)
    }

    pub fn system_bad_debt(&self, account: &Address) -> U256 {
        self.state.bad_debt(account)
    }

    pub fn total_stablecoin_issued(&self) -> U256 {
        self.state.total_stablecoin_issued
    }

    pub fn total_unbacked_stablecoin(&self) -> U256 {
        self.state.total_unbacked_stablecoin
    }

    pub fn total_debt_ceiling(&self) -> U256 {
        self.state.total_debt_ceiling
    }

    pub fn is_live(&self) -> bool {
        self.state.live
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.state.has_role(role, account)
    }

    pub fn wish(&self, principal: &Address, caller: &Address) -> bool {
        self.state.wish(principal, caller)
    }

    // ------------------------------------------------------------------
    // Roles and consent
    // ------------------------------------------------------------------

    pub fn grant_role(&mut self, caller: Address, role: Role, account: Address) -> Result<()> {
        self.state.require_role(Role::Owner, &caller)?;
        if self.state.insert_role(role, account) {
            log::debug!("role {} granted to {}", role, account);
            self.emit(LedgerEvent::RoleGranted { role, account, caller });
        }
        Ok(())
    }

    pub fn revoke_role(&mut self, caller: Address, role: Role, account: Address) -> Result<()> {
        self.state.require_role(Role::Owner, &caller)?;
        if self.state.remove_role(role, &account) {
            log::debug!("role {} revoked from {}", role, account);
            self.emit(LedgerEvent::RoleRevoked { role, account, caller });
        }
        Ok(())
    }

    /// Let `delegate` act on the caller's positions and balances
    pub fn whitelist(&mut self, caller: Address, delegate: Address) {
        if self.state.consents.insert((caller, delegate)) {
            self.emit(LedgerEvent::Whitelisted { principal: caller, delegate });
        }
    }

    pub fn blacklist(&mut self, caller: Address, delegate: Address) {
        if self.state.consents.remove(&(caller, delegate)) {
            self.emit(LedgerEvent::Blacklisted { principal: caller, delegate });
        }
    }

    // ------------------------------------------------------------------
    // Pool administration
    // ------------------------------------------------------------------

    pub fn init_pool(&mut self, caller: Address, pool: PoolId) -> Result<()> {
        self.state.require_role(Role::Owner, &caller)?;
        let mut config = self.state.pool(&pool);
        if config.is_initialized() {
            return Err(LedgerError::PoolAlreadyInitialized(pool));
        }
        config.debt_accumulated_rate = RAY;
        self.state.pools.insert(pool, config);

        log::debug!("pool {} initialized", pool);
        self.emit(LedgerEvent::PoolInitialized { pool, caller });
        Ok(())
    }

    pub fn set_total_debt_ceiling(&mut self, caller: Address, value: U256) -> Result<()> {
        self.state.require_any_role(Role::Owner, Role::Governance, &caller)?;
        self.require_live()?;
        self.state.total_debt_ceiling = value;
        self.emit(LedgerEvent::SetTotalDebtCeiling { caller, value });
        Ok(())
    }

    pub fn set_debt_ceiling(&mut self, caller: Address, pool: PoolId, value: U256) -> Result<()> {
        self.state.require_any_role(Role::Owner, Role::Governance, &caller)?;
        self.require_live()?;
        let mut config = self.initialized_pool(&pool)?;
        config.debt_ceiling = value;
        self.state.pools.insert(pool, config);
        self.emit(LedgerEvent::SetDebtCeiling { caller, pool, value });
        Ok(())
    }

    pub fn set_debt_floor(&mut self, caller: Address, pool: PoolId, value: U256) -> Result<()> {
        self.state.require_any_role(Role::Owner, Role::Governance, &caller)?;
        self.require_live()?;
        let mut config = self.initialized_pool(&pool)?;
        config.debt_floor = value;
        self.state.pools.insert(pool, config);
        self.emit(LedgerEvent::SetDebtFloor { caller, pool, value });
        Ok(())
    }

    pub fn set_price_with_safety_margin(
        &mut self,
        caller: Address,
        pool: PoolId,
        value: U256,
    ) -> Result<()> {
        self.state.require_role(Role::PriceOracle, &caller)?;
        self.require_live()?;
        let mut config = self.initialized_pool(&pool)?;
        config.price_with_safety_margin = value;
        self.state.pools.insert(pool, config);
        self.emit(LedgerEvent::SetPriceWithSafetyMargin { caller, pool, value });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Emergency shutdown
    pub fn cage(&mut self, caller: Address) -> Result<()> {
        self.state.require_any_role(Role::Owner, Role::ShowStopper, &caller)?;
        if !self.state.live {
            return Err(LedgerError::AlreadyCaged);
        }
        self.state.live = false;
        log::warn!("ledger caged by {}", caller);
        self.emit(LedgerEvent::Cage);
        Ok(())
    }

    pub fn uncage(&mut self, caller: Address) -> Result<()> {
        self.state.require_any_role(Role::Owner, Role::ShowStopper, &caller)?;
        if self.state.live {
            return Err(LedgerError::NotCaged);
        }
        self.state.live = true;
        log::warn!("ledger uncaged by {}", caller);
        self.emit(LedgerEvent::Uncage);
        Ok(())
    }

    pub(crate) fn require_live(&self) -> Result<()> {
        if self.state.live {
            Ok(())
        } else {
            Err(LedgerError::NotLive)
        }
    }

    pub(crate) fn initialized_pool(&self, pool: &PoolId) -> Result<CollateralPool> {
        let config = self.state.pool(pool);
        if !config.is_initialized() {
            return Err(LedgerError::PoolNotInitialized(*pool));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Permission;
    use crate::events::RecordingSink;
    use crate::math::rad;

    const OWNER: Address = Address::new([1; 32]);
    const GOV: Address = Address::new([2; 32]);
    const ORACLE: Address = Address::new([3; 32]);
    const STRANGER: Address = Address::new([9; 32]);

    fn eth() -> PoolId {
        PoolId::from_label("ETH-A").unwrap()
    }

    #[test]
    fn test_init_pool_sets_rate_once() {
        let mut ledger = Ledger::new(OWNER);
        ledger.init_pool(OWNER, eth()).unwrap();
        assert_eq!(ledger.pool(&eth()).debt_accumulated_rate, RAY);
        assert_eq!(ledger.init_pool(OWNER, eth()), Err(LedgerError::PoolAlreadyInitialized(eth())));
    }

    #[test]
    fn test_init_pool_requires_owner() {
        let mut ledger = Ledger::new(OWNER);
        assert_eq!(
            ledger.init_pool(STRANGER, eth()),
            Err(LedgerError::Unauthorized(Permission::Role(Role::Owner)))
        );
        assert!(!ledger.pool(&eth()).is_initialized());
    }

    #[test]
    fn test_setters_require_initialized_pool() {
        let mut ledger = Ledger::new(OWNER);
        assert_eq!(
            ledger.set_debt_ceiling(OWNER, eth(), rad(1)),
            Err(LedgerError::PoolNotInitialized(eth()))
        );
        assert!(ledger.state().pools.is_empty());
    }

    #[test]
    fn test_governance_may_set_ceilings() {
        let mut ledger = Ledger::new(OWNER);
        ledger.grant_role(OWNER, Role::Governance, GOV).unwrap();
        ledger.init_pool(OWNER, eth()).unwrap();

        ledger.set_total_debt_ceiling(GOV, rad(1_000_000)).unwrap();
        ledger.set_debt_ceiling(GOV, eth(), rad(500_000)).unwrap();
        ledger.set_debt_floor(OWNER, eth(), rad(100)).unwrap();

        assert_eq!(ledger.total_debt_ceiling(), rad(1_000_000));
        assert_eq!(ledger.pool(&eth()).debt_ceiling, rad(500_000));
        assert_eq!(ledger.pool(&eth()).debt_floor, rad(100));

        assert_eq!(
            ledger.set_debt_floor(STRANGER, eth(), rad(1)),
            Err(LedgerError::Unauthorized(Permission::AnyOf(Role::Owner, Role::Governance)))
        );
    }

    #[test]
    fn test_price_requires_oracle_role() {
        let mut ledger = Ledger::new(OWNER);
        ledger.init_pool(OWNER, eth()).unwrap();
        assert!(ledger.set_price_with_safety_margin(OWNER, eth(), RAY).is_err());

        ledger.grant_role(OWNER, Role::PriceOracle, ORACLE).unwrap();
        ledger.set_price_with_safety_margin(ORACLE, eth(), RAY).unwrap();
        assert_eq!(ledger.pool(&eth()).price_with_safety_margin, RAY);
    }

    #[test]
    fn test_cage_and_uncage() {
        let mut ledger = Ledger::new(OWNER);
        ledger.init_pool(OWNER, eth()).unwrap();
        ledger.cage(OWNER).unwrap();
        assert!(!ledger.is_live());
        assert_eq!(ledger.cage(OWNER), Err(LedgerError::AlreadyCaged));
        assert_eq!(ledger.set_debt_ceiling(OWNER, eth(), rad(1)), Err(LedgerError::NotLive));

        ledger.uncage(OWNER).unwrap();
        assert!(ledger.is_live());
        assert_eq!(ledger.uncage(OWNER), Err(LedgerError::NotCaged));
        ledger.set_debt_ceiling(OWNER, eth(), rad(1)).unwrap();
    }

    #[test]
    fn test_show_stopper_cages() {
        let mut ledger = Ledger::new(OWNER);
        assert!(ledger.cage(STRANGER).is_err());
        ledger.grant_role(OWNER, Role::ShowStopper, STRANGER).unwrap();
        ledger.cage(STRANGER).unwrap();
        assert!(!ledger.is_live());
    }

    #[test]
    fn test_role_admin_is_owner_only() {
        let mut ledger = Ledger::new(OWNER);
        assert!(ledger.grant_role(GOV, Role::Governance, GOV).is_err());
        ledger.grant_role(OWNER, Role::Governance, GOV).unwrap();
        assert!(ledger.has_role(Role::Governance, &GOV));
        ledger.revoke_role(OWNER, Role::Governance, GOV).unwrap();
        assert!(!ledger.has_role(Role::Governance, &GOV));
    }

    #[test]
    fn test_events_only_on_change() {
        let sink = RecordingSink::new();
        let mut ledger = Ledger::new(OWNER).with_sink(sink.clone());

        ledger.whitelist(OWNER, GOV);
        ledger.whitelist(OWNER, GOV);
        ledger.blacklist(OWNER, GOV);
        ledger.blacklist(OWNER, GOV);
        let _ = ledger.init_pool(STRANGER, eth());

        assert_eq!(
            sink.events(),
            vec![
                LedgerEvent::Whitelisted { principal: OWNER, delegate: GOV },
                LedgerEvent::Blacklisted { principal: OWNER, delegate: GOV },
            ]
        );
    }
}
