//! State transitions - every value is computed and checked before the first write

use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::ledger::Ledger;
use crate::math::*;
use crate::types::{Address, PoolId, Role};
use primitive_types::U256;

impl Ledger {
    // ------------------------------------------------------------------
    // Fungible balances
    // ------------------------------------------------------------------

    /// Reflect an external deposit (+) or withdrawal (-) of collateral
    pub fn add_collateral(
        &mut self,
        caller: Address,
        pool: PoolId,
        account: Address,
        amount: Signed,
    ) -> Result<()> {
        self.state.require_role(Role::Adapter, &caller)?;
        self.initialized_pool(&pool)?;
        let balance = add_signed(self.state.collateral_balance(&pool, &account), amount)?;

        self.state.put_collateral(pool, account, balance);
        log::debug!("add_collateral pool={} account={} amount={}", pool, account, amount);
        Ok(())
    }

    pub fn move_collateral(
        &mut self,
        caller: Address,
        pool: PoolId,
        src: Address,
        dst: Address,
        amount: U256,
    ) -> Result<()> {
        self.state.require_consent(&src, &caller)?;
        self.initialized_pool(&pool)?;
        let src_balance = sub(self.state.collateral_balance(&pool, &src), amount)?;
        let dst_before = if src == dst { src_balance } else { self.state.collateral_balance(&pool, &dst) };
        let dst_balance = add(dst_before, amount)?;

        self.state.put_collateral(pool, src, src_balance);
        self.state.put_collateral(pool, dst, dst_balance);
        log::debug!("move_collateral pool={} {} -> {} amount={}", pool, src, dst, amount);
        Ok(())
    }

    pub fn move_stablecoin(
        &mut self,
        caller: Address,
        src: Address,
        dst: Address,
        value: U256,
    ) -> Result<()> {
        self.state.require_consent(&src, &caller)?;
        let src_balance = sub(self.state.stablecoin_balance(&src), value)?;
        let dst_before = if src == dst { src_balance } else { self.state.stablecoin_balance(&dst) };
        let dst_balance = add(dst_before, value)?;

        self.state.put_stablecoin(src, src_balance);
        self.state.put_stablecoin(dst, dst_balance);
        log::debug!("move_stablecoin {} -> {} value={}", src, dst, value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Positions
    // ------------------------------------------------------------------

    /// Lock/free collateral and draw/wipe debt on `owner`'s position
    ///
    /// A positive collateral delta locks collateral taken from
    /// `collateral_payer`'s free balance; a negative one returns it there.
    /// A positive debt-share delta mints stablecoin to `stablecoin_payer`;
    /// a negative one burns it from there. Either way the caller needs
    /// `stablecoin_payer`'s consent.
    #[allow(clippy::too_many_arguments)]
    pub fn adjust_position(
        &mut self,
        caller: Address,
        pool: PoolId,
        owner: Address,
        collateral_payer: Address,
        stablecoin_payer: Address,
        collateral_delta: Signed,
        debt_share_delta: Signed,
    ) -> Result<()> {
        self.state.require_role(Role::PositionManager, &caller)?;
        self.require_live()?;
        let mut config = self.initialized_pool(&pool)?;

        let mut position = self.state.position(&pool, &owner);
        position.locked_collateral = add_signed(position.locked_collateral, collateral_delta)?;
        position.debt_share = add_signed(position.debt_share, debt_share_delta)?;
        config.total_debt_share = add_signed(config.total_debt_share, debt_share_delta)?;

        let debt_value_delta = mul_signed(config.debt_accumulated_rate, debt_share_delta)?;
        let debt_value = config.debt_value(&position)?;
        let total_issued = add_signed(self.state.total_stablecoin_issued, debt_value_delta)?;

        if debt_share_delta.is_positive()
            && (config.total_debt_value()? > config.debt_ceiling
                || total_issued > self.state.total_debt_ceiling)
        {
            return Err(LedgerError::CeilingExceeded);
        }

        let risk_increasing = debt_share_delta.is_positive() || collateral_delta.is_negative();
        if risk_increasing && debt_value > config.collateral_value(&position)? {
            return Err(LedgerError::NotSafe);
        }

        if risk_increasing {
            self.state.require_consent(&owner, &caller)?;
        }
        if collateral_delta.is_positive() {
            self.state.require_consent(&collateral_payer, &caller)?;
        }
        if !debt_share_delta.is_zero() {
            self.state.require_consent(&stablecoin_payer, &caller)?;
        }

        if !position.debt_share.is_zero() && debt_value < config.debt_floor {
            return Err(LedgerError::DebtFloorViolation);
        }

        let payer_collateral =
            sub_signed(self.state.collateral_balance(&pool, &collateral_payer), collateral_delta)?;
        let payer_stablecoin =
            add_signed(self.state.stablecoin_balance(&stablecoin_payer), debt_value_delta)?;

        self.state.put_collateral(pool, collateral_payer, payer_collateral);
        self.state.put_stablecoin(stablecoin_payer, payer_stablecoin);
        self.state.put_position(pool, owner, position);
        self.state.pools.insert(pool, config);
        self.state.total_stablecoin_issued = total_issued;

        log::debug!(
            "adjust_position pool={} owner={} collateral_delta={} debt_share_delta={}",
            pool,
            owner,
            collateral_delta,
            debt_share_delta
        );
        self.emit(LedgerEvent::AdjustPosition {
            caller,
            pool,
            owner,
            locked_collateral: position.locked_collateral,
            debt_share: position.debt_share,
            collateral_delta,
            debt_share_delta,
        });
        Ok(())
    }

    /// Move collateral and debt share from `src`'s position to `dst`'s
    ///
    /// Both resulting positions must be safe and respect the debt floor.
    pub fn move_position(
        &mut self,
        caller: Address,
        pool: PoolId,
        src: Address,
        dst: Address,
        collateral: Signed,
        debt_share: Signed,
    ) -> Result<()> {
        self.state.require_role(Role::PositionManager, &caller)?;
        self.state.require_consent(&src, &caller)?;
        self.state.require_consent(&dst, &caller)?;
        let config = self.initialized_pool(&pool)?;

        let mut from = self.state.position(&pool, &src);
        from.locked_collateral = sub_signed(from.locked_collateral, collateral)?;
        from.debt_share = sub_signed(from.debt_share, debt_share)?;

        let mut to = if src == dst { from } else { self.state.position(&pool, &dst) };
        to.locked_collateral = add_signed(to.locked_collateral, collateral)?;
        to.debt_share = add_signed(to.debt_share, debt_share)?;
        if src == dst {
            from = to;
        }

        let from_debt = config.debt_value(&from)?;
        let to_debt = config.debt_value(&to)?;

        if from_debt > config.collateral_value(&from)? {
            return Err(LedgerError::UnsafeSource);
        }
        if to_debt > config.collateral_value(&to)? {
            return Err(LedgerError::UnsafeDestination);
        }
        if !from.debt_share.is_zero() && from_debt < config.debt_floor {
            return Err(LedgerError::DebtFloorSource);
        }
        if !to.debt_share.is_zero() && to_debt < config.debt_floor {
            return Err(LedgerError::DebtFloorDestination);
        }

        self.state.put_position(pool, src, from);
        self.state.put_position(pool, dst, to);
        log::debug!(
            "move_position pool={} {} -> {} collateral={} debt_share={}",
            pool,
            src,
            dst,
            collateral,
            debt_share
        );
        Ok(())
    }

    /// Forcibly unwind a position for the liquidation engine
    ///
    /// Deltas are applied to the position as given. The collateral recipient's
    /// free balance is reduced by `collateral_delta` and the debt recipient's
    /// bad debt (and the unbacked total) by the debt value delta, so the
    /// liquidation path passes non-positive deltas to seize collateral and
    /// recognise bad debt. No safety, ceiling or floor checks apply.
    #[allow(clippy::too_many_arguments)]
    pub fn confiscate_position(
        &mut self,
        caller: Address,
        pool: PoolId,
        owner: Address,
        collateral_recipient: Address,
        debt_recipient: Address,
        collateral_delta: Signed,
        debt_share_delta: Signed,
    ) -> Result<()> {
        self.state.require_role(Role::LiquidationEngine, &caller)?;
        let mut config = self.initialized_pool(&pool)?;

        let mut position = self.state.position(&pool, &owner);
        position.locked_collateral = add_signed(position.locked_collateral, collateral_delta)?;
        position.debt_share = add_signed(position.debt_share, debt_share_delta)?;
        config.total_debt_share = add_signed(config.total_debt_share, debt_share_delta)?;

        let debt_value_delta = mul_signed(config.debt_accumulated_rate, debt_share_delta)?;
        let recipient_collateral = sub_signed(
            self.state.collateral_balance(&pool, &collateral_recipient),
            collateral_delta,
        )?;
        let recipient_bad_debt = sub_signed(self.state.bad_debt(&debt_recipient), debt_value_delta)?;
        let total_unbacked = sub_signed(self.state.total_unbacked_stablecoin, debt_value_delta)?;

        self.state.put_position(pool, owner, position);
        self.state.pools.insert(pool, config);
        self.state.put_collateral(pool, collateral_recipient, recipient_collateral);
        self.state.put_bad_debt(debt_recipient, recipient_bad_debt);
        self.state.total_unbacked_stablecoin = total_unbacked;

        log::debug!(
            "confiscate_position pool={} owner={} collateral_delta={} debt_value_delta={}",
            pool,
            owner,
            collateral_delta,
            debt_value_delta
        );
        self.emit(LedgerEvent::ConfiscatePosition {
            pool,
            owner,
            collateral_recipient,
            debt_recipient,
            collateral_delta,
            debt_value_delta,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bad debt
    // ------------------------------------------------------------------

    /// Burn the caller's stablecoin against the caller's bad debt
    pub fn settle_system_bad_debt(&mut self, caller: Address, value: U256) -> Result<()> {
        let bad_debt = sub(self.state.bad_debt(&caller), value)?;
        let balance = sub(self.state.stablecoin_balance(&caller), value)?;
        let total_unbacked = sub(self.state.total_unbacked_stablecoin, value)?;
        let total_issued = sub(self.state.total_stablecoin_issued, value)?;

        self.state.put_bad_debt(caller, bad_debt);
        self.state.put_stablecoin(caller, balance);
        self.state.total_unbacked_stablecoin = total_unbacked;
        self.state.total_stablecoin_issued = total_issued;
        log::debug!("settle_system_bad_debt account={} value={}", caller, value);
        Ok(())
    }

    /// Mint stablecoin to `to` charged as bad debt of `from`
    pub fn mint_unbacked_stablecoin(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<()> {
        self.state.require_role(Role::Mintable, &caller)?;
        let bad_debt = add(self.state.bad_debt(&from), value)?;
        let balance = add(self.state.stablecoin_balance(&to), value)?;
        let total_unbacked = add(self.state.total_unbacked_stablecoin, value)?;
        let total_issued = add(self.state.total_stablecoin_issued, value)?;

        self.state.put_bad_debt(from, bad_debt);
        self.state.put_stablecoin(to, balance);
        self.state.total_unbacked_stablecoin = total_unbacked;
        self.state.total_stablecoin_issued = total_issued;
        log::debug!("mint_unbacked_stablecoin from={} to={} value={}", from, to, value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stability fee
    // ------------------------------------------------------------------

    /// Raise the pool rate and credit the accrued interest to `recipient`
    pub fn accrue_stability_fee(
        &mut self,
        caller: Address,
        pool: PoolId,
        recipient: Address,
        rate_delta: Signed,
    ) -> Result<()> {
        self.state.require_role(Role::StabilityFeeCollector, &caller)?;
        self.require_live()?;
        let mut config = self.initialized_pool(&pool)?;

        config.debt_accumulated_rate = add_signed(config.debt_accumulated_rate, rate_delta)?;
        let value = mul_signed(config.total_debt_share, rate_delta)?;
        let balance = add_signed(self.state.stablecoin_balance(&recipient), value)?;
        let total_issued = add_signed(self.state.total_stablecoin_issued, value)?;

        self.state.pools.insert(pool, config);
        self.state.put_stablecoin(recipient, balance);
        self.state.total_stablecoin_issued = total_issued;

        log::debug!("accrue_stability_fee pool={} rate_delta={} value={}", pool, rate_delta, value);
        self.emit(LedgerEvent::AccrueStabilityFee { pool, recipient, rate_delta, value });
        Ok(())
    }
}
