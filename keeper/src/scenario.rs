//! Scenario replay: a TOML list of ledger calls applied in order

use crate::amount::{Amount, SignedAmount};
use anyhow::{Context, Result};
use bookkeeper::{Address, Ledger, PoolId, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub step: Vec<Step>,
}

/// One ledger call; `caller` is the account invoking it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    AddCollateral {
        caller: Address,
        pool: PoolId,
        account: Address,
        amount: SignedAmount,
    },
    AdjustPosition {
        caller: Address,
        pool: PoolId,
        owner: Address,
        /// Defaults to `owner`
        collateral_payer: Option<Address>,
        /// Defaults to `owner`
        stablecoin_payer: Option<Address>,
        #[serde(default)]
        collateral_delta: SignedAmount,
        #[serde(default)]
        debt_share_delta: SignedAmount,
    },
    MoveCollateral {
        caller: Address,
        pool: PoolId,
        src: Address,
        dst: Address,
        amount: Amount,
    },
    MoveStablecoin {
        caller: Address,
        src: Address,
        dst: Address,
        value: Amount,
    },
    MovePosition {
        caller: Address,
        pool: PoolId,
        src: Address,
        dst: Address,
        #[serde(default)]
        collateral: SignedAmount,
        #[serde(default)]
        debt_share: SignedAmount,
    },
    SetPrice {
        caller: Address,
        pool: PoolId,
        value: Amount,
    },
    AccrueStabilityFee {
        caller: Address,
        pool: PoolId,
        recipient: Address,
        rate_delta: SignedAmount,
    },
    MintUnbacked {
        caller: Address,
        from: Address,
        to: Address,
        value: Amount,
    },
    SettleBadDebt {
        caller: Address,
        value: Amount,
    },
    Whitelist {
        caller: Address,
        delegate: Address,
    },
    Blacklist {
        caller: Address,
        delegate: Address,
    },
    Cage {
        caller: Address,
    },
    Uncage {
        caller: Address,
    },
    SetDebtCeiling {
        caller: Address,
        pool: PoolId,
        value: Amount,
    },
    SetDebtFloor {
        caller: Address,
        pool: PoolId,
        value: Amount,
    },
    SetTotalDebtCeiling {
        caller: Address,
        value: Amount,
    },
    GrantRole {
        caller: Address,
        role: Role,
        account: Address,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::AddCollateral { .. } => "add_collateral",
            Step::AdjustPosition { .. } => "adjust_position",
            Step::MoveCollateral { .. } => "move_collateral",
            Step::MoveStablecoin { .. } => "move_stablecoin",
            Step::MovePosition { .. } => "move_position",
            Step::SetPrice { .. } => "set_price",
            Step::AccrueStabilityFee { .. } => "accrue_stability_fee",
            Step::MintUnbacked { .. } => "mint_unbacked",
            Step::SettleBadDebt { .. } => "settle_bad_debt",
            Step::Whitelist { .. } => "whitelist",
            Step::Blacklist { .. } => "blacklist",
            Step::Cage { .. } => "cage",
            Step::Uncage { .. } => "uncage",
            Step::SetDebtCeiling { .. } => "set_debt_ceiling",
            Step::SetDebtFloor { .. } => "set_debt_floor",
            Step::SetTotalDebtCeiling { .. } => "set_total_debt_ceiling",
            Step::GrantRole { .. } => "grant_role",
        }
    }

    /// Invoke the matching ledger entry point
    pub fn apply(&self, ledger: &mut Ledger) -> bookkeeper::Result<()> {
        match *self {
            Step::AddCollateral { caller, pool, account, amount } => {
                ledger.add_collateral(caller, pool, account, amount.0)
            }
            Step::AdjustPosition {
                caller,
                pool,
                owner,
                collateral_payer,
                stablecoin_payer,
                collateral_delta,
                debt_share_delta,
            } => ledger.adjust_position(
                caller,
                pool,
                owner,
                collateral_payer.unwrap_or(owner),
                stablecoin_payer.unwrap_or(owner),
                collateral_delta.0,
                debt_share_delta.0,
            ),
            Step::MoveCollateral { caller, pool, src, dst, amount } => {
                ledger.move_collateral(caller, pool, src, dst, amount.0)
            }
            Step::MoveStablecoin { caller, src, dst, value } => {
                ledger.move_stablecoin(caller, src, dst, value.0)
            }
            Step::MovePosition { caller, pool, src, dst, collateral, debt_share } => {
                ledger.move_position(caller, pool, src, dst, collateral.0, debt_share.0)
            }
            Step::SetPrice { caller, pool, value } => {
                ledger.set_price_with_safety_margin(caller, pool, value.0)
            }
            Step::AccrueStabilityFee { caller, pool, recipient, rate_delta } => {
                ledger.accrue_stability_fee(caller, pool, recipient, rate_delta.0)
            }
            Step::MintUnbacked { caller, from, to, value } => {
                ledger.mint_unbacked_stablecoin(caller, from, to, value.0)
            }
            Step::SettleBadDebt { caller, value } => ledger.settle_system_bad_debt(caller, value.0),
            Step::Whitelist { caller, delegate } => {
                ledger.whitelist(caller, delegate);
                Ok(())
            }
            Step::Blacklist { caller, delegate } => {
                ledger.blacklist(caller, delegate);
                Ok(())
            }
            Step::Cage { caller } => ledger.cage(caller),
            Step::Uncage { caller } => ledger.uncage(caller),
            Step::SetDebtCeiling { caller, pool, value } => ledger.set_debt_ceiling(caller, pool, value.0),
            Step::SetDebtFloor { caller, pool, value } => ledger.set_debt_floor(caller, pool, value.0),
            Step::SetTotalDebtCeiling { caller, value } => ledger.set_total_debt_ceiling(caller, value.0),
            Step::GrantRole { caller, role, account } => ledger.grant_role(caller, role, account),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub index: usize,
    pub op: &'static str,
    pub error: String,
}

/// Outcome counts of a replay
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tally {
    pub applied: usize,
    pub failed: Vec<Failure>,
}

impl Scenario {
    pub fn load(path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(path);
        let text = std::fs::read_to_string(expanded_path.as_ref())
            .context(format!("Failed to read scenario: {}", path))?;
        toml::from_str(&text).context("Failed to parse scenario TOML")
    }

    /// Apply every step; a failing step is logged and skipped
    pub fn replay(&self, ledger: &mut Ledger) -> Tally {
        let mut tally = Tally::default();
        for (index, step) in self.step.iter().enumerate() {
            match step.apply(ledger) {
                Ok(()) => {
                    log::debug!("step {} {} applied", index, step.name());
                    tally.applied += 1;
                }
                Err(e) => {
                    log::warn!("step {} {} rejected: {}", index, step.name(), e);
                    tally.failed.push(Failure { index, op: step.name(), error: e.to_string() });
                }
            }
        }
        log::info!("Replayed {} steps: {} applied, {} rejected", self.step.len(), tally.applied, tally.failed.len());
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookkeeper::{rad, wad, LedgerError};

    const OWNER: Address = Address::new([1; 32]);
    const KEEPER: Address = Address::new([2; 32]);
    const ALICE: Address = Address::new([0xa1; 32]);

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new(OWNER);
        for role in [Role::Adapter, Role::PositionManager, Role::PriceOracle] {
            ledger.grant_role(OWNER, role, KEEPER).unwrap();
        }
        let pool = PoolId::from_label("ETH-A").unwrap();
        ledger.init_pool(OWNER, pool).unwrap();
        ledger.set_total_debt_ceiling(OWNER, rad(1_000)).unwrap();
        ledger.set_debt_ceiling(OWNER, pool, rad(1_000)).unwrap();
        ledger
    }

    fn scenario() -> Scenario {
        let text = format!(
            r#"
            [[step]]
            op = "set_price"
            caller = "{KEEPER}"
            pool = "ETH-A"
            value = "2 ray"

            [[step]]
            op = "add_collateral"
            caller = "{KEEPER}"
            pool = "ETH-A"
            account = "{ALICE}"
            amount = "100 wad"

            [[step]]
            op = "whitelist"
            caller = "{ALICE}"
            delegate = "{KEEPER}"

            [[step]]
            op = "adjust_position"
            caller = "{KEEPER}"
            pool = "ETH-A"
            owner = "{ALICE}"
            collateral_delta = "100 wad"
            debt_share_delta = "150 wad"

            [[step]]
            op = "adjust_position"
            caller = "{KEEPER}"
            pool = "ETH-A"
            owner = "{ALICE}"
            debt_share_delta = "100 wad"
            "#
        );
        toml::from_str(&text).unwrap()
    }

    #[test]
    fn test_parse_tagged_steps() {
        let scenario = scenario();
        assert_eq!(scenario.step.len(), 5);
        assert_eq!(scenario.step[0].name(), "set_price");
        assert!(matches!(
            scenario.step[4],
            Step::AdjustPosition { collateral_payer: None, .. }
        ));
    }

    #[test]
    fn test_replay_tallies_failures() {
        let mut ledger = ledger();
        let tally = scenario().replay(&mut ledger);

        assert_eq!(tally.applied, 4);
        assert_eq!(tally.failed.len(), 1);
        assert_eq!(tally.failed[0].index, 4);
        assert_eq!(tally.failed[0].error, LedgerError::NotSafe.to_string());

        let pool = PoolId::from_label("ETH-A").unwrap();
        assert_eq!(ledger.position(&pool, &ALICE).debt_share, wad(150));
        assert_eq!(ledger.stablecoin_balance(&ALICE), rad(150));
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let text = r#"
            [[step]]
            op = "print_money"
            caller = "x"
        "#;
        assert!(toml::from_str::<Scenario>(text).is_err());
    }
}
