//! Adversarial step generator

#[cfg(kani)]
use kani::any;
use bookkeeper::*;

use crate::generators::*;

#[derive(Clone, Copy, Debug)]
pub enum Step {
    Deposit,
    Adjust,
    MovePosition,
    MoveCollateral,
    MoveStablecoin,
    Confiscate,
    Accrue,
    Settle,
    MintUnbacked,
}

/// Operands of one step; unused fields are ignored
#[derive(Clone, Copy, Debug, Default)]
pub struct StepArgs {
    pub who: usize,
    pub other: usize,
    pub collateral: Signed,
    pub debt_share: Signed,
    pub amount: u64,
}

/// Apply one step as the account holding the matching role
pub fn apply_step(ledger: &mut Ledger, step: Step, args: StepArgs) -> Result<()> {
    let users = users();
    let who = users[args.who % users.len()];
    let other = users[args.other % users.len()];
    let pool = pool_id();

    match step {
        Step::Deposit => ledger.add_collateral(ADAPTER, pool, who, args.collateral),
        Step::Adjust => ledger.adjust_position(MANAGER, pool, who, who, who, args.collateral, args.debt_share),
        Step::MovePosition => {
            ledger.move_position(MANAGER, pool, who, other, args.collateral, args.debt_share)
        }
        Step::MoveCollateral => ledger.move_collateral(who, pool, who, other, wad(args.amount)),
        Step::MoveStablecoin => ledger.move_stablecoin(who, who, other, rad(args.amount)),
        Step::Confiscate => ledger.confiscate_position(
            LIQUIDATOR,
            pool,
            who,
            LIQUIDATOR,
            DEBT_ENGINE,
            args.collateral,
            args.debt_share,
        ),
        Step::Accrue => {
            let rate_delta = Signed::from(args.amount as i128 * 10_000_000_000_000_000_000_000_000);
            ledger.accrue_stability_fee(FEE_COLLECTOR, pool, DEBT_ENGINE, rate_delta)
        }
        Step::Settle => ledger.settle_system_bad_debt(DEBT_ENGINE, rad(args.amount)),
        Step::MintUnbacked => ledger.mint_unbacked_stablecoin(MINTER, DEBT_ENGINE, other, rad(args.amount)),
    }
}

#[cfg(kani)]
impl kani::Arbitrary for Step {
    fn any() -> Self {
        let choice: u8 = any();
        match choice % 9 {
            0 => Step::Deposit,
            1 => Step::Adjust,
            2 => Step::MovePosition,
            3 => Step::MoveCollateral,
            4 => Step::MoveStablecoin,
            5 => Step::Confiscate,
            6 => Step::Accrue,
            7 => Step::Settle,
            _ => Step::MintUnbacked,
        }
    }
}

#[cfg(kani)]
pub fn any_step_args() -> StepArgs {
    StepArgs {
        who: any::<u8>() as usize,
        other: any::<u8>() as usize,
        collateral: any_signed_units(),
        debt_share: any_signed_units(),
        amount: (any::<u8>() % 100) as u64,
    }
}

/// One arbitrary step; errors leave the ledger untouched and are dropped
#[cfg(kani)]
pub fn adversary_step(ledger: &mut Ledger) -> Step {
    let step = any::<Step>();
    let _ = apply_step(ledger, step, any_step_args());
    step
}
