//! Kani safety proofs for the ledger accounting invariants

use kani::{any, assume};
use bookkeeper::helpers::*;
use bookkeeper::*;
use crate::{adversary::*, generators::*, sanitizer::*};

/// Debt shares, issued stablecoin and bad debt stay equal to the sums
/// they aggregate across adversarial sequences
#[kani::proof]
#[kani::unwind(8)]
fn conservation_holds_across_short_adversary_sequences() {
    let mut ledger = Ledger::from_state(any_state_bounded().sanitize());

    let mut steps: u8 = any();
    steps = (steps % MAX_STEPS) + 1;

    for _ in 0..steps {
        adversary_step(&mut ledger);
        kani::assert(debt_shares_conserved(ledger.state()), "Pool debt share must equal sum of positions");
        kani::assert(stablecoin_conserved(ledger.state()), "Issued stablecoin must equal sum of balances");
        kani::assert(bad_debt_conserved(ledger.state()), "Unbacked stablecoin must equal sum of bad debt");
    }
}

/// A rejected step writes nothing
#[kani::proof]
#[kani::unwind(8)]
fn failed_step_leaves_state_unchanged() {
    let mut ledger = Ledger::from_state(any_state_bounded().sanitize());
    let before = ledger.state().clone();

    let step: Step = any();
    if apply_step(&mut ledger, step, any_step_args()).is_err() {
        kani::assert(ledger.state() == &before, "Failed step must not mutate state");
    }
}

/// A successful risk-increasing adjustment leaves the position safe
#[kani::proof]
#[kani::unwind(8)]
fn risk_increasing_adjustment_is_safe() {
    let mut ledger = Ledger::from_state(any_state_bounded().sanitize());
    let owner = users()[0];
    let collateral_delta = any_signed_units();
    let debt_share_delta = any_signed_units();
    assume(debt_share_delta.is_positive() || collateral_delta.is_negative());

    let result = ledger.adjust_position(
        MANAGER,
        pool_id(),
        owner,
        owner,
        owner,
        collateral_delta,
        debt_share_delta,
    );
    if result.is_ok() {
        let pool = ledger.pool(&pool_id());
        let position = ledger.position(&pool_id(), &owner);
        kani::assert(is_safe(&pool, &position).unwrap_or(false), "Adjusted position must be safe");
    }
}

/// Accounts without the matching role cannot touch balances
#[kani::proof]
#[kani::unwind(8)]
fn unauthorized_cannot_mutate() {
    let mut ledger = Ledger::from_state(any_state_bounded().sanitize());
    let before = ledger.state().clone();
    let intruder = users()[(any::<u8>() as usize) % users().len()];
    let pool = pool_id();

    let result = ledger.add_collateral(intruder, pool, intruder, any_signed_units());
    kani::assert(result.is_err(), "Only adapters may credit collateral");
    let result = ledger.adjust_position(intruder, pool, intruder, intruder, intruder, any_signed_units(), any_signed_units());
    kani::assert(result.is_err(), "Only position managers may adjust positions");
    let result = ledger.confiscate_position(intruder, pool, intruder, intruder, intruder, any_signed_units(), any_signed_units());
    kani::assert(result.is_err(), "Only liquidation engines may confiscate");
    let result = ledger.mint_unbacked_stablecoin(intruder, intruder, intruder, rad(1));
    kani::assert(result.is_err(), "Only mintable accounts may mint unbacked stablecoin");

    kani::assert(ledger.state() == &before, "Unauthorized calls must not mutate state");
}

/// Zero deltas change nothing for a position that respects the floor
#[kani::proof]
#[kani::unwind(8)]
fn empty_adjustment_is_a_no_op() {
    let mut ledger = Ledger::from_state(any_state_bounded().sanitize());
    let owner = users()[0];
    let pool = ledger.pool(&pool_id());
    assume(respects_debt_floor(&pool, &ledger.position(&pool_id(), &owner)).unwrap_or(false));
    let before = ledger.state().clone();

    let result = ledger.adjust_position(MANAGER, pool_id(), owner, owner, owner, Signed::ZERO, Signed::ZERO);
    kani::assert(result.is_ok(), "Empty adjustment must succeed");
    kani::assert(ledger.state() == &before, "Empty adjustment must not change state");
}

/// Confiscated debt value lands in bad debt one-for-one
#[kani::proof]
#[kani::unwind(8)]
fn confiscation_moves_debt_into_bad_debt() {
    let mut ledger = Ledger::from_state(any_state_bounded().sanitize());
    let owner = users()[0];
    let position = ledger.position(&pool_id(), &owner);
    let rate = ledger.pool(&pool_id()).debt_accumulated_rate;
    let bad_debt = ledger.system_bad_debt(&DEBT_ENGINE);

    let result = ledger.confiscate_position(
        LIQUIDATOR,
        pool_id(),
        owner,
        LIQUIDATOR,
        DEBT_ENGINE,
        Signed::negative(position.locked_collateral).unwrap_or_default(),
        Signed::negative(position.debt_share).unwrap_or_default(),
    );
    kani::assert(result.is_ok(), "Full confiscation of a bounded position must succeed");
    kani::assert(ledger.position(&pool_id(), &owner).is_empty(), "Position must be emptied");

    let expected = mul(rate, position.debt_share).map(|v| v.saturating_add(bad_debt));
    kani::assert(expected == Ok(ledger.system_bad_debt(&DEBT_ENGINE)), "Bad debt must grow by the debt value");
}

/// Signed multiply agrees with unsigned multiply on the magnitude
#[kani::proof]
fn mul_signed_matches_magnitude() {
    let x = U256::from(any::<u64>());
    let y: i64 = any();
    let product = mul_signed(x, Signed::from(y as i128));

    let expected = mul(x, U256::from(y.unsigned_abs()));
    kani::assert(product.clone().map(|p| p.magnitude()) == expected, "Magnitude must equal |x * y|");
    if let Ok(p) = product {
        kani::assert(p.is_negative() == (y < 0 && !x.is_zero()), "Sign must follow y");
    }
}
