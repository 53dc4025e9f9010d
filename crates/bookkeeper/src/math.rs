//! Checked fixed-point arithmetic - no wrapping, no saturation, no panics
//!
//! Three scales are in use:
//! - wad: 10^18 (collateral amounts, debt shares)
//! - ray: 10^27 (accumulated rates, safety-margin prices)
//! - rad: 10^45 = wad * ray (debt values, stablecoin balances)

use crate::error::{LedgerError, Result};
use core::cmp::Ordering;
use core::fmt;
use core::ops::Neg;
use primitive_types::U256;

pub const WAD: U256 = U256([0x0de0_b6b3_a764_0000, 0, 0, 0]);
pub const RAY: U256 = U256([0x9fd0_803c_e800_0000, 0x033b_2e3c, 0, 0]);
pub const RAD: U256 = U256([0x0b22_a000_0000_0000, 0xe086_b93c_e2f7_68a0, 0x002c_d76f, 0]);

/// Whole units in wad
pub fn wad(n: u64) -> U256 {
    U256::from(n) * WAD
}

/// Whole units in ray
pub fn ray(n: u64) -> U256 {
    U256::from(n) * RAY
}

/// Whole units in rad
pub fn rad(n: u64) -> U256 {
    U256::from(n) * RAD
}

/// Signed 256-bit adjustment, sign-magnitude, bounded to the int256 range
///
/// Zero is never negative, so derived equality is structural.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signed {
    negative: bool,
    magnitude: U256,
}

impl Signed {
    pub const ZERO: Signed = Signed { negative: false, magnitude: U256([0, 0, 0, 0]) };

    /// 2^255 - 1
    pub const MAX_MAGNITUDE: U256 = U256([u64::MAX, u64::MAX, u64::MAX, i64::MAX as u64]);

    pub fn from_magnitude(negative: bool, magnitude: U256) -> Result<Self> {
        if magnitude > Self::MAX_MAGNITUDE {
            return Err(LedgerError::ArithmeticOverflow);
        }
        Ok(Self { negative: negative && !magnitude.is_zero(), magnitude })
    }

    pub fn positive(magnitude: U256) -> Result<Self> {
        Self::from_magnitude(false, magnitude)
    }

    pub fn negative(magnitude: U256) -> Result<Self> {
        Self::from_magnitude(true, magnitude)
    }

    /// Whole wad units
    pub fn wad(n: i64) -> Self {
        Self::scaled(n, WAD)
    }

    /// Whole ray units
    pub fn ray(n: i64) -> Self {
        Self::scaled(n, RAY)
    }

    fn scaled(n: i64, unit: U256) -> Self {
        // |i64| * 10^27 is far below 2^255
        let magnitude = U256::from(n.unsigned_abs()) * unit;
        Self { negative: n < 0, magnitude }
    }

    /// `a - b` as a signed value
    pub fn difference(a: U256, b: U256) -> Result<Self> {
        if a >= b {
            Self::positive(a - b)
        } else {
            Self::negative(b - a)
        }
    }

    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_positive(&self) -> bool {
        !self.negative && !self.magnitude.is_zero()
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }
}

impl From<i128> for Signed {
    fn from(value: i128) -> Self {
        Self { negative: value < 0, magnitude: U256::from(value.unsigned_abs()) }
    }
}

impl Neg for Signed {
    type Output = Signed;

    fn neg(self) -> Signed {
        Signed { negative: !self.negative && !self.magnitude.is_zero(), magnitude: self.magnitude }
    }
}

impl Ord for Signed {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => self.magnitude.cmp(&other.magnitude),
            (true, true) => other.magnitude.cmp(&self.magnitude),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Signed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Signed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        write!(f, "{}", self.magnitude)
    }
}

impl fmt::Debug for Signed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signed({})", self)
    }
}

pub fn add(x: U256, y: U256) -> Result<U256> {
    x.checked_add(y).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn sub(x: U256, y: U256) -> Result<U256> {
    x.checked_sub(y).ok_or(LedgerError::ArithmeticUnderflow)
}

pub fn mul(x: U256, y: U256) -> Result<U256> {
    x.checked_mul(y).ok_or(LedgerError::ArithmeticOverflow)
}

/// Apply a signed delta to an unsigned base
///
/// A negative delta can never raise the result and a positive one can never
/// lower it: the magnitude is added or subtracted with the checked primitives.
pub fn add_signed(x: U256, y: Signed) -> Result<U256> {
    if y.is_negative() {
        sub(x, y.magnitude)
    } else {
        add(x, y.magnitude)
    }
}

pub fn sub_signed(x: U256, y: Signed) -> Result<U256> {
    add_signed(x, -y)
}

/// Unsigned rate times signed amount
///
/// The product must divide back to `x` exactly and fit the int256 range.
pub fn mul_signed(x: U256, y: Signed) -> Result<Signed> {
    if y.is_zero() {
        return Ok(Signed::ZERO);
    }
    let z = mul(x, y.magnitude)?;
    if z / y.magnitude != x {
        return Err(LedgerError::ArithmeticOverflow);
    }
    Signed::from_magnitude(y.negative, z)
}
