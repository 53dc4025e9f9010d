//! Human-readable fixed-point amounts: `"150"`, `"1.5 wad"`, `"-0.01 ray"`, `"1000 rad"`

use bookkeeper::{Signed, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("unknown unit `{0}` (expected wad, ray or rad)")]
    UnknownUnit(String),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("`{0}` has more decimal places than its unit allows")]
    TooPrecise(String),
    #[error("`{0}` does not fit in 256 bits")]
    Overflow(String),
    #[error("negative amount `{0}` where an unsigned one is required")]
    Negative(String),
}

/// Decimal places of each unit
fn unit_decimals(unit: &str) -> Option<usize> {
    match unit {
        "wad" => Some(18),
        "ray" => Some(27),
        "rad" => Some(45),
        _ => None,
    }
}

fn parse_unsigned(text: &str) -> Result<U256, AmountError> {
    let mut parts = text.split_whitespace();
    let number = parts.next().ok_or(AmountError::Empty)?;
    let decimals = match parts.next() {
        None => 0,
        Some(unit) => unit_decimals(unit).ok_or_else(|| AmountError::UnknownUnit(unit.to_string()))?,
    };
    if parts.next().is_some() {
        return Err(AmountError::InvalidNumber(text.to_string()));
    }

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    let digits_ok = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !digits_ok(whole) || !digits_ok(fraction) {
        return Err(AmountError::InvalidNumber(text.to_string()));
    }
    if fraction.len() > decimals {
        return Err(AmountError::TooPrecise(text.to_string()));
    }

    // Shift the decimal point right by `decimals` places
    let mut scaled = String::with_capacity(whole.len() + decimals);
    scaled.push_str(whole);
    scaled.push_str(fraction);
    scaled.extend(std::iter::repeat('0').take(decimals - fraction.len()));
    U256::from_dec_str(&scaled).map_err(|_| AmountError::Overflow(text.to_string()))
}

/// Unsigned amount in its raw fixed-point representation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Amount(pub U256);

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(AmountError::Negative(s.to_string()));
        }
        parse_unsigned(s).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed delta, bounded like every ledger delta
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignedAmount(pub Signed);

impl FromStr for SignedAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let magnitude = parse_unsigned(rest.trim_start())?;
        Signed::from_magnitude(negative, magnitude)
            .map(SignedAmount)
            .map_err(|_| AmountError::Overflow(s.to_string()))
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_serde!(Amount);
string_serde!(SignedAmount);

#[cfg(test)]
mod tests {
    use super::*;
    use bookkeeper::{rad, ray, wad, RAY};

    #[test]
    fn test_plain_integer() {
        assert_eq!("150".parse::<Amount>().unwrap().0, U256::from(150u64));
    }

    #[test]
    fn test_units() {
        assert_eq!("2 wad".parse::<Amount>().unwrap().0, wad(2));
        assert_eq!("2 ray".parse::<Amount>().unwrap().0, ray(2));
        assert_eq!("1000000 rad".parse::<Amount>().unwrap().0, rad(1_000_000));
        assert_eq!("1.5 wad".parse::<Amount>().unwrap().0, wad(3) / 2);
        assert_eq!("0.01 ray".parse::<Amount>().unwrap().0, RAY / 100);
    }

    #[test]
    fn test_signed() {
        let delta: SignedAmount = "-0.5 wad".parse().unwrap();
        assert!(delta.0.is_negative());
        assert_eq!(delta.0.magnitude(), wad(1) / 2);
        assert_eq!("+3 wad".parse::<SignedAmount>().unwrap().0, Signed::wad(3));
        assert!(!"-0 wad".parse::<SignedAmount>().unwrap().0.is_negative());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
        assert_eq!("1 eth".parse::<Amount>(), Err(AmountError::UnknownUnit("eth".into())));
        assert_eq!("1.5".parse::<Amount>(), Err(AmountError::TooPrecise("1.5".into())));
        assert_eq!("-1 wad".parse::<Amount>(), Err(AmountError::Negative("-1 wad".into())));
        assert!("1e18".parse::<Amount>().is_err());
        assert!(".5 wad".parse::<Amount>().is_err());
        assert!(matches!("1 wad extra".parse::<Amount>(), Err(AmountError::InvalidNumber(_))));
    }

    #[test]
    fn test_too_large() {
        let huge = format!("{} rad", "9".repeat(40));
        assert!(matches!(huge.parse::<Amount>(), Err(AmountError::Overflow(_))));
        let past_int256 = format!("{}", U256::MAX);
        assert!(matches!(past_int256.parse::<SignedAmount>(), Err(AmountError::Overflow(_))));
    }
}
