//! Identity types: accounts, collateral pool tags and roles

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid address {0:?}: expected 32 base58-encoded bytes")]
    InvalidAddress(String),
    #[error("pool id {0:?} is longer than 32 bytes")]
    PoolIdTooLong(String),
    #[error("invalid pool id {0:?}: expected 0x followed by 64 hex digits")]
    InvalidPoolId(String),
    #[error("unknown role {0:?}")]
    UnknownRole(String),
}

/// 32-byte account identifier, base58 when rendered
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 32]);

impl Address {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| ParseError::InvalidAddress(s.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ParseError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

/// Opaque 32-byte collateral pool tag, usually an ASCII label such as `ETH-A`
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId([u8; 32]);

impl PoolId {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build a tag from a label, zero right-padded
    pub fn from_label(label: &str) -> Result<Self, ParseError> {
        let raw = label.as_bytes();
        if raw.len() > 32 {
            return Err(ParseError::PoolIdTooLong(label.to_string()));
        }
        let mut bytes = [0u8; 32];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The label, if the tag is printable ASCII followed by zero padding
    pub fn label(&self) -> Option<&str> {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(32);
        if self.0[end..].iter().any(|b| *b != 0) {
            return None;
        }
        let label = &self.0[..end];
        if label.is_empty() || !label.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            return None;
        }
        core::str::from_utf8(label).ok()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId({})", self)
    }
}

impl FromStr for PoolId {
    type Err = ParseError;

    /// Accepts a label or the `0x` form `Display` renders for other tags
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("0x") {
            // 66 characters never fit in a label, so the forms cannot collide
            Some(digits) if digits.len() == 64 => {
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(digits, &mut bytes)
                    .map_err(|_| ParseError::InvalidPoolId(s.to_string()))?;
                Ok(Self(bytes))
            }
            _ => Self::from_label(s),
        }
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
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_serde!(Address);
string_serde!(PoolId);

/// Capabilities checked by the permission gate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Owner,
    Governance,
    PriceOracle,
    Adapter,
    PositionManager,
    LiquidationEngine,
    StabilityFeeCollector,
    Mintable,
    ShowStopper,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::Owner,
        Role::Governance,
        Role::PriceOracle,
        Role::Adapter,
        Role::PositionManager,
        Role::LiquidationEngine,
        Role::StabilityFeeCollector,
        Role::Mintable,
        Role::ShowStopper,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Governance => "governance",
            Role::PriceOracle => "price-oracle",
            Role::Adapter => "adapter",
            Role::PositionManager => "position-manager",
            Role::LiquidationEngine => "liquidation-engine",
            Role::StabilityFeeCollector => "stability-fee-collector",
            Role::Mintable => "mintable",
            Role::ShowStopper => "show-stopper",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.name() == s)
            .ok_or_else(|| ParseError::UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_base58_roundtrip() {
        let addr = Address::new([7u8; 32]);
        let text = addr.to_string();
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_address_rejects_wrong_length() {
        let short = bs58::encode([1u8; 20]).into_string();
        assert!(matches!(short.parse::<Address>(), Err(ParseError::InvalidAddress(_))));
        assert!("not-base58-0OIl".parse::<Address>().is_err());
    }

    #[test]
    fn test_pool_id_label() {
        let id = PoolId::from_label("ETH-A").unwrap();
        assert_eq!(id.label(), Some("ETH-A"));
        assert_eq!(id.to_string(), "ETH-A");
        assert_eq!(&id.as_bytes()[..5], b"ETH-A");
        assert!(id.as_bytes()[5..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_pool_id_binary_tag_renders_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xff;
        bytes[31] = 0x01;
        let id = PoolId::new(bytes);
        assert_eq!(id.label(), None);
        assert!(id.to_string().starts_with("0xff00"));
        assert!(id.to_string().ends_with("01"));
    }

    #[test]
    fn test_pool_id_unlabelled_tags_parse_back() {
        let mut arbitrary = [0u8; 32];
        arbitrary[0] = 0xff;
        arbitrary[31] = 0x01;
        let tags = [
            PoolId::new(arbitrary),
            PoolId::from_label("").unwrap(),
            PoolId::from_label("ÉTH-A").unwrap(),
            PoolId::from_label("ETH-A").unwrap(),
        ];
        for id in tags {
            assert_eq!(id.to_string().parse::<PoolId>().unwrap(), id);
        }

        let bad = format!("0x{}", "zz".repeat(32));
        assert!(matches!(bad.parse::<PoolId>(), Err(ParseError::InvalidPoolId(_))));
    }

    #[test]
    fn test_pool_id_too_long() {
        let label = "X".repeat(33);
        assert!(matches!(PoolId::from_label(&label), Err(ParseError::PoolIdTooLong(_))));
    }

    #[test]
    fn test_role_names_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.name().parse::<Role>().unwrap(), role);
        }
        assert!("janitor".parse::<Role>().is_err());
    }
}
