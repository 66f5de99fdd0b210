use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// 20-byte account address (EVM-style).
pub type Address = [u8; 20];

/// Token amount in base units (18 decimals for the staking asset).
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Globally unique, monotonically assigned stake identifier.
pub type StakeId = u64;

/// Fixed-point rate in basis points (1 unit = 1/10000).
pub type BasisPoints = u32;

/// Index into the plan table.
pub type PlanIndex = u8;

/// The all-zero address. Never a valid staker; as a referrer it means "none".
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Currency a stake can be paid with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// The chain's native coin.
    Native,
    /// A USD-pegged stable token.
    Stable,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Native, Currency::Stable];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Native => "native",
            Currency::Stable => "stable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "bnb" => Some(Currency::Native),
            "stable" | "usdt" => Some(Currency::Stable),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A balance held by the ledger's treasury.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ReserveAsset {
    /// Staking tokens available for sale.
    StakingInventory,
    /// Reward asset used to pay yield and referral balances.
    Rewards,
    /// Payments collected in the given currency.
    Payments(Currency),
}

impl fmt::Display for ReserveAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReserveAsset::StakingInventory => f.write_str("staking-inventory"),
            ReserveAsset::Rewards => f.write_str("rewards"),
            ReserveAsset::Payments(c) => write!(f, "payments-{}", c),
        }
    }
}

/// Render an address as `0x`-prefixed lowercase hex.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Parse a `0x`-prefixed (or bare) 40-character hex address.
pub fn parse_address(s: &str) -> Option<Address> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).ok()?;
    bytes.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = [0xabu8; 20];
        let s = format_address(&addr);
        assert!(s.starts_with("0x"));
        assert_eq!(parse_address(&s), Some(addr));
        assert_eq!(parse_address(&s[2..]), Some(addr));
    }

    #[test]
    fn test_parse_address_rejects_wrong_length() {
        assert_eq!(parse_address("0x1234"), None);
        assert_eq!(parse_address("not-hex"), None);
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse("USDT"), Some(Currency::Stable));
        assert_eq!(Currency::parse("native"), Some(Currency::Native));
        assert_eq!(Currency::parse("eth"), None);
    }
}
