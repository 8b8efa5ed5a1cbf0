//! Deterministic mock sources for development and testing.
//!
//! The same address and seed always produce the same data. Values derive
//! from `sha256(lowercase(address) + seed)`.

mod ledger;
mod payments;
mod registry;

pub use ledger::{MockActivitySource, MockLedger, MockTxSuccessSource};
pub use payments::MockProfitabilitySource;
pub use registry::MockStabilitySource;

use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};

pub const DEFAULT_SEED: u64 = 42;

/// Label written to `data_source` by every mock.
pub const MOCK_SOURCE: &str = "mock";

/// `0x` followed by 40 hex digits.
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

pub(crate) fn address_digest(address: &str, seed: u64) -> [u8; 32] {
    let digest = Sha256::digest(format!("{}{}", address.to_lowercase(), seed).as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    bytes
}

/// Independent random stream per address, seed and purpose.
pub(crate) fn seeded_rng(address: &str, seed: u64, stream: &str) -> StdRng {
    let digest = Sha256::digest(format!("{stream}:{}{seed}", address.to_lowercase()).as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    StdRng::seed_from_u64(u64::from_be_bytes(head))
}

/// Pseudo address derived from a label.
pub(crate) fn derived_address(label: &str) -> String {
    let digest = hex::encode(Sha256::digest(label.as_bytes()));
    format!("0x{}", &digest[..40])
}

/// Pseudo transaction hash derived from a label.
pub(crate) fn derived_hash(label: &str) -> String {
    format!("0x{}", hex::encode(Sha256::digest(label.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address("0x1111111111111111111111111111111111111111"));
        assert!(is_valid_address("0xAbCdEf0123456789abcdef0123456789ABCDEF01"));
        assert!(!is_valid_address("1111111111111111111111111111111111111111"));
        assert!(!is_valid_address("0x1234"));
        assert!(!is_valid_address("0xzz11111111111111111111111111111111111111"));
    }

    #[test]
    fn test_digest_ignores_case() {
        let lower = address_digest("0xabcdef0123456789abcdef0123456789abcdef01", DEFAULT_SEED);
        let upper = address_digest("0xABCDEF0123456789ABCDEF0123456789ABCDEF01", DEFAULT_SEED);
        assert_eq!(lower, upper);
        assert_ne!(lower, address_digest("0xabcdef0123456789abcdef0123456789abcdef01", 7));
    }

    #[test]
    fn test_derived_values() {
        let address = derived_address("counterparty-1");
        assert!(is_valid_address(&address));
        assert_eq!(derived_hash("tx").len(), 66);
    }
}
