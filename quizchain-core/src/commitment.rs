//! One-way commitment codec shared by every game instance.
//!
//! Two composable pure functions: [`digest`] hashes an arbitrary byte
//! string, [`salted_digest`] re-hashes a prior digest under the fixed
//! system-wide [`SALT`]. An instance persists `salted_digest(committed)`,
//! so the stored value is never directly equal to `digest(plaintext)` and
//! the initializing payload cannot be replayed as a guess.

use crate::error::{QuizchainError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;

/// Domain-separation salt prepended before re-hashing a committed digest.
/// Publicly known and identical across all instances; immutability is its
/// only protection.
pub const SALT: &[u8; 32] = b"Random salt prepended to the msg";

/// Fixed 32-byte one-way hash output.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    pub const LEN: usize = 32;
    pub const ZERO: Digest = Digest([0u8; 32]);

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Digest(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)
            .map_err(|e| QuizchainError::invalid_input(format!("malformed digest hex: {}", e)))?;
        Digest::try_from(bytes.as_slice())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = QuizchainError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            QuizchainError::invalid_input(format!(
                "digest must be {} bytes, got {}",
                Digest::LEN,
                bytes.len()
            ))
        })?;
        Ok(Digest(bytes))
    }
}

impl FromStr for Digest {
    type Err = QuizchainError;

    fn from_str(s: &str) -> Result<Self> {
        Digest::from_hex(s)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Deterministic one-way digest of an arbitrary byte string.
pub fn digest(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Digest(hasher.finalize().into())
}

/// Digest of `SALT ++ prior`, the form every instance persists.
pub fn salted_digest(prior: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(SALT);
    hasher.update(prior.as_bytes());
    Digest(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(digest(b"answer"), digest(b"answer"));
        assert_eq!(
            salted_digest(&digest(b"answer")),
            salted_digest(&digest(b"answer"))
        );
    }

    #[test]
    fn distinct_plaintexts_yield_distinct_stored_digests() {
        let a = salted_digest(&digest(b"answer"));
        let b = salted_digest(&digest(b"answer2"));
        assert_ne!(a, b);
    }

    #[test]
    fn salting_changes_the_digest() {
        let plain = digest(b"answer");
        assert_ne!(plain, salted_digest(&plain));
    }

    #[test]
    fn digests_are_never_zero() {
        assert!(!digest(b"").is_zero());
        assert!(!salted_digest(&Digest::ZERO).is_zero());
        assert!(Digest::ZERO.is_zero());
    }

    #[test]
    fn hex_round_trip() {
        let d = digest(b"answer");
        assert_eq!(Digest::from_hex(&d.to_hex()).unwrap(), d);
        let prefixed = format!("0x{}", d.to_hex());
        assert_eq!(Digest::from_hex(&prefixed).unwrap(), d);
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!(matches!(
            Digest::from_hex("abcd"),
            Err(QuizchainError::InvalidInput(_))
        ));
        assert!(matches!(
            Digest::from_hex("zz".repeat(32).as_str()),
            Err(QuizchainError::InvalidInput(_))
        ));
        assert!(matches!(
            Digest::try_from(&[0u8; 31][..]),
            Err(QuizchainError::InvalidInput(_))
        ));
    }

    #[test]
    fn salt_is_exactly_one_hash_block_of_text() {
        assert_eq!(SALT.len(), Digest::LEN);
    }
}
