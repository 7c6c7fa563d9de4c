//! Dirty-detection hashing
//!
//! Provides [`StateHash`], a 32-bit rolling hash over a canonical string.
//! It only answers "did anything save-relevant change", so it is not
//! collision-resistant and must never be used for integrity checks.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-bit signed rolling hash (`h = h * 31 + unit`, wrapping)
///
/// Computed over UTF-16 code units so the same document text always yields
/// the same value regardless of where it was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StateHash(i32);

impl StateHash {
    #[inline]
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Hash a string
    #[must_use]
    pub fn compute(data: &str) -> Self {
        let hash = data.encode_utf16().fold(0i32, |acc, unit| {
            acc.wrapping_mul(31).wrapping_add(i32::from(unit))
        });
        Self(hash)
    }

    /// Hash the JSON encoding of a serializable value
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn compute_serializable<T>(value: &T) -> Result<Self, HashError>
    where
        T: serde::Serialize,
    {
        let json = serde_json::to_string(value)?;
        Ok(Self::compute(&json))
    }
}

/// Errors related to hash operations
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Canonical serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Not a base-36 hash string
    #[error("invalid hash string: '{0}'")]
    InvalidFormat(String),
}

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl Display for StateHash {
    /// Signed base-36, e.g. `-1b2c` or `0`
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut magnitude = self.0.unsigned_abs();
        if magnitude == 0 {
            return f.write_str("0");
        }
        let mut buf = Vec::with_capacity(8);
        while magnitude > 0 {
            buf.push(DIGITS[(magnitude % 36) as usize]);
            magnitude /= 36;
        }
        if self.0 < 0 {
            buf.push(b'-');
        }
        buf.reverse();
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

impl FromStr for StateHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        i32::from_str_radix(s, 36)
            .map(Self)
            .map_err(|_| HashError::InvalidFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_string_hashes_to_zero() {
        assert_eq!(StateHash::compute(""), StateHash::new(0));
    }

    #[test]
    fn known_values() {
        // "a" = 97, "ab" = 97 * 31 + 98
        assert_eq!(StateHash::compute("a").value(), 97);
        assert_eq!(StateHash::compute("ab").value(), 3105);
    }

    #[test]
    fn wraps_instead_of_overflowing() {
        let long = "z".repeat(10_000);
        let _ = StateHash::compute(&long);
    }

    #[test]
    fn counts_utf16_units() {
        // U+1F600 is a surrogate pair: two units
        let emoji = StateHash::compute("\u{1F600}");
        let expected = 0xD83D_i32.wrapping_mul(31).wrapping_add(0xDE00);
        assert_eq!(emoji.value(), expected);
    }

    #[test]
    fn display_is_signed_base36() {
        assert_eq!(StateHash::new(0).to_string(), "0");
        assert_eq!(StateHash::new(35).to_string(), "z");
        assert_eq!(StateHash::new(36).to_string(), "10");
        assert_eq!(StateHash::new(-37).to_string(), "-11");
        assert_eq!(StateHash::new(i32::MIN).to_string(), "-zik0zk");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            StateHash::from_str("not a hash!"),
            Err(HashError::InvalidFormat(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_display_round_trips(value in any::<i32>()) {
            let hash = StateHash::new(value);
            prop_assert_eq!(StateHash::from_str(&hash.to_string()).unwrap(), hash);
        }

        #[test]
        fn prop_compute_is_deterministic(text in ".*") {
            prop_assert_eq!(StateHash::compute(&text), StateHash::compute(&text));
        }
    }
}
