//! SimHash text fingerprints.
//!
//! A fingerprint is a `width`-bit signature built by bit voting over hashed
//! word tokens. Near-identical texts differ in few bits, so the Hamming
//! distance between fingerprints approximates text similarity. This is an
//! auxiliary signal and independent of the tree engine.

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::OnceLock;

use crate::result::{PlrError, PlrResult};

/// Default fingerprint width in bits
pub const DEFAULT_WIDTH: u32 = 64;

fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\w+").expect("valid token pattern"))
}

/// Fixed-width bit signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    bits: u64,
    width: u32,
}

impl Fingerprint {
    /// Raw bits (only the low `width` bits are meaningful)
    #[must_use]
    pub const fn bits(&self) -> u64 {
        self.bits
    }

    /// Width in bits
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Zero-padded lower-case hex
    #[must_use]
    pub fn to_hex(&self) -> String {
        let digits = self.width.div_ceil(4) as usize;
        format!("{:0digits$x}", self.bits)
    }

    /// Hamming distance to `other`, over the narrower of the two widths
    #[must_use]
    pub fn distance(&self, other: &Self) -> u32 {
        let mask = width_mask(self.width.min(other.width));
        ((self.bits ^ other.bits) & mask).count_ones()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// SimHash fingerprint generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimHash {
    width: u32,
}

impl Default for SimHash {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
        }
    }
}

impl SimHash {
    /// Generator for `width` bits (1 to 64)
    pub fn new(width: u32) -> PlrResult<Self> {
        if (1..=64).contains(&width) {
            Ok(Self { width })
        } else {
            Err(PlrError::invalid_config(format!(
                "fingerprint width must be between 1 and 64, got {width}"
            )))
        }
    }

    /// Width in bits
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Fingerprint of `text`
    #[must_use]
    pub fn compute(&self, text: &str) -> Fingerprint {
        let lowered = text.to_lowercase();
        let mut votes = vec![0i64; self.width as usize];

        for token in token_pattern().find_iter(&lowered) {
            let hash = token_hash(token.as_str());
            for (bit, vote) in votes.iter_mut().enumerate() {
                if (hash >> bit) & 1 == 1 {
                    *vote += 1;
                } else {
                    *vote -= 1;
                }
            }
        }

        let bits = votes
            .iter()
            .enumerate()
            .filter(|(_, vote)| **vote >= 0)
            .fold(0u64, |acc, (bit, _)| acc | (1 << bit));

        Fingerprint {
            bits,
            width: self.width,
        }
    }

    /// Hamming distance between two fingerprints, masked to this width
    #[must_use]
    pub fn distance(&self, a: &Fingerprint, b: &Fingerprint) -> u32 {
        ((a.bits ^ b.bits) & width_mask(self.width)).count_ones()
    }
}

/// Distance between the default-width fingerprints of two texts
#[must_use]
pub fn simhash_distance(a: &str, b: &str) -> u32 {
    let simhash = SimHash::default();
    simhash.distance(&simhash.compute(a), &simhash.compute(b))
}

/// Low 64 bits of the token's SHA-256 digest
fn token_hash(token: &str) -> u64 {
    let digest = Sha256::digest(token.as_bytes());
    let mut low = [0u8; 8];
    low.copy_from_slice(&digest[digest.len() - 8..]);
    u64::from_be_bytes(low)
}

const fn width_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_text_zero_distance() {
        assert_eq!(simhash_distance("Sign in to your account", "Sign in to your account"), 0);
    }

    #[test]
    fn test_case_and_punctuation_ignored() {
        assert_eq!(simhash_distance("Hello, World!", "hello world"), 0);
    }

    #[test]
    fn test_empty_text_is_all_ones() {
        // zero votes everywhere, and a zero vote sets the bit
        let fp = SimHash::default().compute("");
        assert_eq!(fp.bits(), u64::MAX);
        assert_eq!(fp.to_hex(), "ffffffffffffffff");
    }

    #[test]
    fn test_hex_is_padded_to_width() {
        let simhash = SimHash::new(16).unwrap();
        let fp = simhash.compute("a b c");
        assert_eq!(fp.to_hex().len(), 4);
        assert!(fp.bits() <= 0xffff);
    }

    #[test]
    fn test_invalid_width_rejected() {
        assert!(SimHash::new(0).is_err());
        assert!(SimHash::new(65).is_err());
        assert!(SimHash::new(1).is_ok());
    }

    #[test]
    fn test_one_token_change_is_small() {
        let a = "the quick brown fox jumps over the lazy dog near the river bank today";
        let b = "the quick brown fox jumps over the lazy cat near the river bank today";
        let unrelated = "completely different sentence about checkout totals and taxes";
        let near = simhash_distance(a, b);
        let far = simhash_distance(a, unrelated);
        assert!(near < 32, "near-duplicate distance {near}");
        assert!(near < far, "near {near} should be below unrelated {far}");
    }

    #[test]
    fn test_distance_masks_to_width() {
        let simhash = SimHash::new(8).unwrap();
        let a = Fingerprint { bits: 0xff00, width: 8 };
        let b = Fingerprint { bits: 0x0000, width: 8 };
        assert_eq!(simhash.distance(&a, &b), 0);
        assert_eq!(a.distance(&b), 0);
    }

    proptest! {
        #[test]
        fn prop_self_distance_zero(text in ".{0,80}") {
            let simhash = SimHash::default();
            let fp = simhash.compute(&text);
            prop_assert_eq!(simhash.distance(&fp, &fp), 0);
        }

        #[test]
        fn prop_distance_symmetric(a in "[a-z ]{0,60}", b in "[a-z ]{0,60}") {
            prop_assert_eq!(simhash_distance(&a, &b), simhash_distance(&b, &a));
            prop_assert!(simhash_distance(&a, &b) <= 64);
        }
    }
}
