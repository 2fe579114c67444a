// flagforge-core/src/runtime/bucketer.rs
// ============================================================================
// Module: FlagForge Bucketer
// Description: Deterministic SHA-256-based mapping to a percentage bucket.
// Purpose: Gate ramp-up admission uniformly and reproducibly across
//          processes (§4.1).
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! [`Bucketer::bucket`] is a pure, total function of `(salt, feature_id,
//! stable_id)` to an integer in `[0, 10_000)`. [`Bucketer::admits`]
//! answers the ramp-up admission question from a ramp-up percentage and a
//! precomputed bucket.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;

/// The number of distinct buckets; affords 0.01% rollout granularity.
pub const BUCKET_COUNT: u32 = 10_000;

// ============================================================================
// SECTION: Bucketer
// ============================================================================

/// Stateless deterministic bucketing.
///
/// Every call allocates its own hasher, so `bucket` is trivially
/// thread-safe: there is no shared mutable hasher state between calls
/// (§4.1, "Failure modes").
pub struct Bucketer;

impl Bucketer {
    /// Maps `(salt, feature_id, stable_id_hex)` to an integer in
    /// `[0, 10_000)`.
    ///
    /// Composes `"{salt}:{feature_id}:{stable_id_hex}"`, hashes it with
    /// SHA-256, reads the first four bytes as a big-endian `u32`, clears
    /// the sign bit, and takes the result modulo [`BUCKET_COUNT`].
    #[must_use]
    pub fn bucket(salt: &str, feature_id: &str, stable_id_hex: &str) -> u32 {
        let input = format!("{salt}:{feature_id}:{stable_id_hex}");
        let digest = Sha256::digest(input.as_bytes());
        let leading = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        (leading & 0x7FFF_FFFF) % BUCKET_COUNT
    }

    /// Returns whether `bucket` is admitted under `ramp_up` (a percentage
    /// in `[0.0, 100.0]`).
    ///
    /// `threshold = round(ramp_up * 100.0)` basis points; a bucket is
    /// admitted iff `bucket < threshold`. Consequently `ramp_up = 100.0`
    /// admits every bucket and `ramp_up = 0.0` admits none.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, reason = "ramp_up is validated to [0, 100] before this is called")]
    pub fn admits(ramp_up: f64, bucket: u32) -> bool {
        let threshold = (ramp_up * 100.0).round() as u32;
        bucket < threshold
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::Bucketer;

    #[test]
    fn bucket_is_in_range() {
        let bucket = Bucketer::bucket("v1", "app::darkMode", "11111111111111111111111111111111");
        assert!(bucket < super::BUCKET_COUNT);
    }

    #[test]
    fn bucket_is_stable_across_repeated_calls() {
        let a = Bucketer::bucket("v1", "app::darkMode", "11111111111111111111111111111111");
        let b = Bucketer::bucket("v1", "app::darkMode", "11111111111111111111111111111111");
        assert_eq!(a, b);
    }

    #[test]
    fn different_salts_generally_redistribute_buckets() {
        let mut distinct = HashSet::new();
        for salt in ["v1", "v2", "v3", "v4", "v5"] {
            distinct.insert(Bucketer::bucket(salt, "app::darkMode", "abcdef"));
        }
        assert!(distinct.len() > 1);
    }

    #[test]
    fn ramp_up_zero_admits_nothing() {
        assert!(!Bucketer::admits(0.0, 0));
    }

    #[test]
    fn ramp_up_hundred_admits_everything() {
        assert!(Bucketer::admits(100.0, 9_999));
    }

    #[test]
    fn fifty_percent_ramp_up_admits_roughly_half_of_ten_thousand_users() {
        let admitted = (0..10_000)
            .filter(|n| {
                let stable_id = format!("user-{n}");
                let bucket = Bucketer::bucket("v1", "app::darkMode", &stable_id);
                Bucketer::admits(50.0, bucket)
            })
            .count();
        assert!((4_800..=5_200).contains(&admitted), "admitted = {admitted}");
    }
}
