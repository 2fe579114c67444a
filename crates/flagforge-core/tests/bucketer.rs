// flagforge-core/tests/bucketer.rs
// ============================================================================
// Module: Bucketer Cross-Module Tests
// Description: Distribution and stability coverage for deterministic bucketing.
// Purpose: Validate §8's literal bucketing scenarios at the crate boundary.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions are permitted."
)]

use flagforge_core::Bucketer;

#[test]
fn bucket_is_stable_across_repeated_and_concurrent_calls() {
    let salt = "v1";
    let feature_id = "app::darkMode";
    let stable_id = "11111111111111111111111111111111";

    let baseline = Bucketer::bucket(salt, feature_id, stable_id);

    let threads: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(move || Bucketer::bucket(salt, feature_id, stable_id)))
        .collect();
    for handle in threads {
        assert_eq!(handle.join().expect("thread join"), baseline);
    }
}

#[test]
fn fifty_percent_ramp_up_distribution_is_within_tolerance() {
    let admitted = (0..10_000)
        .filter(|n| {
            let stable_id = format!("user-{n}");
            let bucket = Bucketer::bucket("v1", "app::darkMode", &stable_id);
            Bucketer::admits(50.0, bucket)
        })
        .count();
    assert!((4_800..=5_200).contains(&admitted), "admitted = {admitted}");
}

#[test]
fn distinct_feature_ids_redistribute_independently() {
    let stable_id = "abcdef0123456789";
    let bucket_a = Bucketer::bucket("v1", "app::darkMode", stable_id);
    let bucket_b = Bucketer::bucket("v1", "app::newCheckout", stable_id);
    assert_ne!(bucket_a, bucket_b, "distinct feature ids should not collide on this input");
}
