// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Severity grading over randomized inputs

use acne_analyzer::analysis::{classify_severity, SeverityCategory, SeverityThresholds};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_few_spots_always_mild() {
    let thresholds = SeverityThresholds::default();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..1000 {
        let count = rng.gen_range(0..5);
        let area = rng.gen::<u64>();
        assert_eq!(
            classify_severity(count, area, &thresholds),
            SeverityCategory::Mild
        );
    }
}

#[test]
fn test_mid_range_always_moderate() {
    let thresholds = SeverityThresholds::default();
    let mut rng = StdRng::seed_from_u64(43);
    for _ in 0..1000 {
        let count = rng.gen_range(5..15);
        let area = rng.gen::<u64>();
        assert_eq!(
            classify_severity(count, area, &thresholds),
            SeverityCategory::Moderate
        );
    }
}

#[test]
fn test_high_count_depends_on_area() {
    let thresholds = SeverityThresholds::default();
    let mut rng = StdRng::seed_from_u64(44);
    for _ in 0..1000 {
        let count = rng.gen_range(15..10_000);
        let area = rng.gen_range(0..20_000u64);
        let expected = if area > 5000 {
            SeverityCategory::Severe
        } else {
            SeverityCategory::Moderate
        };
        assert_eq!(classify_severity(count, area, &thresholds), expected);
    }
}

#[test]
fn test_grading_is_monotonic_in_count() {
    let thresholds = SeverityThresholds::default();
    let rank = |s: SeverityCategory| match s {
        SeverityCategory::Mild => 0,
        SeverityCategory::Moderate => 1,
        SeverityCategory::Severe => 2,
    };
    for area in [0u64, 5000, 5001, 100_000] {
        let mut previous = 0;
        for count in 0..40 {
            let current = rank(classify_severity(count, area, &thresholds));
            assert!(current >= previous, "count {} area {}", count, area);
            previous = current;
        }
    }
}
