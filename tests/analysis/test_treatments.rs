// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Treatment recommendation sampling

use acne_analyzer::analysis::SeverityCategory;
use acne_analyzer::treatments::{TreatmentCatalog, RECOMMENDATION_COUNT};
use std::collections::HashSet;

#[test]
fn test_recommendations_are_unique_and_in_category() {
    let catalog = TreatmentCatalog::builtin();
    for severity in SeverityCategory::ALL {
        for _ in 0..200 {
            let picks = catalog.recommend(severity);
            assert_eq!(picks.len(), RECOMMENDATION_COUNT);
            assert_eq!(picks.iter().collect::<HashSet<_>>().len(), picks.len());
            assert!(picks.iter().all(|p| catalog.get(severity).contains(p)));
        }
    }
}

#[test]
fn test_recommendations_vary_between_calls() {
    let catalog = TreatmentCatalog::builtin();
    let seen: HashSet<Vec<String>> = (0..50)
        .map(|_| catalog.recommend(SeverityCategory::Severe))
        .collect();
    assert!(seen.len() > 1);
}

#[test]
fn test_categories_do_not_leak() {
    let catalog = TreatmentCatalog::builtin();
    let severe: HashSet<&String> = catalog.get(SeverityCategory::Severe).iter().collect();
    for _ in 0..100 {
        for pick in catalog.recommend(SeverityCategory::Mild) {
            assert!(!severe.contains(&pick));
        }
    }
}

#[test]
fn test_catalog_file_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("treatments.toml");
    std::fs::write(
        &path,
        r#"
mild = ["Wash twice daily"]
moderate = ["See a pharmacist", "Use a retinoid"]
severe = ["See a dermatologist"]
"#,
    )
    .unwrap();

    let catalog = TreatmentCatalog::from_file(&path).unwrap();
    assert_eq!(
        catalog.recommend(SeverityCategory::Mild),
        vec!["Wash twice daily".to_string()]
    );
    assert_eq!(catalog.recommend(SeverityCategory::Moderate).len(), 2);
}
