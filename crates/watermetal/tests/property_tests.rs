//! Property-based tests for the WaterMetal engines.
//!
//! These tests use proptest to generate random concentration tables and
//! verify that scoring, correlation, PCA and ranking keep their invariants.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p watermetal --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p watermetal --test property_tests
//! ```

use proptest::prelude::*;

use watermetal::pattern::{correlation_matrix, principal_components};
use watermetal::{
    Dataset, HotspotDetector, PcaConfig, ReferenceTable, RiskScorer, RiskThresholds, Sample,
};

// =============================================================================
// Test Strategies
// =============================================================================

const METALS: [&str; 5] = ["Pb", "Zn", "Cu", "Cr", "Ni"];

/// A table of 2-30 samples over the first 2-5 metals, optionally with gaps.
fn dataset(allow_missing: bool) -> impl Strategy<Value = Dataset> {
    (2usize..=5, 2usize..=30).prop_flat_map(move |(n_metals, n_samples)| {
        let cell = if allow_missing {
            prop_oneof![9 => (0.0f64..5000.0).prop_map(Some), 1 => Just(None)].boxed()
        } else {
            (0.0f64..5000.0).prop_map(Some).boxed()
        };
        proptest::collection::vec(proptest::collection::vec(cell, n_metals), n_samples).prop_map(
            move |rows| {
                let metals: Vec<String> =
                    METALS[..n_metals].iter().map(|m| m.to_string()).collect();
                let samples = rows
                    .into_iter()
                    .enumerate()
                    .map(|(i, row)| {
                        row.into_iter()
                            .zip(&metals)
                            .fold(Sample::new(format!("S{:02}", i)), |s, (v, m)| match v {
                                Some(v) => s.with(m.as_str(), v),
                                None => s.with_missing(m.as_str()),
                            })
                    })
                    .collect();
                Dataset::new(metals, samples).unwrap()
            },
        )
    })
}

/// Datasets whose indices tie often, to exercise the id tiebreak.
fn tied_dataset() -> impl Strategy<Value = Dataset> {
    proptest::collection::vec(0u8..4, 2..20).prop_map(|levels| {
        let samples = levels
            .iter()
            .enumerate()
            .map(|(i, level)| Sample::new(format!("T{}", 19 - i)).with("Pb", 20.0 * *level as f64))
            .collect();
        Dataset::new(vec!["Pb".to_string()], samples).unwrap()
    })
}

// =============================================================================
// Risk scoring
// =============================================================================

proptest! {
    #[test]
    fn index_is_sum_of_included_risk_factors(ds in dataset(true)) {
        let assessment = RiskScorer::new().score(&ds, &ReferenceTable::standard()).unwrap();

        for r in &assessment.results {
            let sum: f64 = r.metals.values().map(|m| m.risk_factor).sum();
            prop_assert!((r.index - sum).abs() <= 1e-9 * sum.max(1.0));
            prop_assert_eq!(r.partial_coverage, !r.excluded.is_empty());
            prop_assert_eq!(r.metals.len() + r.excluded.len(), assessment.scored_metals.len());
            prop_assert_eq!(r.class, RiskThresholds::index_default().classify(r.index));
        }
    }

    #[test]
    fn contributions_sum_to_one_hundred(ds in dataset(false)) {
        let assessment = RiskScorer::new().score(&ds, &ReferenceTable::standard()).unwrap();
        let contributions = assessment.metal_contributions();
        let total: f64 = contributions.iter().map(|c| c.total_risk).sum();

        if total > 0.0 {
            let percent: f64 = contributions.iter().map(|c| c.percent).sum();
            prop_assert!((percent - 100.0).abs() < 1e-6);
        }
    }
}

// =============================================================================
// Correlation
// =============================================================================

proptest! {
    #[test]
    fn correlation_is_symmetric_and_bounded(ds in dataset(true)) {
        let m = correlation_matrix(&ds);

        for i in 0..m.len() {
            for j in 0..m.len() {
                let (a, b) = (m.values[i][j], m.values[j][i]);
                prop_assert!(a == b || (a.is_nan() && b.is_nan()));
                if a.is_finite() {
                    prop_assert!((-1.0..=1.0).contains(&a));
                }
            }
            let d = m.values[i][i];
            prop_assert!(d == 1.0 || d.is_nan());
        }
    }
}

// =============================================================================
// PCA
// =============================================================================

proptest! {
    #[test]
    fn components_are_orthonormal_and_ordered(ds in dataset(false)) {
        let config = PcaConfig { variance_threshold: 1.0, ..PcaConfig::default() };
        let Ok(pca) = principal_components(&ds, &config) else {
            return Ok(());
        };

        for w in pca.eigenvalues.windows(2) {
            prop_assert!(w[0] >= w[1]);
        }
        for w in pca.components.windows(2) {
            prop_assert!(w[0].explained_variance_ratio >= w[1].explained_variance_ratio);
        }

        for a in &pca.components {
            let norm: f64 = a.loadings.values().map(|v| v * v).sum();
            prop_assert!((norm - 1.0).abs() < 1e-6);
            for b in &pca.components {
                if a.number < b.number {
                    let dot: f64 = a
                        .loadings
                        .iter()
                        .map(|(metal, v)| v * b.loadings[metal])
                        .sum();
                    prop_assert!(dot.abs() < 1e-6);
                }
            }
        }

        let last = pca.components.last().map(|c| c.cumulative_variance_ratio).unwrap_or(0.0);
        prop_assert!(last <= 1.0 + 1e-9);
    }

    #[test]
    fn pca_is_deterministic(ds in dataset(true)) {
        let config = PcaConfig::default();
        let first = principal_components(&ds, &config);
        let second = principal_components(&ds, &config);

        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "runs disagree"),
        }
    }
}

// =============================================================================
// Ranking
// =============================================================================

proptest! {
    #[test]
    fn ranking_is_total_order(ds in tied_dataset()) {
        let assessment = RiskScorer::new().score(&ds, &ReferenceTable::standard()).unwrap();
        let detector = HotspotDetector::new(&RiskThresholds::index_default());
        let hotspots = detector.detect(&assessment.results);

        prop_assert_eq!(hotspots.ranking.len(), ds.len());
        for w in hotspots.ranking.windows(2) {
            prop_assert!(w[0].index >= w[1].index);
            if w[0].index == w[1].index {
                prop_assert!(w[0].sample_id < w[1].sample_id);
            }
        }
        for (i, row) in hotspots.ranking.iter().enumerate() {
            prop_assert_eq!(row.rank, i + 1);
            prop_assert_eq!(row.hotspot, row.index >= detector.threshold());
        }

        prop_assert_eq!(detector.detect(&assessment.results), hotspots);
    }
}
