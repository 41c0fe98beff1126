//! Hotspot detection: rank samples by risk and flag the worst.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::risk::{RiskClass, RiskResult, RiskThresholds};

/// Hotspot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotspotConfig {
    /// Index at or above which a sample is a hotspot. None = lower bound
    /// of [`RiskClass::Considerable`].
    pub threshold: Option<f64>,
    /// Entries shown in summaries and reports.
    pub top_n: usize,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            threshold: None,
            top_n: 5,
        }
    }
}

/// One position in the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSample {
    /// 1-based rank.
    pub rank: usize,
    pub sample_id: String,
    pub index: f64,
    pub class: RiskClass,
    pub hotspot: bool,
}

/// Samples ordered by descending index, ties by ascending id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotResult {
    pub threshold: f64,
    pub ranking: Vec<RankedSample>,
}

impl HotspotResult {
    /// Flagged samples in rank order.
    pub fn hotspots(&self) -> impl Iterator<Item = &RankedSample> {
        self.ranking.iter().filter(|r| r.hotspot)
    }

    pub fn hotspot_count(&self) -> usize {
        self.hotspots().count()
    }

    /// The first `n` ranked samples.
    pub fn top(&self, n: usize) -> &[RankedSample] {
        &self.ranking[..n.min(self.ranking.len())]
    }
}

/// Ranks risk results and flags hotspots.
#[derive(Debug, Clone)]
pub struct HotspotDetector {
    threshold: f64,
}

impl HotspotDetector {
    /// Detector flagging samples from the `Considerable` class upward.
    pub fn new(thresholds: &RiskThresholds) -> Self {
        Self {
            threshold: thresholds.lower_bound(RiskClass::Considerable),
        }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &HotspotConfig, thresholds: &RiskThresholds) -> Self {
        match config.threshold {
            Some(t) => Self::with_threshold(t),
            None => Self::new(thresholds),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn detect(&self, results: &[RiskResult]) -> HotspotResult {
        let mut ordered: Vec<&RiskResult> = results.iter().collect();
        ordered.sort_by(|a, b| compare(a, b));

        let ranking = ordered
            .into_iter()
            .enumerate()
            .map(|(i, r)| RankedSample {
                rank: i + 1,
                sample_id: r.sample_id.clone(),
                index: r.index,
                class: r.class,
                hotspot: r.index >= self.threshold,
            })
            .collect();

        HotspotResult {
            threshold: self.threshold,
            ranking,
        }
    }
}

fn compare(a: &RiskResult, b: &RiskResult) -> Ordering {
    b.index
        .total_cmp(&a.index)
        .then_with(|| a.sample_id.cmp(&b.sample_id))
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn result(id: &str, index: f64) -> RiskResult {
        RiskResult {
            sample_id: id.to_string(),
            metals: IndexMap::new(),
            index,
            class: RiskThresholds::index_default().classify(index),
            partial_coverage: false,
            excluded: Vec::new(),
        }
    }

    #[test]
    fn test_ranking_desc_with_id_tiebreak() {
        let results = vec![
            result("C", 120.0),
            result("B", 450.0),
            result("A", 120.0),
            result("D", 700.0),
        ];
        let hotspots = HotspotDetector::new(&RiskThresholds::index_default()).detect(&results);

        let ids: Vec<&str> = hotspots.ranking.iter().map(|r| r.sample_id.as_str()).collect();
        assert_eq!(ids, vec!["D", "B", "A", "C"]);
        assert_eq!(hotspots.ranking[0].rank, 1);
        assert_eq!(hotspots.ranking[3].rank, 4);
    }

    #[test]
    fn test_default_threshold_is_considerable_boundary() {
        let detector = HotspotDetector::new(&RiskThresholds::index_default());
        assert_eq!(detector.threshold(), 300.0);

        let hotspots = detector.detect(&[result("A", 300.0), result("B", 299.99)]);
        assert!(hotspots.ranking[0].hotspot);
        assert!(!hotspots.ranking[1].hotspot);
        assert_eq!(hotspots.hotspot_count(), 1);
    }

    #[test]
    fn test_configured_threshold() {
        let config = HotspotConfig {
            threshold: Some(100.0),
            top_n: 5,
        };
        let detector = HotspotDetector::from_config(&config, &RiskThresholds::index_default());
        let hotspots = detector.detect(&[result("A", 150.0), result("B", 50.0)]);
        assert_eq!(hotspots.threshold, 100.0);
        assert_eq!(hotspots.hotspots().count(), 1);
    }

    #[test]
    fn test_top_is_bounded() {
        let detector = HotspotDetector::with_threshold(1.0);
        let hotspots = detector.detect(&[result("A", 2.0), result("B", 3.0)]);
        assert_eq!(hotspots.top(5).len(), 2);
        assert_eq!(hotspots.top(1)[0].sample_id, "B");
    }

    #[test]
    fn test_inputs_unchanged() {
        let results = vec![result("A", 1.0), result("B", 2.0)];
        let before = results.clone();
        HotspotDetector::with_threshold(1.0).detect(&results);
        assert_eq!(results, before);
    }
}
