//! Metal-wise share of the total ecological risk.

use serde::{Deserialize, Serialize};

use super::scorer::RiskAssessment;

/// Total risk attributed to one metal across all samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalContribution {
    pub metal: String,
    /// Sum of the metal's risk factors over every sample.
    pub total_risk: f64,
    /// Share of the grand total in percent (0 when the total is 0).
    pub percent: f64,
}

impl RiskAssessment {
    /// Per-metal totals in scored-metal order.
    pub fn metal_contributions(&self) -> Vec<MetalContribution> {
        let totals: Vec<(String, f64)> = self
            .scored_metals
            .iter()
            .map(|metal| {
                let total = self
                    .results
                    .iter()
                    .filter_map(|r| r.metals.get(metal))
                    .map(|m| m.risk_factor)
                    .sum();
                (metal.clone(), total)
            })
            .collect();

        let grand_total: f64 = totals.iter().map(|(_, t)| t).sum();

        totals
            .into_iter()
            .map(|(metal, total_risk)| MetalContribution {
                metal,
                total_risk,
                percent: if grand_total > 0.0 {
                    100.0 * total_risk / grand_total
                } else {
                    0.0
                },
            })
            .collect()
    }
}
