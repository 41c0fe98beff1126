//! Validated in-memory measurement table.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WaterMetalError};

/// One observation: a sampling station and its measured concentrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Identifier, unique within a dataset.
    pub id: String,
    /// Metal → concentration. `None` means the value was not measured.
    pub concentrations: IndexMap<String, Option<f64>>,
}

impl Sample {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            concentrations: IndexMap::new(),
        }
    }

    /// Add a measured concentration.
    pub fn with(mut self, metal: impl Into<String>, value: f64) -> Self {
        self.concentrations.insert(metal.into(), Some(value));
        self
    }

    /// Add a metal with no measured value.
    pub fn with_missing(mut self, metal: impl Into<String>) -> Self {
        self.concentrations.insert(metal.into(), None);
        self
    }

    /// Concentration of a metal, `None` if missing or not a column.
    pub fn concentration(&self, metal: &str) -> Option<f64> {
        self.concentrations.get(metal).copied().flatten()
    }
}

/// Ordered samples sharing one fixed, ordered set of metal columns.
///
/// Construction guarantees that sample ids and metal names are unique and
/// that every sample carries an entry for every metal, stored in column
/// order. Values are stored as given; negative or non-finite readings are
/// left for the engines to reject per item (see [`is_valid_concentration`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    metals: Vec<String>,
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn new(metals: Vec<String>, samples: Vec<Sample>) -> Result<Self> {
        if metals.is_empty() {
            return Err(WaterMetalError::EmptyData(
                "dataset declares no metal columns".to_string(),
            ));
        }
        if samples.is_empty() {
            return Err(WaterMetalError::EmptyData("dataset has no samples".to_string()));
        }

        let mut seen_metals = HashSet::new();
        for metal in &metals {
            if !seen_metals.insert(metal.as_str()) {
                return Err(WaterMetalError::InvalidInput(format!(
                    "metal column '{}' is declared more than once",
                    metal
                )));
            }
        }

        let mut seen_ids = HashSet::new();
        let mut normalized = Vec::with_capacity(samples.len());
        for sample in samples {
            if sample.id.trim().is_empty() {
                return Err(WaterMetalError::InvalidInput(
                    "sample identifier is empty".to_string(),
                ));
            }
            if !seen_ids.insert(sample.id.clone()) {
                return Err(WaterMetalError::InvalidInput(format!(
                    "duplicate sample identifier '{}'",
                    sample.id
                )));
            }
            if let Some(extra) = sample
                .concentrations
                .keys()
                .find(|m| !seen_metals.contains(m.as_str()))
            {
                return Err(WaterMetalError::InvalidInput(format!(
                    "sample '{}' has undeclared metal '{}'",
                    sample.id, extra
                )));
            }

            let mut concentrations = IndexMap::with_capacity(metals.len());
            for metal in &metals {
                let value = sample.concentrations.get(metal).ok_or_else(|| {
                    WaterMetalError::InvalidInput(format!(
                        "sample '{}' has no entry for metal '{}'",
                        sample.id, metal
                    ))
                })?;
                concentrations.insert(metal.clone(), *value);
            }
            normalized.push(Sample {
                id: sample.id,
                concentrations,
            });
        }

        Ok(Self {
            metals,
            samples: normalized,
        })
    }

    pub fn metals(&self) -> &[String] {
        &self.metals
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All values of one metal column in sample order.
    pub fn column(&self, metal: &str) -> Option<Vec<Option<f64>>> {
        if !self.metals.iter().any(|m| m == metal) {
            return None;
        }
        Some(self.samples.iter().map(|s| s.concentration(metal)).collect())
    }

    /// Like [`Dataset::column`], with invalid readings masked as missing.
    pub fn valid_column(&self, metal: &str) -> Option<Vec<Option<f64>>> {
        let column = self.column(metal)?;
        Some(
            column
                .into_iter()
                .map(|v| v.filter(|&v| is_valid_concentration(v)))
                .collect(),
        )
    }

    /// Every present reading that fails [`is_valid_concentration`], in
    /// sample then column order.
    pub fn invalid_cells(&self) -> Vec<InvalidCell> {
        let mut cells = Vec::new();
        for sample in &self.samples {
            for (metal, value) in &sample.concentrations {
                if let Some(v) = *value {
                    if !is_valid_concentration(v) {
                        cells.push(InvalidCell {
                            sample_id: sample.id.clone(),
                            metal: metal.clone(),
                            value: v,
                        });
                    }
                }
            }
        }
        cells
    }
}

/// A present reading that no engine may use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidCell {
    pub sample_id: String,
    pub metal: String,
    pub value: f64,
}

/// Concentrations must be finite and non-negative. Zero is allowed.
pub fn is_valid_concentration(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
