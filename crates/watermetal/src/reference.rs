//! Per-metal reference constants used for risk scoring.
//!
//! A [`ReferenceTable`] maps each metal to its toxic-response coefficient
//! and background (pre-industrial) concentration. Tables are plain values
//! passed into every scoring call; the built-in defaults can be replaced by
//! a JSON file so new metals need no code change.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WaterMetalError};

/// Toxic-response coefficient and background concentration of one metal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetalReference {
    /// Toxic-response coefficient (Tr).
    pub toxic_response: f64,
    /// Background concentration, same unit as the measurements.
    pub background: f64,
}

impl MetalReference {
    /// Create a reference entry; both values must be positive and finite.
    pub fn new(toxic_response: f64, background: f64) -> Result<Self> {
        let reference = Self {
            toxic_response,
            background,
        };
        reference.validate("<unnamed>")?;
        Ok(reference)
    }

    pub(crate) fn validate(&self, metal: &str) -> Result<()> {
        if !(self.background.is_finite() && self.background > 0.0) {
            return Err(WaterMetalError::InvalidInput(format!(
                "background concentration for '{}' must be positive, got {}",
                metal, self.background
            )));
        }
        if !(self.toxic_response.is_finite() && self.toxic_response > 0.0) {
            return Err(WaterMetalError::InvalidInput(format!(
                "toxic-response coefficient for '{}' must be positive, got {}",
                metal, self.toxic_response
            )));
        }
        Ok(())
    }
}

/// Ordered metal → reference mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceTable {
    entries: IndexMap<String, MetalReference>,
}

impl ReferenceTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference values for common sediment metals (Fe, Mn, Cr, Cu, Ni, Co,
    /// Pb, Zn), backgrounds in mg/kg.
    pub fn standard() -> Self {
        const DEFAULTS: &[(&str, f64, f64)] = &[
            ("Fe", 1.0, 35000.0),
            ("Mn", 1.0, 600.0),
            ("Cr", 5.0, 90.0),
            ("Cu", 5.0, 45.0),
            ("Ni", 5.0, 50.0),
            ("Co", 5.0, 19.0),
            ("Pb", 10.0, 20.0),
            ("Zn", 1.0, 95.0),
        ];

        let entries = DEFAULTS
            .iter()
            .map(|&(metal, toxic_response, background)| {
                (
                    metal.to_string(),
                    MetalReference {
                        toxic_response,
                        background,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Load a table from a JSON object keyed by metal.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| WaterMetalError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Add or replace an entry.
    pub fn with(mut self, metal: impl Into<String>, reference: MetalReference) -> Self {
        self.entries.insert(metal.into(), reference);
        self
    }

    pub fn insert(&mut self, metal: impl Into<String>, reference: MetalReference) {
        self.entries.insert(metal.into(), reference);
    }

    pub fn get(&self, metal: &str) -> Option<&MetalReference> {
        self.entries.get(metal)
    }

    pub fn contains(&self, metal: &str) -> bool {
        self.entries.contains_key(metal)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetalReference)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check every entry has positive, finite values.
    pub fn validate(&self) -> Result<()> {
        self.entries
            .iter()
            .try_for_each(|(metal, reference)| reference.validate(metal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table() {
        let table = ReferenceTable::standard();
        assert_eq!(table.len(), 8);
        let pb = table.get("Pb").unwrap();
        assert_eq!(pb.background, 20.0);
        assert_eq!(pb.toxic_response, 10.0);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_from_json_preserves_order() {
        let json = r#"{
            "Pb": {"toxic_response": 5.0, "background": 20.0},
            "Cd": {"toxic_response": 30.0, "background": 1.0}
        }"#;
        let table = ReferenceTable::from_json_str(json).unwrap();
        let metals: Vec<&str> = table.iter().map(|(m, _)| m).collect();
        assert_eq!(metals, vec!["Pb", "Cd"]);
    }

    #[test]
    fn test_non_positive_background_rejected() {
        let json = r#"{"Pb": {"toxic_response": 5.0, "background": 0.0}}"#;
        let err = ReferenceTable::from_json_str(json).unwrap_err();
        assert!(matches!(err, WaterMetalError::InvalidInput(_)));

        assert!(MetalReference::new(5.0, -1.0).is_err());
        assert!(MetalReference::new(0.0, 1.0).is_err());
        assert!(MetalReference::new(5.0, 20.0).is_ok());
    }
}
