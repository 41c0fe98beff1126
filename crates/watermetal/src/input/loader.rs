//! Turns a parsed [`DataTable`] into a validated [`Dataset`].

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::source::DataTable;
use crate::dataset::{Dataset, Sample};
use crate::error::{Result, WaterMetalError};

/// Heavy metals and metalloids recognized as concentration columns.
const KNOWN_METALS: &[&str] = &[
    "Ag", "Al", "As", "Ba", "Be", "Bi", "Cd", "Co", "Cr", "Cu", "Fe", "Hg", "Mn", "Mo",
    "Ni", "Pb", "Sb", "Se", "Sn", "Sr", "Ti", "Tl", "U", "V", "Zn",
];

/// Normalized header names that mark the sample identifier column.
const ID_HEADERS: &[&str] = &[
    "sno", "sampleno", "sampleid", "sample", "id", "station", "stationid", "stationno",
    "site", "siteid", "location", "code",
];

/// `Pb`, `pb`, `Pb (mg/kg)`, `Pb_ppm`, `Pb [ug/L]`, `Pb mg/L`.
static METAL_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{1,2})(?:[\s_\-\(\[].*)?$").unwrap());

static KNOWN_METAL_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| KNOWN_METALS.iter().copied().collect());

/// Which columns hold identifiers and concentrations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Identifier column header (None = detect).
    pub id_column: Option<String>,
    /// Concentration column headers (None = detect known metal symbols).
    pub metal_columns: Option<Vec<String>>,
}

/// How the table was interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Header of the identifier column; None when ids were row numbers.
    pub id_column: Option<String>,
    /// `(header, metal)` pairs in column order.
    pub metal_columns: Vec<(String, String)>,
    /// Headers that were neither id nor metal.
    pub ignored_columns: Vec<String>,
    /// Cells reported below the detection limit, loaded as missing.
    pub below_detection_limit: usize,
}

/// Builds datasets from raw tables.
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader {
    config: LoaderConfig,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Interpret the table and validate it into a dataset.
    pub fn load(&self, table: &DataTable) -> Result<(Dataset, LoadReport)> {
        let metal_columns = self.resolve_metal_columns(table)?;
        if metal_columns.is_empty() {
            return Err(WaterMetalError::EmptyData(format!(
                "no metal concentration columns found among: {}",
                table.headers.join(", ")
            )));
        }
        let id_column = self.resolve_id_column(table, &metal_columns)?;

        let mut report = LoadReport {
            id_column: id_column.map(|i| table.headers[i].clone()),
            metal_columns: metal_columns
                .iter()
                .map(|(i, metal)| (table.headers[*i].clone(), metal.clone()))
                .collect(),
            ..LoadReport::default()
        };
        report.ignored_columns = table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != id_column && !metal_columns.iter().any(|(m, _)| m == i))
            .map(|(_, h)| h.clone())
            .collect();

        let mut samples = Vec::with_capacity(table.row_count());
        for (row_idx, row) in table.rows.iter().enumerate() {
            let id = match id_column {
                Some(col) => {
                    let raw = row.get(col).map(|s| s.trim()).unwrap_or("");
                    if DataTable::is_null_value(raw) {
                        return Err(WaterMetalError::Parse {
                            row: row_idx + 1,
                            column: col + 1,
                            message: "missing sample identifier".to_string(),
                        });
                    }
                    raw.to_string()
                }
                None => (row_idx + 1).to_string(),
            };

            let mut sample = Sample::new(id);
            for (col, metal) in &metal_columns {
                let raw = row.get(*col).map(|s| s.as_str()).unwrap_or("");
                let value = parse_concentration(raw, row_idx + 1, col + 1)?;
                match value {
                    Cell::Value(v) => sample = sample.with(metal.clone(), v),
                    Cell::Missing => sample = sample.with_missing(metal.clone()),
                    Cell::BelowDetection => {
                        report.below_detection_limit += 1;
                        sample = sample.with_missing(metal.clone());
                    }
                }
            }
            samples.push(sample);
        }

        if !report.ignored_columns.is_empty() {
            log::debug!("ignoring columns: {}", report.ignored_columns.join(", "));
        }
        if report.below_detection_limit > 0 {
            log::warn!(
                "{} cell(s) below detection limit loaded as missing",
                report.below_detection_limit
            );
        }

        let metals = metal_columns.into_iter().map(|(_, m)| m).collect();
        let dataset = Dataset::new(metals, samples)?;
        Ok((dataset, report))
    }

    fn resolve_metal_columns(&self, table: &DataTable) -> Result<Vec<(usize, String)>> {
        match &self.config.metal_columns {
            Some(names) => names
                .iter()
                .map(|name| {
                    let index = table.column_index(name).ok_or_else(|| {
                        WaterMetalError::Config(format!("metal column '{}' not found", name))
                    })?;
                    let metal = canonical_metal(name).unwrap_or_else(|| name.trim().to_string());
                    Ok((index, metal))
                })
                .collect(),
            None => Ok(table
                .headers
                .iter()
                .enumerate()
                .filter(|(i, _)| self.config.id_column.as_deref() != Some(table.headers[*i].trim()))
                .filter_map(|(i, h)| canonical_metal(h).map(|m| (i, m)))
                .collect()),
        }
    }

    fn resolve_id_column(
        &self,
        table: &DataTable,
        metal_columns: &[(usize, String)],
    ) -> Result<Option<usize>> {
        if let Some(name) = &self.config.id_column {
            return table
                .column_index(name)
                .map(Some)
                .ok_or_else(|| WaterMetalError::Config(format!("id column '{}' not found", name)));
        }

        let is_metal = |i: usize| metal_columns.iter().any(|(m, _)| *m == i);
        let by_name = table.headers.iter().enumerate().find(|(i, h)| {
            !is_metal(*i) && ID_HEADERS.contains(&normalize_header(h).as_str())
        });
        if let Some((i, _)) = by_name {
            return Ok(Some(i));
        }

        // First non-metal column, else row numbers.
        Ok((0..table.column_count()).find(|&i| !is_metal(i)))
    }
}

enum Cell {
    Value(f64),
    Missing,
    BelowDetection,
}

fn parse_concentration(raw: &str, row: usize, column: usize) -> Result<Cell> {
    let trimmed = raw.trim();
    if DataTable::is_null_value(trimmed) {
        return Ok(Cell::Missing);
    }
    if trimmed.starts_with('<')
        || trimmed.eq_ignore_ascii_case("nd")
        || trimmed.eq_ignore_ascii_case("bdl")
    {
        return Ok(Cell::BelowDetection);
    }
    trimmed
        .parse::<f64>()
        .map(Cell::Value)
        .map_err(|_| WaterMetalError::Parse {
            row,
            column,
            message: format!("'{}' is not a concentration", trimmed),
        })
}

/// Lowercase a header and drop everything but letters and digits.
fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Canonical element symbol for a concentration header, if it names a
/// known metal.
pub fn canonical_metal(header: &str) -> Option<String> {
    let caps = METAL_HEADER.captures(header.trim())?;
    let raw = caps.get(1)?.as_str();
    let mut chars = raw.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let symbol: String = std::iter::once(first)
        .chain(chars.map(|c| c.to_ascii_lowercase()))
        .collect();
    KNOWN_METAL_SET.contains(symbol.as_str()).then_some(symbol)
}
