//! Pairwise Pearson correlation between metal columns.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// Symmetric metal × metal correlation matrix.
///
/// Undefined cells (fewer than two complete pairs, or a constant column)
/// hold NaN and serialize as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub metals: Vec<String>,
    #[serde(with = "nan_as_null")]
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlation between two metals; `None` if either is not a column.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.metals.iter().position(|m| m == a)?;
        let j = self.metals.iter().position(|m| m == b)?;
        Some(self.values[i][j])
    }

    pub fn len(&self) -> usize {
        self.metals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metals.is_empty()
    }

    /// Defined off-diagonal pairs with |r| ≥ `min_abs`, strongest first.
    pub fn strong_pairs(&self, min_abs: f64) -> Vec<(String, String, f64)> {
        let mut pairs = Vec::new();
        for i in 0..self.metals.len() {
            for j in (i + 1)..self.metals.len() {
                let r = self.values[i][j];
                if r.is_finite() && r.abs() >= min_abs {
                    pairs.push((self.metals[i].clone(), self.metals[j].clone(), r));
                }
            }
        }
        pairs.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));
        pairs
    }
}

/// Correlation matrix over every metal column of the dataset. Negative or
/// non-finite readings count as missing.
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let metals = dataset.metals().to_vec();
    let columns: Vec<Vec<Option<f64>>> = metals
        .iter()
        .map(|m| dataset.valid_column(m).unwrap_or_default())
        .collect();

    let n = metals.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        let present: Vec<f64> = columns[i].iter().flatten().copied().collect();
        values[i][i] = if present.len() >= 2 && !is_constant(&present) {
            1.0
        } else {
            f64::NAN
        };
        for j in (i + 1)..n {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix { metals, values }
}

/// Pearson correlation over the positions where both values are present.
///
/// Returns NaN when fewer than two complete pairs exist or either side is
/// constant over those pairs.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();

    if xs.len() < 2 || is_constant(&xs) || is_constant(&ys) {
        return f64::NAN;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in xs.iter().zip(&ys) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// True when all values are identical (or there are none).
pub(crate) fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(
        values: &Vec<Vec<f64>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let rows: Vec<Vec<Option<f64>>> = values
            .iter()
            .map(|row| row.iter().map(|v| v.is_finite().then_some(*v)).collect())
            .collect();
        rows.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<f64>>, D::Error> {
        let rows: Vec<Vec<Option<f64>>> = Vec::deserialize(deserializer)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect())
    }
}
