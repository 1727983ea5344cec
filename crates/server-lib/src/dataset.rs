//! Reference dataset statistics
//!
//! The reference CSV (the training dataset, minus any model state) is read
//! once at startup to derive the feature default table, the
//! numeric/categorical split, and the sale-price histogram used by the
//! insights endpoint. Nothing here is consulted again after startup.

use crate::models::FeatureValue;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

/// Bin count for the target histogram.
const HISTOGRAM_BINS: usize = 10;

/// Equal-width histogram over the prediction target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub counts: Vec<u64>,
    /// `counts.len() + 1` edges.
    pub bin_edges: Vec<f64>,
    pub centers: Vec<f64>,
}

impl Histogram {
    /// Build an equal-width histogram. Returns `None` for empty input.
    fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        // Degenerate single-value column: widen the range so every value
        // lands in a real bin.
        let (min, max) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };

        let width = (max - min) / bins as f64;
        let mut counts = vec![0u64; bins];
        for v in values {
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let bin_edges: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();
        let centers: Vec<f64> = (0..bins)
            .map(|i| min + width * (i as f64 + 0.5))
            .collect();

        Some(Self {
            counts,
            bin_edges,
            centers,
        })
    }
}

/// Startup-computed statistics over the reference dataset.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    /// Per-feature fallback values: median for numeric columns, mode for
    /// categorical. The prediction target has no entry, and neither do
    /// columns with no non-missing values.
    pub defaults: BTreeMap<String, FeatureValue>,
    /// Numeric columns in header order, target excluded.
    pub numerical_features: Vec<String>,
    /// String-valued columns in header order, target excluded.
    pub categorical_features: Vec<String>,
    pub target_histogram: Option<Histogram>,
    pub row_count: usize,
}

impl ReferenceData {
    /// Empty statistics, used when the reference file is unavailable so
    /// the service can still come up with diagnostic endpoints intact.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.row_count > 0
    }

    /// Read the reference CSV and compute all derived statistics.
    ///
    /// Cells that are empty or the literal `NA` count as missing. A column
    /// is numeric when every non-missing cell parses as a float.
    pub fn load(path: &Path, target_column: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open reference dataset {}", path.display()))?;

        let headers: Vec<String> = reader
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        // Column-major cells, missing values as None.
        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        let mut row_count = 0usize;
        for record in reader.records() {
            let record = record.context("Failed to read CSV record")?;
            row_count += 1;
            for (idx, column) in columns.iter_mut().enumerate() {
                let cell = record.get(idx).unwrap_or("");
                if cell.is_empty() || cell == "NA" {
                    column.push(None);
                } else {
                    column.push(Some(cell.to_string()));
                }
            }
        }

        let mut data = ReferenceData {
            row_count,
            ..Default::default()
        };

        for (header, column) in headers.iter().zip(&columns) {
            let present: Vec<&str> = column.iter().flatten().map(String::as_str).collect();

            if header == target_column {
                let values: Vec<f64> = present.iter().filter_map(|v| v.parse().ok()).collect();
                data.target_histogram = Histogram::from_values(&values, HISTOGRAM_BINS);
                continue;
            }

            if present.is_empty() {
                // Entirely-missing column: no default can be computed,
                // resolution falls through to the zero fallback.
                warn!(column = %header, "Reference column has no values, no default");
                continue;
            }

            let numeric: Option<Vec<f64>> = present.iter().map(|v| v.parse().ok()).collect();
            match numeric {
                Some(mut values) => {
                    data.numerical_features.push(header.clone());
                    data.defaults
                        .insert(header.clone(), FeatureValue::Number(median(&mut values)));
                }
                None => {
                    data.categorical_features.push(header.clone());
                    data.defaults
                        .insert(header.clone(), FeatureValue::Text(mode(&present)));
                }
            }
        }

        info!(
            rows = data.row_count,
            numerical = data.numerical_features.len(),
            categorical = data.categorical_features.len(),
            "Reference dataset loaded"
        );

        Ok(data)
    }
}

/// Median with interpolation between the two middle values.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Most frequent value; ties resolve to the value encountered first.
fn mode(values: &[&str]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let max_count = counts.values().copied().max().unwrap_or(0);
    values
        .iter()
        .find(|v| counts[*v] == max_count)
        .unwrap_or(&"")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn median_interpolates_even_counts() {
        let mut odd = vec![3.0, 1.0, 2.0];
        assert_eq!(median(&mut odd), 2.0);

        let mut even = vec![4.0, 1.0, 2.0, 3.0];
        assert_eq!(median(&mut even), 2.5);
    }

    #[test]
    fn mode_ties_break_on_first_encountered() {
        assert_eq!(mode(&["b", "a", "a", "b"]), "b");
        assert_eq!(mode(&["x"]), "x");
    }

    #[test]
    fn defaults_cover_all_columns_except_target() {
        let file = write_csv(
            "LotArea,Neighborhood,SalePrice\n\
             8000,NAmes,150000\n\
             9000,CollgCr,180000\n\
             10000,NAmes,200000\n",
        );
        let data = ReferenceData::load(file.path(), "SalePrice").unwrap();

        assert_eq!(data.row_count, 3);
        assert_eq!(
            data.defaults.get("LotArea"),
            Some(&FeatureValue::Number(9000.0))
        );
        assert_eq!(
            data.defaults.get("Neighborhood"),
            Some(&FeatureValue::Text("NAmes".to_string()))
        );
        assert!(!data.defaults.contains_key("SalePrice"));
        assert_eq!(data.numerical_features, vec!["LotArea"]);
        assert_eq!(data.categorical_features, vec!["Neighborhood"]);
    }

    #[test]
    fn missing_cells_are_excluded_from_statistics() {
        let file = write_csv(
            "LotArea,YearBuilt,SalePrice\n\
             8000,NA,150000\n\
             ,2000,180000\n\
             10000,2010,200000\n",
        );
        let data = ReferenceData::load(file.path(), "SalePrice").unwrap();

        assert_eq!(
            data.defaults.get("LotArea"),
            Some(&FeatureValue::Number(9000.0))
        );
        assert_eq!(
            data.defaults.get("YearBuilt"),
            Some(&FeatureValue::Number(2005.0))
        );
    }

    #[test]
    fn entirely_missing_column_has_no_default() {
        let file = write_csv(
            "LotArea,PoolQC,SalePrice\n\
             8000,NA,150000\n\
             9000,NA,180000\n",
        );
        let data = ReferenceData::load(file.path(), "SalePrice").unwrap();

        assert!(!data.defaults.contains_key("PoolQC"));
        assert!(!data.numerical_features.contains(&"PoolQC".to_string()));
        assert!(!data.categorical_features.contains(&"PoolQC".to_string()));
    }

    #[test]
    fn target_histogram_has_consistent_shape() {
        let file = write_csv(
            "LotArea,SalePrice\n\
             8000,100000\n\
             9000,150000\n\
             10000,200000\n\
             11000,250000\n",
        );
        let data = ReferenceData::load(file.path(), "SalePrice").unwrap();

        let hist = data.target_histogram.unwrap();
        assert_eq!(hist.counts.len(), HISTOGRAM_BINS);
        assert_eq!(hist.bin_edges.len(), HISTOGRAM_BINS + 1);
        assert_eq!(hist.centers.len(), HISTOGRAM_BINS);
        assert_eq!(hist.counts.iter().sum::<u64>(), 4);
        assert_eq!(hist.bin_edges[0], 100000.0);
        assert_eq!(hist.bin_edges[HISTOGRAM_BINS], 250000.0);
    }

    #[test]
    fn histogram_absent_without_target_column() {
        let file = write_csv("LotArea\n8000\n9000\n");
        let data = ReferenceData::load(file.path(), "SalePrice").unwrap();
        assert!(data.target_histogram.is_none());
    }

    #[test]
    fn load_fails_on_missing_file() {
        assert!(ReferenceData::load(Path::new("/nonexistent/train.csv"), "SalePrice").is_err());
    }
}
