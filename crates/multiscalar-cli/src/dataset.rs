//! Input datasets.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use multiscalar_core::CategoryMatrix;
use multiscalar_geometry::GeoPoint;
use serde::Deserialize;

/// One named category and its magnitude at every point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub name: String,
    pub values: Vec<f64>,
}

/// Coordinates as parallel columns plus the category magnitudes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dataset {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub categories: Vec<Category>,
}

impl Dataset {
    /// Read and parse a JSON dataset file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse a JSON dataset.
    pub fn from_json(text: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(text)?;
        if dataset.lat.len() != dataset.lon.len() {
            bail!(
                "coordinate columns differ in length: {} latitudes, {} longitudes",
                dataset.lat.len(),
                dataset.lon.len()
            );
        }
        Ok(dataset)
    }

    pub fn points(&self) -> Vec<GeoPoint> {
        GeoPoint::from_columns(&self.lat, &self.lon)
    }

    /// Validated magnitude matrix, categories in file order.
    pub fn matrix(&self) -> multiscalar_core::Result<CategoryMatrix> {
        CategoryMatrix::new(self.categories.iter().map(|c| c.values.clone()).collect())
    }

    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }
}
