//! Multiscalar Analysis Runner
//!
//! Reads a point set with per-category magnitudes from JSON, runs the full
//! distortion analysis, optionally adds diagnostics for a random sample of
//! origins, and writes the result back as JSON.

pub mod dataset;
pub mod report;
pub mod settings;

pub use dataset::{Category, Dataset};
pub use report::Report;
pub use settings::RunSettings;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use multiscalar_core::Analyzer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

/// Analyse `dataset` under `settings`.
pub fn analyze(dataset: &Dataset, settings: &RunSettings) -> Result<Report> {
    let points = dataset.points();
    let matrix = dataset.matrix()?;
    let analyzer = Analyzer::new(&points, &matrix, settings.analysis.clone())?;

    let coefficients = analyzer.distortion_coefficients()?;

    let diagnostics = match settings.sample {
        Some(count) => {
            let mut rng = StdRng::seed_from_u64(settings.seed);
            let origins = analyzer.sample_origins(count, &mut rng)?;
            info!(sampled = origins.len(), seed = settings.seed, "sampled origins");
            Some(analyzer.partial_analysis(&origins)?)
        }
        None => None,
    };

    Ok(Report {
        categories: dataset.names(),
        thresholds: analyzer.thresholds().values().to_vec(),
        normalization_factor: coefficients.normalization_factor,
        raw: coefficients.raw,
        normalized: coefficients.normalized,
        diagnostics,
    })
}

/// Load `input`, analyse it and write the report to `output`.
pub fn run(input: &Path, output: &Path, settings: &RunSettings) -> Result<Report> {
    let dataset = Dataset::load(input)?;
    info!(
        points = dataset.lat.len(),
        categories = dataset.categories.len(),
        input = %input.display(),
        "dataset loaded"
    );

    let report = analyze(&dataset, settings)?;

    let json = serde_json::to_string(&report).context("serializing report")?;
    fs::write(output, json).with_context(|| format!("writing {}", output.display()))?;
    Ok(report)
}
