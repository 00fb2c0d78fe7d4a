//! Output reports.

use multiscalar_core::PartialAnalysis;
use serde::Serialize;

/// Everything one run writes out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Category names, in input order
    pub categories: Vec<String>,
    pub thresholds: Vec<f64>,
    pub normalization_factor: f64,
    /// Envelope-path coefficient per point
    pub raw: Vec<f64>,
    /// `raw / normalization_factor` per point
    pub normalized: Vec<f64>,
    /// Ragged diagnostics for sampled origins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<PartialAnalysis>,
}
