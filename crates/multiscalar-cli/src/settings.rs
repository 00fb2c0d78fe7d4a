//! Run settings: an optional JSON analysis config plus environment overrides.
//!
//! | variable             | meaning                                  |
//! |----------------------|------------------------------------------|
//! | `MULTISCALAR_SAMPLE` | origins to sample for diagnostics        |
//! | `MULTISCALAR_SEED`   | seed for that sample (default 0)         |

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use multiscalar_core::AnalysisConfig;

/// Seed used when `MULTISCALAR_SEED` is unset.
pub const DEFAULT_SEED: u64 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub analysis: AnalysisConfig,
    /// Number of origins to run the partial analysis on
    pub sample: Option<usize>,
    pub seed: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            sample: None,
            seed: DEFAULT_SEED,
        }
    }
}

impl RunSettings {
    /// Read the config file, if any, then apply environment variables.
    pub fn load(config: Option<&Path>) -> Result<Self> {
        let analysis = match config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => AnalysisConfig::default(),
        };

        Self::from_vars(
            analysis,
            std::env::var("MULTISCALAR_SAMPLE").ok(),
            std::env::var("MULTISCALAR_SEED").ok(),
        )
    }

    /// Build from raw variable values.
    pub fn from_vars(
        analysis: AnalysisConfig,
        sample: Option<String>,
        seed: Option<String>,
    ) -> Result<Self> {
        let sample = sample
            .map(|s| s.trim().parse().with_context(|| format!("invalid MULTISCALAR_SAMPLE {:?}", s)))
            .transpose()?;
        let seed = seed
            .map(|s| s.trim().parse().with_context(|| format!("invalid MULTISCALAR_SEED {:?}", s)))
            .transpose()?
            .unwrap_or(DEFAULT_SEED);

        Ok(Self {
            analysis,
            sample,
            seed,
        })
    }
}
