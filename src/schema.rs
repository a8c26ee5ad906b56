use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compare::ComparisonReport;
use crate::error::ReportError;
use crate::harness::ClockResolution;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub seed: u64,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
    pub clock: ClockResolution,
    pub warmup_trials: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub run: RunMeta,
    pub comparisons: Vec<ComparisonReport>,
}

impl BenchReport {
    /// Whether every comparison produced identical generic and specialized output.
    pub fn all_outputs_match(&self) -> bool {
        self.comparisons.iter().all(|c| c.outputs_match)
    }

    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
