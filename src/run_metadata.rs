//! Run-level setup and teardown around a test run.
//!
//! Setup records who ran the suite against which environment; teardown
//! prunes stale artifacts left by previous runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EnvOverrides;
use crate::error::Result;

/// Directory, relative to the working directory, holding run outputs.
pub const OUTPUT_DIR: &str = "test-output";

/// Name of the metadata file written into the output directory.
pub const METADATA_FILE: &str = "environment.json";

/// Artifacts older than this are removed by [`prune_artifacts`].
pub const DEFAULT_ARTIFACT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub tester: String,
    pub environment: String,
    pub platform: String,
    pub timestamp: String,
}

impl RunMetadata {
    pub fn capture(overrides: &EnvOverrides) -> Self {
        Self {
            tester: overrides
                .tester
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            environment: overrides.environment_name().to_uppercase(),
            platform: std::env::consts::OS.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Writes `environment.json` into `output_dir`, creating it if needed.
    pub fn write_to(&self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(METADATA_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!("Environment metadata written to {:?}", path);
        Ok(path)
    }
}

/// Removes entries of `artifacts_dir` last modified more than `max_age` ago.
///
/// A missing directory is not an error. An entry that cannot be inspected or
/// removed is logged and skipped. Returns the removed paths.
pub fn prune_artifacts(artifacts_dir: &Path, max_age: Duration) -> Result<Vec<PathBuf>> {
    if !artifacts_dir.exists() {
        info!("Artifacts directory {:?} does not exist, skipping cleanup", artifacts_dir);
        return Ok(Vec::new());
    }

    let now = SystemTime::now();
    let mut removed = Vec::new();
    for entry in fs::read_dir(artifacts_dir)? {
        let path = entry?.path();
        match remove_if_stale(&path, now, max_age) {
            Ok(true) => {
                info!("Deleted old artifact {:?}", path);
                removed.push(path);
            }
            Ok(false) => {}
            Err(e) => warn!("Failed to delete {:?}: {}", path, e),
        }
    }
    Ok(removed)
}

fn remove_if_stale(path: &Path, now: SystemTime, max_age: Duration) -> std::io::Result<bool> {
    let metadata = fs::metadata(path)?;
    let age = now
        .duration_since(metadata.modified()?)
        .unwrap_or(Duration::ZERO);
    if age <= max_age {
        return Ok(false);
    }

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}
