use crate::aligner::AlignmentParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct FlowToolConfig {
    /// Reference frame path.
    pub reference: PathBuf,
    /// Frame aligned against the reference.
    pub alternate: PathBuf,
    #[serde(default)]
    pub alignment: AlignmentParams,
    pub output: FlowOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct FlowOutputConfig {
    /// Warped alternate frame.
    pub warped_image: PathBuf,
    /// JSON report with the displacement map and diagnostics.
    pub flow_json: PathBuf,
    /// Optional per-axis flow visualization PNGs.
    #[serde(default)]
    pub flow_x_image: Option<PathBuf>,
    #[serde(default)]
    pub flow_y_image: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<FlowToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
