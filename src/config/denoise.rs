use crate::denoise::DenoisingParams;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct DenoiseToolConfig {
    /// Input path pattern; `{frame}` is replaced by the zero-padded frame
    /// index (e.g. `frames/frame_{frame}.png`).
    pub input_pattern: String,
    /// Output path pattern with the same `{frame}` placeholder.
    pub output_pattern: String,
    /// Number of frames to process, starting at index 0.
    pub num_frames: usize,
    /// Zero-padding width of the substituted index.
    #[serde(default = "default_index_width")]
    pub index_width: usize,
    #[serde(default)]
    pub denoise: DenoisingParams,
}

fn default_index_width() -> usize {
    4
}

/// Substitute `index` into a `{frame}` path pattern. Pure function of its
/// arguments; no state is retained between calls.
pub fn frame_path(pattern: &str, index: usize, index_width: usize) -> String {
    pattern.replace("{frame}", &format!("{index:0index_width$}"))
}

pub fn load_config(path: &Path) -> Result<DenoiseToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
