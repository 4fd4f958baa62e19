//! Serializable per-run reports emitted by the aligner.

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct PyramidLevelDiagnostics {
    pub level: usize,
    pub width: usize,
    pub height: usize,
    pub tiles_x: usize,
    pub tiles_y: usize,
}

/// Timing and summary statistics for one alignment invocation.
#[derive(Clone, Debug, Serialize)]
pub struct AlignmentDiagnostics {
    pub input_width: usize,
    pub input_height: usize,
    pub pyramid_levels: Vec<PyramidLevelDiagnostics>,
    pub pyramid_build_ms: f64,
    pub block_matching_ms: f64,
    pub refinement_ms: f64,
    /// Mean (x, y) displacement over the finest-level map.
    pub mean_displacement: [f32; 2],
    pub total_latency_ms: f64,
}
