//! Iterative gradient-based (Lucas-Kanade-style) alignment refinement.
//!
//! The refiner improves a block-matching displacement map to sub-pixel
//! precision: per tile it solves the 2×2 normal equations formed by the
//! reference image's gradient structure ([`hessian`]) against the
//! photometric residual sampled from the alternate image, and accumulates
//! the Gauss-Newton step over a fixed number of iterations.
//!
//! All of this module operates on single-channel images; the
//! [`crate::aligner::FrameAligner`] facade feeds the luma plane.

pub mod gradients;
pub mod hessian;
pub mod refine;

pub use gradients::{compute_gradients, ImageGradients};
pub use hessian::{compute_hessian, HessianGrid};
pub use refine::{refine_alignment, solve_2x2};

use serde::{Deserialize, Serialize};

/// Refinement configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IcaParams {
    /// Gaussian pre-blur sigma applied before gradient computation;
    /// 0 disables the blur.
    pub sigma_blur: f32,
    /// Fixed number of Gauss-Newton iterations; there is no residual-based
    /// early exit.
    pub iterations: usize,
    /// Square patch edge in pixels; must match the tile grid of the map
    /// being refined.
    pub tile_size: usize,
}

impl Default for IcaParams {
    fn default() -> Self {
        Self {
            sigma_blur: 0.0,
            iterations: 3,
            tile_size: 16,
        }
    }
}
