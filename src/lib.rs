#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod aligner;
pub mod denoise;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod types;

// Pipeline stages — public, but considered unstable internals.
pub mod block_matching;
pub mod config;
pub mod fuse;
pub mod ica;
pub mod pyramid;
pub mod warp;

// --- High-level re-exports -------------------------------------------------

// Main entry points: aligner facade + denoising driver.
pub use crate::aligner::{AlignOutcome, AlignmentParams, FrameAligner};
pub use crate::denoise::{denoise_frame, DenoisingParams, FrameBuffer};
pub use crate::error::{AlignError, Result};
pub use crate::image::Image;
pub use crate::types::{Alignment, AlignmentMap};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use burst_align::prelude::*;
///
/// let reference = Image::new(64, 64, 1);
/// let alternate = Image::new(64, 64, 1);
///
/// let aligner = FrameAligner::new(&reference, AlignmentParams::default())
///     .expect("valid default parameters");
/// let outcome = aligner.align(&alternate).expect("same geometry");
/// println!(
///     "mean displacement ({:.2}, {:.2}) in {:.3} ms",
///     outcome.diagnostics.mean_displacement[0],
///     outcome.diagnostics.mean_displacement[1],
///     outcome.diagnostics.total_latency_ms,
/// );
/// ```
pub mod prelude {
    pub use crate::image::Image;
    pub use crate::{AlignmentMap, AlignmentParams, FrameAligner};
}
