//! Temporal denoising driver.
//!
//! The driver keeps a sliding window of frames in a fixed-capacity ring
//! ([`FrameBuffer`]), aligns every neighbor of the window's center frame
//! against it, warps the neighbors onto the center's geometry and fuses the
//! stack with an unweighted temporal mean.

mod buffer;

pub use buffer::FrameBuffer;

use crate::aligner::{AlignmentParams, FrameAligner};
use crate::block_matching::BlockMatchingParams;
use crate::error::{AlignError, Result};
use crate::fuse::temporal_average;
use crate::ica::IcaParams;
use crate::image::Image;
use crate::warp::warp_image;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Driver configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoisingParams {
    /// Frames fused on each side of the center; the window spans
    /// `2 * temporal_radius + 1` frames.
    pub temporal_radius: usize,
    /// Estimated noise level of the source. Informational for now: the
    /// fusion computes an unweighted mean and does not consult it.
    pub noise_level: f32,
    /// Block-matching tile size.
    pub block_size: usize,
    /// Block-matching search radius.
    pub search_radius: usize,
}

impl Default for DenoisingParams {
    fn default() -> Self {
        Self {
            temporal_radius: 2,
            noise_level: 20.0,
            block_size: 16,
            search_radius: 16,
        }
    }
}

impl DenoisingParams {
    /// Window capacity implied by the temporal radius.
    pub fn window(&self) -> usize {
        2 * self.temporal_radius + 1
    }

    fn alignment_params(&self) -> AlignmentParams {
        AlignmentParams {
            block_matching: BlockMatchingParams::single_level(self.block_size, self.search_radius),
            ica: IcaParams {
                tile_size: self.block_size,
                ..IcaParams::default()
            },
        }
    }
}

/// Fuse the buffer's center frame with its aligned neighbors.
///
/// The buffer must be full and its capacity must accommodate the configured
/// window. Each neighbor is aligned to the center frame (block matching +
/// ICA on luma), warped with the refined map, and averaged with the center.
pub fn denoise_frame(buffer: &FrameBuffer, params: &DenoisingParams) -> Result<Image> {
    if params.window() > buffer.capacity() {
        return Err(AlignError::InvalidParameter(format!(
            "temporal window {} exceeds buffer capacity {}",
            params.window(),
            buffer.capacity()
        )));
    }
    if params.block_size == 0 || params.search_radius == 0 {
        return Err(AlignError::InvalidParameter(format!(
            "block size {} and search radius {} must be positive",
            params.block_size, params.search_radius
        )));
    }
    if !buffer.is_full() {
        return Err(AlignError::InvalidParameter(format!(
            "frame buffer holds {} of {} frames",
            buffer.len(),
            buffer.capacity()
        )));
    }

    let radius = params.temporal_radius as isize;
    let center = buffer
        .relative_to_center(params.temporal_radius, 0)
        .expect("full buffer has a center frame");

    let aligner = FrameAligner::new(center, params.alignment_params())?;

    let mut warped = Vec::with_capacity(2 * params.temporal_radius);
    for offset in -radius..=radius {
        if offset == 0 {
            continue;
        }
        let neighbor = buffer
            .relative_to_center(params.temporal_radius, offset)
            .expect("full buffer covers the temporal window");
        if !center.same_geometry(neighbor) {
            warn!("skipping neighbor at offset {offset}: geometry differs from center");
            continue;
        }
        let outcome = aligner.align(neighbor)?;
        debug!(
            "neighbor {offset:+}: mean displacement ({:.2}, {:.2})",
            outcome.diagnostics.mean_displacement[0], outcome.diagnostics.mean_displacement[1]
        );
        warped.push(warp_image(neighbor, &outcome.map)?);
    }

    let mut stack: Vec<&Image> = Vec::with_capacity(warped.len() + 1);
    stack.push(center);
    stack.extend(warped.iter());
    temporal_average(&stack)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_frames(buffer: &mut FrameBuffer, n: usize, w: usize, h: usize) {
        for i in 0..n {
            let mut img = Image::new(w, h, 1);
            img.set(0, 0, 0, i as f32);
            buffer.push(img);
        }
    }

    #[test]
    fn window_larger_than_capacity_is_rejected() {
        let mut buffer = FrameBuffer::new(3).unwrap();
        push_frames(&mut buffer, 3, 32, 32);
        let params = DenoisingParams {
            temporal_radius: 2,
            ..DenoisingParams::default()
        };
        assert!(denoise_frame(&buffer, &params).is_err());
    }

    #[test]
    fn partially_filled_buffer_is_rejected() {
        let mut buffer = FrameBuffer::new(5).unwrap();
        push_frames(&mut buffer, 3, 32, 32);
        assert!(denoise_frame(&buffer, &DenoisingParams::default()).is_err());
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let mut buffer = FrameBuffer::new(5).unwrap();
        push_frames(&mut buffer, 5, 32, 32);
        let params = DenoisingParams {
            block_size: 0,
            ..DenoisingParams::default()
        };
        assert!(denoise_frame(&buffer, &params).is_err());
    }
}
