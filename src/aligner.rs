//! High-level per-reference alignment facade.
//!
//! [`FrameAligner`] precomputes everything that depends only on the
//! reference frame (luma pyramid, gradients, per-patch Hessians) so that a
//! burst of alternate frames can be aligned against it without redundant
//! work. Each [`FrameAligner::align`] call runs coarse-to-fine block
//! matching followed by ICA refinement on the finest level and reports
//! per-stage timings.

use crate::block_matching::{self, BlockMatchingParams};
use crate::diagnostics::{AlignmentDiagnostics, PyramidLevelDiagnostics};
use crate::error::{AlignError, Result};
use crate::ica::{self, HessianGrid, IcaParams, ImageGradients};
use crate::image::Image;
use crate::pyramid::Pyramid;
use crate::types::AlignmentMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Combined configuration for the full alignment pipeline.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentParams {
    pub block_matching: BlockMatchingParams,
    pub ica: IcaParams,
}

/// Result of aligning one alternate frame.
#[derive(Clone, Debug)]
pub struct AlignOutcome {
    /// Refined finest-level displacement map.
    pub map: AlignmentMap,
    pub diagnostics: AlignmentDiagnostics,
}

/// Reference-side alignment state, reusable across alternate frames.
pub struct FrameAligner {
    params: AlignmentParams,
    ref_pyramid: Pyramid,
    gradients: ImageGradients,
    hessian: HessianGrid,
}

impl FrameAligner {
    /// Build the reference pyramid, gradients and Hessian grid.
    ///
    /// Multi-channel references are collapsed to luma; the ICA tile size
    /// must match the finest block-matching tile size so that both stages
    /// address the same tile grid.
    pub fn new(reference: &Image, params: AlignmentParams) -> Result<Self> {
        params.block_matching.validate()?;
        if params.ica.tile_size != params.block_matching.levels[0].tile_size {
            return Err(AlignError::InvalidParameter(format!(
                "ica tile size {} must match the finest block-matching tile size {}",
                params.ica.tile_size, params.block_matching.levels[0].tile_size
            )));
        }

        let luma = reference.luma();
        let ref_pyramid = Pyramid::build(&luma, &params.block_matching.factors())?;
        let finest = &ref_pyramid.levels[0];
        let gradients = ica::compute_gradients(finest, params.ica.sigma_blur)?;
        let hessian = ica::compute_hessian(&gradients, params.ica.tile_size)?;

        Ok(Self {
            params,
            ref_pyramid,
            gradients,
            hessian,
        })
    }

    /// The reference pyramid's finest level (the ICA reference image).
    pub fn reference_level(&self) -> &Image {
        &self.ref_pyramid.levels[0]
    }

    /// Align `alt` against the reference: block matching coarsest→finest,
    /// then ICA refinement of the finest map.
    pub fn align(&self, alt: &Image) -> Result<AlignOutcome> {
        let t_total = Instant::now();
        let alt_luma = alt.luma();

        let t_pyr = Instant::now();
        let alt_pyramid = Pyramid::build(&alt_luma, &self.params.block_matching.factors())?;
        let pyramid_build_ms = t_pyr.elapsed().as_secs_f64() * 1000.0;

        let t_bm = Instant::now();
        let coarse_map =
            block_matching::align_pyramids(&self.ref_pyramid, &alt_pyramid, &self.params.block_matching)?;
        let block_matching_ms = t_bm.elapsed().as_secs_f64() * 1000.0;

        let t_ica = Instant::now();
        let map = ica::refine_alignment(
            &self.ref_pyramid.levels[0],
            &alt_pyramid.levels[0],
            &self.gradients,
            &self.hessian,
            &coarse_map,
            &self.params.ica,
        )?;
        let refinement_ms = t_ica.elapsed().as_secs_f64() * 1000.0;

        let mean_displacement = map.mean_displacement();
        debug!(
            "aligned frame: {}x{} tiles, mean displacement ({:.3}, {:.3})",
            map.w, map.h, mean_displacement[0], mean_displacement[1]
        );

        let pyramid_levels = self
            .ref_pyramid
            .levels
            .iter()
            .zip(&self.params.block_matching.levels)
            .enumerate()
            .map(|(level, (img, lp))| PyramidLevelDiagnostics {
                level,
                width: img.w,
                height: img.h,
                tiles_x: img.w / lp.tile_size,
                tiles_y: img.h / lp.tile_size,
            })
            .collect();

        let diagnostics = AlignmentDiagnostics {
            input_width: alt.w,
            input_height: alt.h,
            pyramid_levels,
            pyramid_build_ms,
            block_matching_ms,
            refinement_ms,
            mean_displacement,
            total_latency_ms: t_total.elapsed().as_secs_f64() * 1000.0,
        };

        Ok(AlignOutcome { map, diagnostics })
    }
}
