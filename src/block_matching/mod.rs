//! Coarse-to-fine exhaustive block matching.
//!
//! Each pyramid level carries its own `{factor, tile_size, search_radius,
//! metric}` tuple (index 0 = finest level). Alignment runs coarsest→finest:
//! the coarsest level starts from an all-zero displacement map, every finer
//! level starts from the previous level's map upsampled onto its tile grid,
//! and each level runs an exhaustive integer-shift search around the current
//! per-tile displacement. Displacements stay integer-valued here; sub-pixel
//! precision comes from the ICA refiner.

mod search;
mod upsample;

pub use search::local_search;
pub use upsample::upsample_alignments;

use crate::error::{AlignError, Result};
use crate::image::Image;
use crate::pyramid::Pyramid;
use crate::types::AlignmentMap;
use serde::{Deserialize, Serialize};

/// Patch distance metric used by the exhaustive search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Sum of absolute differences.
    L1,
    /// Sum of squared differences.
    L2,
}

/// Search configuration for one pyramid level.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LevelParams {
    /// Downsample factor applied when building this level from its
    /// predecessor (factor 1 for the finest level keeps full resolution).
    pub factor: usize,
    /// Square tile edge in pixels at this level.
    pub tile_size: usize,
    /// Half-width of the exhaustive search window.
    pub search_radius: usize,
    /// Patch distance metric for this level.
    pub metric: DistanceMetric,
}

/// Per-level block-matching configuration, index 0 = finest level.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockMatchingParams {
    pub levels: Vec<LevelParams>,
}

impl Default for BlockMatchingParams {
    /// Four-level defaults used by the burst pipeline: L1 on the finest
    /// level with a tight radius, L2 with wider radii above it, and a
    /// halved tile on the coarsest level.
    fn default() -> Self {
        Self {
            levels: vec![
                LevelParams {
                    factor: 1,
                    tile_size: 16,
                    search_radius: 1,
                    metric: DistanceMetric::L1,
                },
                LevelParams {
                    factor: 2,
                    tile_size: 16,
                    search_radius: 4,
                    metric: DistanceMetric::L2,
                },
                LevelParams {
                    factor: 4,
                    tile_size: 16,
                    search_radius: 4,
                    metric: DistanceMetric::L2,
                },
                LevelParams {
                    factor: 4,
                    tile_size: 8,
                    search_radius: 4,
                    metric: DistanceMetric::L2,
                },
            ],
        }
    }
}

impl BlockMatchingParams {
    /// Single-level configuration (factor 1, L2), as used by the temporal
    /// denoising driver.
    pub fn single_level(tile_size: usize, search_radius: usize) -> Self {
        Self {
            levels: vec![LevelParams {
                factor: 1,
                tile_size,
                search_radius,
                metric: DistanceMetric::L2,
            }],
        }
    }

    /// Reject configurations the search cannot run on. Checked once at the
    /// entry points; the per-level loops rely on it.
    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(AlignError::InvalidParameter(
                "block matching requires at least one level".into(),
            ));
        }
        for (i, level) in self.levels.iter().enumerate() {
            if level.factor == 0 {
                return Err(AlignError::InvalidParameter(format!(
                    "level {i}: downsample factor must be positive"
                )));
            }
            if level.tile_size == 0 {
                return Err(AlignError::InvalidParameter(format!(
                    "level {i}: tile size must be positive"
                )));
            }
            if level.search_radius == 0 {
                return Err(AlignError::InvalidParameter(format!(
                    "level {i}: search radius must be positive"
                )));
            }
        }
        // Upsampling repeats each coarse tile factor/(tile ratio) times; a
        // zero repeat count cannot cover the finer grid.
        for i in 0..self.levels.len() - 1 {
            let tile = self.levels[i].tile_size;
            let prev_tile = self.levels[i + 1].tile_size;
            let ratio = tile / prev_tile;
            if ratio == 0 || self.levels[i].factor / ratio == 0 {
                return Err(AlignError::InvalidParameter(format!(
                    "level {i}: upsampling repeat factor vanishes \
                     (factor {}, tile {} -> {})",
                    self.levels[i].factor, prev_tile, tile
                )));
            }
        }
        Ok(())
    }

    /// Downsample factors in finest→coarsest order, as consumed by
    /// [`Pyramid::build`].
    pub fn factors(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.factor).collect()
    }
}

/// Build the reference pyramid for repeated alignment against one frame.
pub fn build_reference_pyramid(reference: &Image, params: &BlockMatchingParams) -> Result<Pyramid> {
    params.validate()?;
    Pyramid::build(reference, &params.factors())
}

/// Align `alt` against a prebuilt reference pyramid, building the alternate
/// pyramid internally. Returns the finest-level displacement map.
pub fn align_frame(
    alt: &Image,
    ref_pyramid: &Pyramid,
    params: &BlockMatchingParams,
) -> Result<AlignmentMap> {
    params.validate()?;
    let alt_pyramid = Pyramid::build(alt, &params.factors())?;
    align_pyramids(ref_pyramid, &alt_pyramid, params)
}

/// Align two prebuilt pyramids level by level, coarsest first.
pub fn align_pyramids(
    ref_pyramid: &Pyramid,
    alt_pyramid: &Pyramid,
    params: &BlockMatchingParams,
) -> Result<AlignmentMap> {
    params.validate()?;
    let n = params.levels.len();
    if ref_pyramid.levels.len() != n || alt_pyramid.levels.len() != n {
        return Err(AlignError::InvalidParameter(format!(
            "pyramid depth ({}/{}) does not match the {} configured levels",
            ref_pyramid.levels.len(),
            alt_pyramid.levels.len(),
            n
        )));
    }
    for (r, a) in ref_pyramid.levels.iter().zip(&alt_pyramid.levels) {
        if r.channels != a.channels {
            return Err(AlignError::DimensionMismatch {
                expected_w: r.w,
                expected_h: r.h,
                expected_c: r.channels,
                got_w: a.w,
                got_h: a.h,
                got_c: a.channels,
            });
        }
    }

    let mut map: Option<AlignmentMap> = None;
    for level in (0..n).rev() {
        let next = align_on_level(
            &ref_pyramid.levels[level],
            &alt_pyramid.levels[level],
            params,
            level,
            map.as_ref(),
        );
        map = Some(next);
    }
    Ok(map.expect("at least one level was processed"))
}

/// Produce the displacement map for one level: zero-initialized at the
/// coarsest level, upsampled from the previous level otherwise, then locally
/// refined by the exhaustive search.
fn align_on_level(
    ref_level: &Image,
    alt_level: &Image,
    params: &BlockMatchingParams,
    level_idx: usize,
    prev: Option<&AlignmentMap>,
) -> AlignmentMap {
    let level = params.levels[level_idx];
    let tiles_x = ref_level.w / level.tile_size;
    let tiles_y = ref_level.h / level.tile_size;

    let mut map = match prev {
        None => AlignmentMap::new(tiles_x, tiles_y),
        Some(prev) => {
            let prev_tile = params.levels[level_idx + 1].tile_size;
            upsample_alignments(prev, tiles_x, tiles_y, level.factor, level.tile_size, prev_tile)
        }
    };

    local_search(
        ref_level,
        alt_level,
        level.tile_size,
        level.search_radius,
        level.metric,
        &mut map,
    );
    map
}
