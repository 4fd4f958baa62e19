//! Exhaustive per-tile integer-shift search.

use super::DistanceMetric;
use crate::image::Image;
use crate::types::{Alignment, AlignmentMap};

/// Refine every tile of `map` by exhaustively scoring all integer shifts in
/// `[-search_radius, search_radius]²` around the tile's current displacement
/// and accumulating the best one.
///
/// A candidate whose alternate-image patch falls even partially outside the
/// image is discarded whole. The scan runs dy-outer/dx-inner from the
/// negative corner, and a strict `<` comparison keeps the first minimum
/// found, so equally good later candidates never replace an earlier one.
/// Because the best shift is *added* to the current displacement, repeated
/// calls compose.
pub fn local_search(
    ref_level: &Image,
    alt_level: &Image,
    tile_size: usize,
    search_radius: usize,
    metric: DistanceMetric,
    map: &mut AlignmentMap,
) {
    let width = map.w;

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        map.data
            .par_chunks_mut(width.max(1))
            .enumerate()
            .for_each(|(ty, row)| {
                for (tx, align) in row.iter_mut().enumerate() {
                    search_tile(
                        ref_level,
                        alt_level,
                        tile_size,
                        search_radius,
                        metric,
                        tx,
                        ty,
                        align,
                    );
                }
            });
    }

    #[cfg(not(feature = "parallel"))]
    for (ty, row) in map.data.chunks_mut(width.max(1)).enumerate() {
        for (tx, align) in row.iter_mut().enumerate() {
            search_tile(
                ref_level,
                alt_level,
                tile_size,
                search_radius,
                metric,
                tx,
                ty,
                align,
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn search_tile(
    ref_level: &Image,
    alt_level: &Image,
    tile_size: usize,
    search_radius: usize,
    metric: DistanceMetric,
    tx: usize,
    ty: usize,
    align: &mut Alignment,
) {
    let r = search_radius as i32;
    let current = *align;
    let mut min_dist = f32::INFINITY;
    let mut best = (0i32, 0i32);

    for dy in -r..=r {
        for dx in -r..=r {
            if let Some(dist) = patch_distance(
                ref_level, alt_level, tile_size, metric, tx, ty, &current, dx, dy,
            ) {
                if dist < min_dist {
                    min_dist = dist;
                    best = (dx, dy);
                }
            }
        }
    }

    align.x += best.0 as f32;
    align.y += best.1 as f32;
}

/// Aggregate distance between the reference tile and the alternate patch at
/// `current + (dx, dy)`, over all channels. `None` when the shifted patch
/// leaves the alternate image. The accumulated displacement is truncated
/// toward zero before being applied, keeping the candidate grid integral.
#[allow(clippy::too_many_arguments)]
fn patch_distance(
    ref_level: &Image,
    alt_level: &Image,
    tile_size: usize,
    metric: DistanceMetric,
    tx: usize,
    ty: usize,
    current: &Alignment,
    dx: i32,
    dy: i32,
) -> Option<f32> {
    let shift_x = (current.x + dx as f32) as i32;
    let shift_y = (current.y + dy as f32) as i32;
    let channels = ref_level.channels;
    let mut dist = 0.0f32;

    for y in 0..tile_size {
        let ref_y = ty * tile_size + y;
        let alt_y = ref_y as i32 + shift_y;
        if alt_y < 0 || alt_y >= alt_level.h as i32 {
            return None;
        }
        for x in 0..tile_size {
            let ref_x = tx * tile_size + x;
            let alt_x = ref_x as i32 + shift_x;
            if alt_x < 0 || alt_x >= alt_level.w as i32 {
                return None;
            }
            for c in 0..channels {
                let diff = ref_level.get(ref_x, ref_y, c)
                    - alt_level.get(alt_x as usize, alt_y as usize, c);
                match metric {
                    DistanceMetric::L1 => dist += diff.abs(),
                    DistanceMetric::L2 => dist += diff * diff,
                }
            }
        }
    }
    Some(dist)
}
