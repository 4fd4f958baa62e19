//! Displacement-map upsampling across pyramid levels.

use crate::types::{Alignment, AlignmentMap};

/// Map a coarse-level displacement grid onto a finer `tiles_x × tiles_y`
/// grid. Each fine tile adopts its nearest coarse tile, repeated
/// `upsampling_factor / (tile_size / prev_tile_size)` times per axis, with
/// the displacement scaled by `upsampling_factor` (coarser pixels stand for
/// proportionally larger motion). Fine tiles beyond the coarse map's covered
/// extent start over at (0, 0) rather than extrapolating.
///
/// The repeat factor must be positive; [`super::BlockMatchingParams::validate`]
/// rejects configurations where it would vanish.
pub fn upsample_alignments(
    prev: &AlignmentMap,
    tiles_x: usize,
    tiles_y: usize,
    upsampling_factor: usize,
    tile_size: usize,
    prev_tile_size: usize,
) -> AlignmentMap {
    let repeat = upsampling_factor / (tile_size / prev_tile_size);
    debug_assert!(repeat >= 1, "upsampling repeat factor must be positive");

    let scale = upsampling_factor as f32;
    let mut up = AlignmentMap::new(tiles_x, tiles_y);
    for y in 0..tiles_y {
        for x in 0..tiles_x {
            if x >= repeat * prev.w || y >= repeat * prev.h {
                continue; // outside the coarse map's extent, stays (0, 0)
            }
            let coarse = prev.get(x / repeat, y / repeat);
            up.set(x, y, Alignment::new(coarse.x * scale, coarse.y * scale));
        }
    }
    up
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_and_repeats_coarse_tiles() {
        let mut coarse = AlignmentMap::new(2, 2);
        coarse.set(0, 0, Alignment::new(1.0, -1.0));
        coarse.set(1, 0, Alignment::new(2.0, 0.5));
        coarse.set(0, 1, Alignment::new(-0.5, 3.0));
        coarse.set(1, 1, Alignment::new(0.0, 0.0));

        // factor 2, equal tile sizes -> repeat 2, fine grid fully covered
        let fine = upsample_alignments(&coarse, 4, 4, 2, 16, 16);
        assert_eq!(fine.get(0, 0), Alignment::new(2.0, -2.0));
        assert_eq!(fine.get(1, 1), Alignment::new(2.0, -2.0));
        assert_eq!(fine.get(2, 0), Alignment::new(4.0, 1.0));
        assert_eq!(fine.get(0, 2), Alignment::new(-1.0, 6.0));
        assert_eq!(fine.get(3, 3), Alignment::new(0.0, 0.0));
    }

    #[test]
    fn uncovered_fine_tiles_stay_zero() {
        let mut coarse = AlignmentMap::new(1, 1);
        coarse.set(0, 0, Alignment::new(1.0, 1.0));

        // repeat 2 covers fine tiles [0, 2) per axis; the rest start at zero
        let fine = upsample_alignments(&coarse, 3, 3, 2, 16, 16);
        assert_eq!(fine.get(1, 1), Alignment::new(2.0, 2.0));
        assert_eq!(fine.get(2, 0), Alignment::new(0.0, 0.0));
        assert_eq!(fine.get(0, 2), Alignment::new(0.0, 0.0));
        assert_eq!(fine.get(2, 2), Alignment::new(0.0, 0.0));
    }

    #[test]
    fn halved_tile_size_divides_repeat() {
        let mut coarse = AlignmentMap::new(1, 1);
        coarse.set(0, 0, Alignment::new(1.0, 0.0));

        // factor 4 with tile ratio 16/8 -> repeat 2
        let fine = upsample_alignments(&coarse, 2, 2, 4, 16, 8);
        assert_eq!(fine.get(1, 1), Alignment::new(4.0, 0.0));
    }
}
