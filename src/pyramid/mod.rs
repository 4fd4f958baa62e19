//! Multi-resolution image pyramid built by cascaded box-filter downsampling.
//!
//! Purpose
//! - Build a coarse-to-fine representation so large motion is searched on
//!   small images and refined on progressively finer ones.
//!
//! Design
//! - Level 0 applies the first downsample factor to the input (factor 1 is
//!   an exact copy), and every subsequent level is built from its immediate
//!   predecessor, not from the original by a cumulative factor.
//! - Downsampling averages non-overlapping `factor × factor` blocks per
//!   channel; remainder rows/columns that do not fill a block are dropped
//!   (truncating division of the dimensions).
//!
//! Complexity
//! - Per level O(W·H·C); memory is the sum of all levels.
use crate::error::{AlignError, Result};
use crate::image::Image;

/// Ordered image cascade, index 0 = finest, last = coarsest.
#[derive(Clone, Debug, Default)]
pub struct Pyramid {
    pub levels: Vec<Image>,
}

impl Pyramid {
    /// Build a pyramid from `base` using one downsample factor per level.
    ///
    /// Rejects an empty factor list and any factor of zero.
    pub fn build(base: &Image, factors: &[usize]) -> Result<Pyramid> {
        if factors.is_empty() {
            return Err(AlignError::InvalidParameter(
                "pyramid requires at least one downsample factor".into(),
            ));
        }
        if let Some(pos) = factors.iter().position(|&f| f == 0) {
            return Err(AlignError::InvalidParameter(format!(
                "pyramid factor at level {pos} must be positive"
            )));
        }

        let mut levels = Vec::with_capacity(factors.len());
        levels.push(downsample(base, factors[0]));
        for &factor in &factors[1..] {
            let prev = levels.last().expect("previous level available");
            let next = downsample(prev, factor);
            levels.push(next);
        }
        Ok(Pyramid { levels })
    }
}

/// Box-filter downsample by an integer factor; factor 1 is an exact copy.
fn downsample(img: &Image, factor: usize) -> Image {
    debug_assert!(factor >= 1);
    if factor == 1 {
        return img.clone();
    }

    let nw = img.w / factor;
    let nh = img.h / factor;
    let mut down = Image::new(nw, nh, img.channels);
    let norm = 1.0 / (factor * factor) as f32;

    for y in 0..nh {
        for x in 0..nw {
            for c in 0..img.channels {
                let mut sum = 0.0f32;
                for ky in 0..factor {
                    let sy = y * factor + ky;
                    for kx in 0..factor {
                        let sx = x * factor + kx;
                        sum += img.get(sx, sy, c);
                    }
                }
                down.set(x, y, c, sum * norm);
            }
        }
    }
    down
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_image(w: usize, h: usize) -> Image {
        let mut img = Image::new(w, h, 1);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, 0, (y * w + x) as f32);
            }
        }
        img
    }

    #[test]
    fn factor_one_is_identity() {
        let img = ramp_image(7, 5);
        let pyr = Pyramid::build(&img, &[1]).unwrap();
        assert_eq!(pyr.levels.len(), 1);
        assert_eq!(pyr.levels[0].data, img.data);
    }

    #[test]
    fn constant_image_stays_constant() {
        let img = Image::from_raw(12, 9, 1, vec![0.42; 12 * 9]);
        let pyr = Pyramid::build(&img, &[1, 3]).unwrap();
        let coarse = &pyr.levels[1];
        assert_eq!((coarse.w, coarse.h), (4, 3));
        assert!(coarse.data.iter().all(|&v| (v - 0.42).abs() < 1e-6));
    }

    #[test]
    fn dimensions_truncate_per_level() {
        let img = ramp_image(21, 13);
        let pyr = Pyramid::build(&img, &[1, 2, 2]).unwrap();
        assert_eq!((pyr.levels[0].w, pyr.levels[0].h), (21, 13));
        assert_eq!((pyr.levels[1].w, pyr.levels[1].h), (10, 6));
        assert_eq!((pyr.levels[2].w, pyr.levels[2].h), (5, 3));
    }

    #[test]
    fn downsample_averages_blocks() {
        let img = Image::from_raw(2, 2, 1, vec![0.0, 1.0, 2.0, 3.0]);
        let pyr = Pyramid::build(&img, &[2]).unwrap();
        assert_eq!(pyr.levels[0].data, vec![1.5]);
    }

    #[test]
    fn empty_factor_list_is_rejected() {
        let img = ramp_image(4, 4);
        assert!(Pyramid::build(&img, &[]).is_err());
    }

    #[test]
    fn zero_factor_is_rejected() {
        let img = ramp_image(4, 4);
        assert!(Pyramid::build(&img, &[1, 0]).is_err());
    }
}
