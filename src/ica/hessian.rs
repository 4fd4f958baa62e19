//! Per-patch gradient structure (Hessian) matrices.

use super::gradients::ImageGradients;
use crate::error::{AlignError, Result};
use nalgebra::Matrix2;

/// Grid of flattened symmetric 2×2 matrices `(h00, h01, h01, h11)`, one per
/// patch. Unlike displacement maps, the grid uses *ceiling* division of the
/// image dimensions, so edge patches may be partial.
#[derive(Clone, Debug)]
pub struct HessianGrid {
    /// Grid width in patches.
    pub w: usize,
    /// Grid height in patches.
    pub h: usize,
    /// Four floats per patch, row-major.
    pub data: Vec<f32>,
}

impl HessianGrid {
    /// The patch's 2×2 matrix.
    #[inline]
    pub fn at(&self, px: usize, py: usize) -> Matrix2<f32> {
        let i = (py * self.w + px) * 4;
        Matrix2::new(self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3])
    }
}

/// Accumulate `gx²`, `gx·gy`, `gy²` over every patch of the gradient field.
/// Patches extending past the image boundary are truncated, not padded.
pub fn compute_hessian(grads: &ImageGradients, tile_size: usize) -> Result<HessianGrid> {
    if tile_size == 0 {
        return Err(AlignError::InvalidParameter(
            "hessian tile size must be positive".into(),
        ));
    }

    let patches_x = grads.w.div_ceil(tile_size);
    let patches_y = grads.h.div_ceil(tile_size);
    let mut data = vec![0.0f32; patches_x * patches_y * 4];

    for py in 0..patches_y {
        for px in 0..patches_x {
            let mut h00 = 0.0f32;
            let mut h01 = 0.0f32;
            let mut h11 = 0.0f32;

            let y_end = ((py + 1) * tile_size).min(grads.h);
            let x_end = ((px + 1) * tile_size).min(grads.w);
            for y in py * tile_size..y_end {
                for x in px * tile_size..x_end {
                    let i = y * grads.w + x;
                    let gx = grads.gx[i];
                    let gy = grads.gy[i];
                    h00 += gx * gx;
                    h01 += gx * gy;
                    h11 += gy * gy;
                }
            }

            let base = (py * patches_x + px) * 4;
            data[base] = h00;
            data[base + 1] = h01;
            data[base + 2] = h01;
            data[base + 3] = h11;
        }
    }

    Ok(HessianGrid {
        w: patches_x,
        h: patches_y,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grads_from(w: usize, h: usize, gx: Vec<f32>, gy: Vec<f32>) -> ImageGradients {
        ImageGradients { w, h, gx, gy }
    }

    #[test]
    fn grid_uses_ceiling_division() {
        let grads = grads_from(33, 17, vec![0.0; 33 * 17], vec![0.0; 33 * 17]);
        let hess = compute_hessian(&grads, 16).unwrap();
        assert_eq!((hess.w, hess.h), (3, 2));
    }

    #[test]
    fn flat_gradients_yield_zero_matrices() {
        let grads = grads_from(8, 8, vec![0.0; 64], vec![0.0; 64]);
        let hess = compute_hessian(&grads, 4).unwrap();
        assert!(hess.data.iter().all(|&v| v == 0.0));
        assert_eq!(hess.at(0, 0).determinant(), 0.0);
    }

    #[test]
    fn accumulates_outer_products_over_the_patch() {
        // 2x2 image, one patch: gx = [1, 2, 0, 1], gy = [0, 1, 1, 1]
        let grads = grads_from(2, 2, vec![1.0, 2.0, 0.0, 1.0], vec![0.0, 1.0, 1.0, 1.0]);
        let hess = compute_hessian(&grads, 2).unwrap();
        let m = hess.at(0, 0);
        assert_eq!(m[(0, 0)], 1.0 + 4.0 + 0.0 + 1.0);
        assert_eq!(m[(0, 1)], 0.0 + 2.0 + 0.0 + 1.0);
        assert_eq!(m[(1, 0)], m[(0, 1)]);
        assert_eq!(m[(1, 1)], 0.0 + 1.0 + 1.0 + 1.0);
    }

    #[test]
    fn edge_patches_are_truncated() {
        // 3x2 field, tile 2 -> 2x1 patches; the right patch covers one column
        let grads = grads_from(
            3,
            2,
            vec![1.0, 1.0, 2.0, 1.0, 1.0, 3.0],
            vec![0.0; 6],
        );
        let hess = compute_hessian(&grads, 2).unwrap();
        let right = hess.at(1, 0);
        assert_eq!(right[(0, 0)], 4.0 + 9.0);
    }
}
